#![allow(dead_code)]

use std::{fs, path::PathBuf};

use chrono::NaiveDate;
use ccass_rs::HoldingRecord;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Minimal but structurally faithful shareholding search page:
/// settlement-date input, summary panel, and the mobile-list holdings table.
pub fn sdw_page(page_date: &str, issued: &str, rows: &[(&str, &str, &str)]) -> String {
    let mut body_rows = String::new();
    for (pid, name, shares) in rows {
        body_rows.push_str(&format!(
            r#"<tr>
<td class="col-participant-id"><div class="mobile-list-heading">Participant ID:</div><div class="mobile-list-body">{pid}</div></td>
<td class="col-participant-name"><div class="mobile-list-heading">Name of CCASS Participant:</div><div class="mobile-list-body">{name}</div></td>
<td class="col-shareholding"><div class="mobile-list-heading">Shareholding:</div><div class="mobile-list-body">{shares}</div></td>
<td class="col-shareholding-percent"><div class="mobile-list-heading">% of the total:</div><div class="mobile-list-body">n/a</div></td>
</tr>
"#
        ));
    }
    format!(
        r#"<!DOCTYPE html><html><body>
<form id="form1">
<input id="txtShareholdingDate" name="txtShareholdingDate" type="text" value="{page_date}" />
<div class="ccass-search-result">
<div class="ccass-search-datarow">
<div class="summary-category">Market Intermediaries</div>
<div class="shareholding"><div class="value">4,500,000</div></div>
</div>
<div class="ccass-search-datarow">
<div class="summary-category">Consenting Investor Participants</div>
<div class="shareholding"><div class="value">300,000</div></div>
</div>
<div class="ccass-search-datarow">
<div class="summary-category">Non-consenting Investor Participants</div>
<div class="shareholding"><div class="value">200,000</div></div>
</div>
<div class="ccass-search-datarow">
<div class="summary-category">Total</div>
<div class="shareholding"><div class="value">5,000,000</div></div>
</div>
</div>
<div class="summary-value">{issued}</div>
<table class="table table-scroll table-sort table-mobile-list">
<tbody>
{body_rows}
</tbody>
</table>
</form>
</body></html>"#
    )
}

/// The page served for a ticker with no listing on the date: the search form
/// comes back with neither summary panel nor table.
pub fn sdw_page_without_listing(page_date: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
<form id="form1">
<input id="txtShareholdingDate" name="txtShareholdingDate" type="text" value="{page_date}" />
<div class="ccass-search-remarks">No match record found.</div>
</form>
</body></html>"#
    )
}

pub fn summary(ticker: u32, day: &str, issued: u64) -> ccass_rs::SummaryRecord {
    ccass_rs::SummaryRecord {
        ticker,
        settlement_date: date(day),
        shares_issued: issued,
        intermediaries: Some(issued / 2),
        consenting_investors: None,
        non_consenting_investors: None,
        total_in_ccass: Some(issued / 2),
    }
}

pub fn holding(ticker: u32, pid: &str, day: &str, shares: u64, pct: f64) -> HoldingRecord {
    HoldingRecord {
        ticker,
        participant_id: pid.to_string(),
        settlement_date: date(day),
        shares_held: shares,
        pct_of_issued: pct,
        dod_share_change: None,
        dod_pct_change: None,
    }
}
