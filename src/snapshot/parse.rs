//! HTML parsing for the shareholding search page.
//!
//! The page carries three things we care about: the effective settlement date
//! (echoed back in the search form, which can differ from the requested date
//! around holidays), a summary panel with issued shares and named aggregate
//! categories, and the per-participant holdings table. Numeric fields arrive
//! as formatted strings (`1,234,567`) and are normalized here.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::core::{CcassError, HoldingRecord, SummaryRecord};

use super::Snapshot;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Strip thousands separators and surrounding whitespace from a formatted
/// count. Anything else (a percent sign, a decimal point) fails the parse
/// rather than silently dropping characters.
pub(crate) fn parse_formatted_u64(s: &str) -> Result<u64, CcassError> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(CcassError::Parse(format!("expected a number, got {s:?}")));
    }
    cleaned
        .parse::<u64>()
        .map_err(|e| CcassError::Parse(format!("number {s:?}: {e}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// The mobile layout duplicates the column header inside each cell as
/// `Label: value`; keep only the value, like the upstream report itself
/// renders on desktop.
fn cell_value(td: ElementRef<'_>) -> String {
    if let Some(body) = td.select(&sel(".mobile-list-body")).next() {
        return element_text(body);
    }
    let raw = element_text(td);
    match raw.rsplit_once(": ") {
        Some((_, v)) => v.trim().to_string(),
        None => raw,
    }
}

/// The settlement date the exchange actually answered for.
pub(crate) fn parse_settlement_date(doc: &Html) -> Result<NaiveDate, CcassError> {
    let input = doc
        .select(&sel("input#txtShareholdingDate"))
        .next()
        .ok_or_else(|| CcassError::Parse("shareholding date input missing".into()))?;
    let value = input
        .value()
        .attr("value")
        .ok_or_else(|| CcassError::Parse("shareholding date input has no value".into()))?;
    NaiveDate::parse_from_str(value.trim(), "%Y/%m/%d")
        .map_err(|e| CcassError::Parse(format!("shareholding date {value:?}: {e}")))
}

/// Parse the summary panel into a [`SummaryRecord`].
pub(crate) fn parse_summary(
    doc: &Html,
    ticker: u32,
    settlement_date: NaiveDate,
) -> Result<SummaryRecord, CcassError> {
    let issued_el = doc
        .select(&sel(".summary-value"))
        .next()
        .ok_or_else(|| CcassError::Parse("summary panel missing".into()))?;
    let shares_issued = parse_formatted_u64(&element_text(issued_el))?;
    if shares_issued == 0 {
        return Err(CcassError::Parse("issued shares reported as zero".into()));
    }

    let mut summary = SummaryRecord {
        ticker,
        settlement_date,
        shares_issued,
        intermediaries: None,
        consenting_investors: None,
        non_consenting_investors: None,
        total_in_ccass: None,
    };

    let category_sel = sel(".summary-category");
    let value_sel = sel(".value");
    for row in doc.select(&sel(".ccass-search-datarow")) {
        let label = match row.select(&category_sel).next() {
            Some(el) => element_text(el),
            None => continue,
        };
        let value = match row.select(&value_sel).next() {
            Some(el) => parse_formatted_u64(&element_text(el))?,
            None => continue,
        };
        // "Non-consenting" must be matched before "Consenting".
        if label.contains("Intermediaries") {
            summary.intermediaries = Some(value);
        } else if label.contains("Non-consenting") {
            summary.non_consenting_investors = Some(value);
        } else if label.contains("Consenting") {
            summary.consenting_investors = Some(value);
        } else if label.contains("Total") {
            summary.total_in_ccass = Some(value);
        }
    }

    Ok(summary)
}

/// Parse the participant holdings table, if present.
///
/// Returns `Ok(None)` when the page has no listing table at all — the signal
/// for the temporary-counter fallback, observed for tickers mid symbol change.
pub(crate) fn parse_holdings(
    doc: &Html,
    ticker: u32,
    settlement_date: NaiveDate,
    shares_issued: u64,
) -> Result<Option<Vec<HoldingRecord>>, CcassError> {
    let table = match doc.select(&sel("table")).next() {
        Some(t) => t,
        None => return Ok(None),
    };

    let td_sel = sel("td");
    let mut holdings = Vec::new();
    for row in table.select(&sel("tbody tr")) {
        let cells: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
        if cells.len() < 3 {
            continue; // header or spacer row
        }
        let participant_id = cell_value(cells[0]);
        if participant_id.is_empty() {
            continue;
        }
        let shares_held = parse_formatted_u64(&cell_value(cells[2]))?;
        // Recompute the percentage from the summary panel instead of trusting
        // the page's rounded percentage column.
        #[allow(clippy::cast_precision_loss)]
        let pct_of_issued = shares_held as f64 / shares_issued as f64;
        holdings.push(HoldingRecord {
            ticker,
            participant_id,
            settlement_date,
            shares_held,
            pct_of_issued,
            dod_share_change: None,
            dod_pct_change: None,
        });
    }

    if holdings.is_empty() {
        return Ok(None);
    }
    Ok(Some(holdings))
}

/// Parse a full search page into a [`Snapshot`].
///
/// `ticker` is the code the records are reported under, which stays the
/// original code even when the page was fetched via a temporary counter.
pub(crate) fn parse_snapshot(html: &str, ticker: u32) -> Result<Option<Snapshot>, CcassError> {
    let doc = Html::parse_document(html);
    let settlement_date = parse_settlement_date(&doc)?;
    // A ticker with no listing for the date renders the search form with no
    // summary panel and no table; report that as "no data" rather than a
    // malformed document.
    if doc.select(&sel(".summary-value")).next().is_none() {
        return Ok(None);
    }
    let summary = parse_summary(&doc, ticker, settlement_date)?;
    match parse_holdings(&doc, ticker, settlement_date, summary.shares_issued)? {
        Some(holdings) => Ok(Some(Snapshot { holdings, summary })),
        None => Ok(None),
    }
}
