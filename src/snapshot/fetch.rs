use chrono::NaiveDate;

use crate::core::{net, CcassClient, CcassError};
use crate::lookup;

use super::{parse, Snapshot};

async fn post_search(
    client: &CcassClient,
    ticker: u32,
    date: NaiveDate,
) -> Result<String, CcassError> {
    let form = [
        ("__EVENTTARGET", "btnSearch".to_string()),
        ("txtShareholdingDate", date.format("%Y/%m/%d").to_string()),
        ("txtStockCode", format!("{ticker:05}")),
    ];
    client.throttle().await;
    let resp = client
        .http()
        .post(client.base_sdw().clone())
        .form(&form)
        .send()
        .await?;
    net::ok_text(resp).await
}

/// Find the temporary counter a security trades under during a symbol change
/// (e.g. a rights-issue nil-paid counter): another stock-list entry carrying
/// the same security name.
async fn temporary_counter(
    client: &CcassClient,
    ticker: u32,
    date: NaiveDate,
) -> Result<Option<u32>, CcassError> {
    let entries = lookup::stock_list(client, date).await?;
    let name = match entries.iter().find(|e| e.code == ticker) {
        Some(e) => e.name.clone(),
        None => return Ok(None),
    };
    Ok(entries
        .iter()
        .find(|e| e.code != ticker && e.name == name)
        .map(|e| e.code))
}

/// One (ticker, date) scrape: POST the search form, parse summary + holdings,
/// falling back once to the temporary counter when the listing is absent.
pub(super) async fn fetch_snapshot(
    client: &CcassClient,
    ticker: u32,
    date: NaiveDate,
) -> Result<Snapshot, CcassError> {
    let today = chrono::Utc::now().date_naive();
    if date > today {
        return Err(CcassError::InvalidDate(format!(
            "{date} is in the future (today is {today})"
        )));
    }

    let html = post_search(client, ticker, date).await?;
    if let Some(snapshot) = parse::parse_snapshot(&html, ticker)? {
        return Ok(snapshot);
    }

    // Listing absent: the security may be trading under a temporary counter.
    // Retry once under that code; records stay keyed to the original ticker
    // so its history remains continuous.
    if let Some(temp_code) = temporary_counter(client, ticker, date).await? {
        tracing::info!(ticker, temp_code, %date, "retrying under temporary counter");
        let html = post_search(client, temp_code, date).await?;
        if let Some(snapshot) = parse::parse_snapshot(&html, ticker)? {
            return Ok(snapshot);
        }
    }

    Err(CcassError::NoData { ticker, date })
}
