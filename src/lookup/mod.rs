//! Exchange-wide index lookups.
//!
//! Two small JSON endpoints back everything here: the stock-list index (which
//! securities have shareholding data on a date) and the participant-list index
//! (clearing-participant id to broker name). The snapshot module also uses the
//! stock list to resolve temporary counters during a symbol change.

mod wire;

use chrono::NaiveDate;

use crate::core::{net, CcassClient, CcassError};
use wire::IndexEntry;

/// One row of the stock-list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEntry {
    /// Numeric stock code.
    pub code: u32,
    /// Security display name, e.g. `CKH HOLDINGS`.
    pub name: String,
}

/// One row of the participant-list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantEntry {
    /// CCASS participant identifier, e.g. `B00128`.
    pub id: String,
    /// Broker or custodian name.
    pub name: String,
}

fn index_url(base: &url::Url, sortby: &str, date: NaiveDate) -> url::Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("sortby", sortby)
        .append_pair("shareholdingdate", &date.format("%Y%m%d").to_string());
    url
}

async fn fetch_index(
    client: &CcassClient,
    url: url::Url,
) -> Result<Vec<IndexEntry>, CcassError> {
    client.throttle().await;
    let resp = client.http().get(url.clone()).send().await?;
    let body = net::ok_text(resp).await?;
    serde_json::from_str(&body)
        .map_err(|e| CcassError::Parse(format!("index JSON at {url}: {e}")))
}

/// Fetch the full stock-list index for a shareholding date.
///
/// # Errors
///
/// Fails on transport errors or if the endpoint does not return the expected
/// JSON array.
pub async fn stock_list(
    client: &CcassClient,
    date: NaiveDate,
) -> Result<Vec<StockEntry>, CcassError> {
    let url = index_url(client.base_stock_list(), "stockcode", date);
    let entries = fetch_index(client, url).await?;
    entries
        .into_iter()
        .map(|e| {
            let code = e.c.trim().parse::<u32>().map_err(|_| {
                CcassError::Parse(format!("stock list: non-numeric stock code {:?}", e.c))
            })?;
            Ok(StockEntry { code, name: e.n })
        })
        .collect()
}

/// List the stock codes with shareholding data available on `date`.
///
/// # Errors
///
/// See [`stock_list`].
pub async fn list_tickers(client: &CcassClient, date: NaiveDate) -> Result<Vec<u32>, CcassError> {
    Ok(stock_list(client, date).await?.into_iter().map(|e| e.code).collect())
}

/// Resolve a stock code to its display name on `date`, if listed.
///
/// # Errors
///
/// See [`stock_list`].
pub async fn resolve_name(
    client: &CcassClient,
    ticker: u32,
    date: NaiveDate,
) -> Result<Option<String>, CcassError> {
    Ok(stock_list(client, date)
        .await?
        .into_iter()
        .find(|e| e.code == ticker)
        .map(|e| e.name))
}

/// Fetch the participant-id to broker-name directory for `date`.
///
/// # Errors
///
/// Fails on transport errors or if the endpoint does not return the expected
/// JSON array.
pub async fn participant_directory(
    client: &CcassClient,
    date: NaiveDate,
) -> Result<Vec<ParticipantEntry>, CcassError> {
    let url = index_url(client.base_participant_list(), "partid", date);
    let entries = fetch_index(client, url).await?;
    Ok(entries
        .into_iter()
        .map(|e| ParticipantEntry { id: e.c, name: e.n })
        .collect())
}
