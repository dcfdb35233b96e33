//! Per-(ticker, date) shareholding snapshot — the fetch half of the pipeline.
//!
//! One snapshot is one POST to the shareholding search page, parsed into the
//! flat records the reconciler consumes. The snapshot performs no persistence
//! and keeps no state across calls.

mod fetch;
pub(crate) mod parse;

use chrono::{Days, NaiveDate};

use crate::core::{CcassClient, CcassError, HoldingRecord, SummaryRecord};

/// The two flat records produced by one scrape call.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// One row per participant with a nonzero disclosed holding.
    pub holdings: Vec<HoldingRecord>,
    /// The page's summary panel (issued shares + aggregate categories).
    pub summary: SummaryRecord,
}

/// A builder for fetching the shareholding snapshot of one security.
pub struct SnapshotBuilder {
    client: CcassClient,
    ticker: u32,
    date: NaiveDate,
}

impl SnapshotBuilder {
    /// Creates a new `SnapshotBuilder` for a stock code.
    ///
    /// The date defaults to yesterday, the most recent settlement date the
    /// exchange can have published.
    #[must_use]
    pub fn new(client: &CcassClient, ticker: u32) -> Self {
        let yesterday = chrono::Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .expect("yesterday exists");
        Self {
            client: client.clone(),
            ticker,
            date: yesterday,
        }
    }

    /// Sets the shareholding date to query. Weekends are accepted as-is;
    /// the exchange echoes back the settlement date it actually answers for.
    #[must_use]
    pub const fn date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Executes the scrape.
    ///
    /// # Errors
    ///
    /// - [`CcassError::InvalidDate`] for future dates.
    /// - [`CcassError::Status`] / [`CcassError::Http`] on transport failure.
    /// - [`CcassError::Parse`] when the page structure is unexpected.
    /// - [`CcassError::NoData`] when the ticker has no listing for the date,
    ///   including after the temporary-counter retry.
    pub async fn fetch(self) -> Result<Snapshot, CcassError> {
        fetch::fetch_snapshot(&self.client, self.ticker, self.date).await
    }
}
