//! Rate-limited batch driver over a (tickers x dates) cross product.
//!
//! A bounded number of snapshot fetches run concurrently; a shared direct
//! rate limiter installed on the client gates every outbound request — the
//! index lookups and temporary-counter retries included — so the whole batch
//! never exceeds the ceiling, whatever the concurrency. Per-cell failures are
//! logged and recorded, never fatal: the goal is maximum completion of the
//! grid.

use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use futures::{stream, StreamExt};
use governor::{Quota, RateLimiter};

use crate::core::{CcassClient, CcassError, HoldingRecord, SummaryRecord};
use crate::snapshot::SnapshotBuilder;

const DEFAULT_REQUESTS_PER_SECOND: u32 = 4;
const DEFAULT_CONCURRENCY: usize = 4;

/// One grid cell that could not be fetched.
#[derive(Debug)]
pub struct BatchFailure {
    pub ticker: u32,
    pub date: NaiveDate,
    pub error: CcassError,
}

/// Everything a batch run accumulated, ready for reconciliation.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Holdings rows from every successful snapshot.
    pub holdings: Vec<HoldingRecord>,
    /// One summary row per successful (ticker, date) cell.
    pub summaries: Vec<SummaryRecord>,
    /// The cells that were skipped, with their errors.
    pub failures: Vec<BatchFailure>,
}

/// A builder for fetching snapshots for many securities over many dates.
pub struct BatchBuilder {
    client: CcassClient,
    tickers: Vec<u32>,
    dates: Vec<NaiveDate>,
    requests_per_second: NonZeroU32,
    concurrency: usize,
}

impl BatchBuilder {
    /// Creates a new `BatchBuilder`.
    #[must_use]
    pub fn new(client: &CcassClient) -> Self {
        Self {
            client: client.clone(),
            tickers: Vec::new(),
            dates: Vec::new(),
            requests_per_second: NonZeroU32::new(DEFAULT_REQUESTS_PER_SECOND)
                .expect("default rps > 0"),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Replaces the current list of stock codes.
    #[must_use]
    pub fn tickers<I>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        self.tickers = tickers.into_iter().collect();
        self
    }

    /// Replaces the current list of shareholding dates.
    #[must_use]
    pub fn dates<I>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        self.dates = dates.into_iter().collect();
        self
    }

    /// Queries the `n` calendar days ending yesterday, newest first.
    /// Weekend dates are kept; excluding them is caller policy.
    #[must_use]
    pub fn days_back(self, n: u32) -> Self {
        let yesterday = chrono::Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .expect("yesterday exists");
        let dates = (0..n).filter_map(|i| yesterday.checked_sub_days(Days::new(u64::from(i))));
        self.dates(dates)
    }

    /// Sets the shared request ceiling (requests per 1-second window).
    /// Default: 4. Requests beyond the ceiling suspend until the window
    /// rolls over.
    #[must_use]
    pub const fn requests_per_second(mut self, rps: NonZeroU32) -> Self {
        self.requests_per_second = rps;
        self
    }

    /// Sets the maximum number of in-flight fetches. Default: 4.
    #[must_use]
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    /// Fetches the full cross product.
    ///
    /// # Errors
    ///
    /// Only for an empty ticker or date list. Per-cell fetch errors are
    /// collected in [`BatchOutcome::failures`], never returned.
    pub async fn run(self) -> Result<BatchOutcome, CcassError> {
        if self.tickers.is_empty() {
            return Err(CcassError::InvalidParams("no tickers specified".into()));
        }
        if self.dates.is_empty() {
            return Err(CcassError::InvalidParams("no dates specified".into()));
        }

        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            self.requests_per_second,
        )));

        let jobs: Vec<(u32, NaiveDate)> = self
            .tickers
            .iter()
            .flat_map(|&t| self.dates.iter().map(move |&d| (t, d)))
            .collect();
        let total = jobs.len();

        // Every request a job makes is metered, including the stock-list
        // lookup and retry of the temporary-counter path.
        let client = self.client.with_limiter(limiter);
        let results: Vec<(u32, NaiveDate, Result<crate::snapshot::Snapshot, CcassError>)> =
            stream::iter(jobs)
                .map(|(ticker, date)| {
                    let client = client.clone();
                    async move {
                        let res = SnapshotBuilder::new(&client, ticker).date(date).fetch().await;
                        (ticker, date, res)
                    }
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut outcome = BatchOutcome::default();
        for (ticker, date, res) in results {
            match res {
                Ok(snapshot) => {
                    outcome.holdings.extend(snapshot.holdings);
                    outcome.summaries.push(snapshot.summary);
                }
                Err(error) => {
                    tracing::warn!(ticker, %date, %error, "snapshot skipped");
                    outcome.failures.push(BatchFailure { ticker, date, error });
                }
            }
        }
        tracing::info!(
            total,
            ok = total - outcome.failures.len(),
            failed = outcome.failures.len(),
            "batch finished"
        );
        Ok(outcome)
    }
}
