//! Historical shareholding table and the merge/synthesize/delta pipeline.
//!
//! The source report only lists participants with nonzero holdings, so a
//! broker that fully exits (or newly enters) a position simply disappears from
//! (or appears in) the listing. To keep the day-over-day series well-defined,
//! reconciliation inserts synthetic zero-holding rows at those position
//! boundaries before computing deltas.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate, Weekday};

use crate::core::HoldingRecord;

/// The append-only, key-unique table of holding records.
///
/// Keyed by `(ticker, participant_id, settlement_date)`. Mutated only by
/// [`reconcile`](Self::reconcile) (appends and derived-field updates) and by
/// the optional [`retain_weekdays`](Self::retain_weekdays) caller policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalTable {
    records: Vec<HoldingRecord>,
}

impl HistoricalTable {
    /// An empty table (first run).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from loaded records, deduplicating by key
    /// (last write wins).
    #[must_use]
    pub fn from_records(records: Vec<HoldingRecord>) -> Self {
        let mut table = Self { records };
        table.dedup_by_key();
        table
    }

    /// The records in storage order.
    #[must_use]
    pub fn records(&self) -> &[HoldingRecord] {
        &self.records
    }

    /// Consume the table, yielding its records.
    #[must_use]
    pub fn into_records(self) -> Vec<HoldingRecord> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop Saturday/Sunday settlement rows.
    ///
    /// The table itself makes no business-day assumption; callers that want a
    /// weekday-only series apply this before [`reconcile`](Self::reconcile).
    pub fn retain_weekdays(&mut self) {
        self.records.retain(|r| {
            !matches!(r.settlement_date.weekday(), Weekday::Sat | Weekday::Sun)
        });
    }

    /// Merge freshly fetched records into the table and rebuild the derived
    /// state:
    ///
    /// 1. synthesize zero-holding rows at position boundaries within the
    ///    incoming batch, over the batch's global date universe;
    /// 2. append + dedup by key, last write wins;
    /// 3. recompute day-over-day deltas per (ticker, participant) group;
    /// 4. sort for storage: ticker asc, settlement date desc, participant asc.
    ///
    /// Synthesis looks at the batch, not the merged table: a participant whose
    /// first appearance ever is the earliest date of a batch is a first record
    /// (null delta), not an initiated position. Reconciling the same batch
    /// twice leaves the table unchanged.
    pub fn reconcile(&mut self, incoming: Vec<HoldingRecord>) {
        let incoming = fill_missing_zero_rows(incoming);
        self.records.extend(incoming);
        self.dedup_by_key();
        self.compute_deltas();
        self.sort_for_storage();
    }

    /* ---------------- pipeline steps ---------------- */

    fn dedup_by_key(&mut self) {
        let mut by_key: HashMap<(u32, String, NaiveDate), usize> = HashMap::new();
        let mut deduped: Vec<HoldingRecord> = Vec::with_capacity(self.records.len());
        for record in self.records.drain(..) {
            let key = (
                record.ticker,
                record.participant_id.clone(),
                record.settlement_date,
            );
            match by_key.get(&key) {
                Some(&idx) => deduped[idx] = record,
                None => {
                    by_key.insert(key, deduped.len());
                    deduped.push(record);
                }
            }
        }
        self.records = deduped;
    }

    /// Per-(ticker, participant) consecutive differences of shares and pct,
    /// in ascending date order; the first record of a group gets `None`.
    fn compute_deltas(&mut self) {
        self.records.sort_by(|a, b| {
            (a.ticker, &a.participant_id, a.settlement_date).cmp(&(
                b.ticker,
                &b.participant_id,
                b.settlement_date,
            ))
        });

        let mut prev: Option<(u32, String, u64, f64)> = None;
        for record in &mut self.records {
            match &prev {
                Some((ticker, participant_id, shares, pct))
                    if *ticker == record.ticker && participant_id == &record.participant_id =>
                {
                    #[allow(clippy::cast_possible_wrap)]
                    let share_change = record.shares_held as i64 - *shares as i64;
                    record.dod_share_change = Some(share_change);
                    record.dod_pct_change = Some(record.pct_of_issued - *pct);
                }
                _ => {
                    record.dod_share_change = None;
                    record.dod_pct_change = None;
                }
            }
            prev = Some((
                record.ticker,
                record.participant_id.clone(),
                record.shares_held,
                record.pct_of_issued,
            ));
        }
    }

    fn sort_for_storage(&mut self) {
        self.records.sort_by(|a, b| {
            a.ticker
                .cmp(&b.ticker)
                .then(b.settlement_date.cmp(&a.settlement_date))
                .then(a.participant_id.cmp(&b.participant_id))
        });
    }
}

/// Insert shares=0 rows where a participant's position crosses zero between
/// two adjacent dates of the batch's global date universe (all tickers).
///
/// Membership is judged against the pre-synthesis batch, so a single sell-out
/// produces exactly one zero row (at the first missing date) and nothing
/// propagates past it. The first and last dates of the universe have no
/// predecessor/successor; nothing is synthesized outside the observed range.
fn fill_missing_zero_rows(mut batch: Vec<HoldingRecord>) -> Vec<HoldingRecord> {
    let universe: Vec<NaiveDate> = batch
        .iter()
        .map(|r| r.settlement_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if universe.len() < 2 {
        return batch;
    }

    let mut groups: HashMap<(u32, String), BTreeMap<NaiveDate, u64>> = HashMap::new();
    for r in &batch {
        groups
            .entry((r.ticker, r.participant_id.clone()))
            .or_default()
            .insert(r.settlement_date, r.shares_held);
    }

    // A gap in the middle of a position matches both the sold-out and the
    // initiated rule for the same date; the seen-set keeps the key unique.
    let mut seen: HashSet<(u32, String, NaiveDate)> = HashSet::new();
    for ((ticker, participant_id), held) in &groups {
        for window in universe.windows(2) {
            let (prev, next) = (window[0], window[1]);
            let zero_date = match (held.get(&prev), held.get(&next)) {
                // sold out: nonzero at prev, nothing at next
                (Some(&shares), None) if shares != 0 => next,
                // initiated: nothing at prev, nonzero at next
                (None, Some(&shares)) if shares != 0 => prev,
                _ => continue,
            };
            if seen.insert((*ticker, participant_id.clone(), zero_date)) {
                batch.push(HoldingRecord {
                    ticker: *ticker,
                    participant_id: participant_id.clone(),
                    settlement_date: zero_date,
                    shares_held: 0,
                    pct_of_issued: 0.0,
                    dod_share_change: None,
                    dod_pct_change: None,
                });
            }
        }
    }
    batch
}
