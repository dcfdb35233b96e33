use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/* ----- HOLDINGS (shared by snapshot/, reconcile/ and store/) ----- */

/// One participant's disclosed position in one security on one settlement date.
///
/// Uniquely keyed by `(ticker, participant_id, settlement_date)`. The two
/// `dod_*` fields are derived during reconciliation and are `None` for the
/// earliest record of a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    /// HKEX numeric stock code (zero-padded to five digits on the wire).
    pub ticker: u32,
    /// CCASS participant (broker/custodian) identifier, e.g. `B00128`.
    pub participant_id: String,
    /// Settlement date of the disclosure (trade date + 2 business days).
    pub settlement_date: NaiveDate,
    /// End-of-day shareholding.
    pub shares_held: u64,
    /// Shareholding as a fraction of issued shares, recomputed from the
    /// summary panel rather than taken from the page's rounded string.
    pub pct_of_issued: f64,
    /// Day-over-day change in `shares_held`.
    pub dod_share_change: Option<i64>,
    /// Day-over-day change in `pct_of_issued`.
    pub dod_pct_change: Option<f64>,
}

impl HoldingRecord {
    /// The dedup key of this record.
    pub fn key(&self) -> (u32, &str, NaiveDate) {
        (self.ticker, self.participant_id.as_str(), self.settlement_date)
    }
}

/* ----- SUMMARY PANEL ----- */

/// The per-(ticker, date) summary panel of a shareholding search page.
///
/// The optional counts mirror the named aggregate categories the page reports;
/// a category absent from the panel stays `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub ticker: u32,
    pub settlement_date: NaiveDate,
    /// Total number of issued shares/warrants/units.
    pub shares_issued: u64,
    /// Aggregate shareholding of market intermediaries.
    pub intermediaries: Option<u64>,
    /// Aggregate shareholding of consenting investor participants.
    pub consenting_investors: Option<u64>,
    /// Aggregate shareholding of non-consenting investor participants.
    pub non_consenting_investors: Option<u64>,
    /// Total shareholding held in the clearing system.
    pub total_in_ccass: Option<u64>,
}
