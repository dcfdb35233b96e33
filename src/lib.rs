//! ccass-rs: HKEX CCASS shareholding disclosure client.
//!
//! Scrapes the per-broker shareholding search page one (ticker, date) at a
//! time, batches the cross product behind a shared rate limiter, and
//! reconciles the results into a historical table with synthetic zero rows at
//! position boundaries and day-over-day deltas.

pub mod batch;
pub mod core;
pub mod lookup;
pub mod reconcile;
pub mod snapshot;
pub mod store;

pub use batch::{BatchBuilder, BatchFailure, BatchOutcome};
pub use core::{CcassClient, CcassClientBuilder, CcassError, HoldingRecord, SummaryRecord};
pub use reconcile::HistoricalTable;
pub use snapshot::{Snapshot, SnapshotBuilder};
pub use store::CsvStore;
