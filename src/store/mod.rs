//! CSV persistence for the holdings and summary tables.
//!
//! Both tables are rewritten wholesale after each run. A missing file is an
//! empty table (first run); any other read or write problem is an error, and
//! callers treat write errors as fatal — a partially written table is worse
//! than no update.

use std::path::{Path, PathBuf};

use crate::core::{CcassError, HoldingRecord, SummaryRecord};
use crate::reconcile::HistoricalTable;

/// File-backed store for the two output tables.
#[derive(Debug, Clone)]
pub struct CsvStore {
    holdings_path: PathBuf,
    summary_path: PathBuf,
}

impl CsvStore {
    #[must_use]
    pub fn new(holdings_path: impl Into<PathBuf>, summary_path: impl Into<PathBuf>) -> Self {
        Self {
            holdings_path: holdings_path.into(),
            summary_path: summary_path.into(),
        }
    }

    /// Load the historical holdings table. A missing file yields an empty
    /// table.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors other than "not found" and on rows that do not
    /// decode.
    pub fn load_holdings(&self) -> Result<HistoricalTable, CcassError> {
        if !self.holdings_path.exists() {
            tracing::info!(path = %self.holdings_path.display(), "no holdings table yet, starting empty");
            return Ok(HistoricalTable::new());
        }
        let mut reader = csv::Reader::from_path(&self.holdings_path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<HoldingRecord>() {
            records.push(row?);
        }
        Ok(HistoricalTable::from_records(records))
    }

    /// Load the summary table. A missing file yields an empty list.
    ///
    /// # Errors
    ///
    /// Same conditions as [`load_holdings`](Self::load_holdings).
    pub fn load_summaries(&self) -> Result<Vec<SummaryRecord>, CcassError> {
        if !self.summary_path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.summary_path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<SummaryRecord>() {
            records.push(row?);
        }
        Ok(records)
    }

    /// Persist both tables wholesale.
    ///
    /// Each table is written to a sibling temp file and renamed into place
    /// only after both have flushed, so a failed run never truncates an
    /// existing table or leaves the pair inconsistent.
    ///
    /// # Errors
    ///
    /// Any I/O or encode failure; callers must treat this as fatal.
    pub fn save(
        &self,
        table: &HistoricalTable,
        summaries: &[SummaryRecord],
    ) -> Result<(), CcassError> {
        let holdings_tmp = stage(&self.holdings_path, table.records())?;
        let summary_tmp = match stage(&self.summary_path, summaries) {
            Ok(tmp) => tmp,
            Err(e) => {
                let _ = std::fs::remove_file(&holdings_tmp);
                return Err(e);
            }
        };
        std::fs::rename(&holdings_tmp, &self.holdings_path)?;
        std::fs::rename(&summary_tmp, &self.summary_path)?;

        tracing::info!(
            holdings = table.len(),
            summaries = summaries.len(),
            "tables persisted"
        );
        Ok(())
    }
}

/// Write `rows` to a temp file next to `path`, returning the temp path once
/// the writer has flushed and closed.
fn stage<S: serde::Serialize>(path: &Path, rows: &[S]) -> Result<PathBuf, CcassError> {
    ensure_parent(path)?;
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(tmp)
}

fn ensure_parent(path: &Path) -> Result<(), CcassError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Merge freshly scraped summaries into the existing table: dedup by
/// (ticker, settlement date) with the newer row winning, then sort
/// ticker asc, settlement date desc.
#[must_use]
pub fn merge_summaries(
    existing: Vec<SummaryRecord>,
    incoming: Vec<SummaryRecord>,
) -> Vec<SummaryRecord> {
    use std::collections::HashMap;

    let mut by_key: HashMap<(u32, chrono::NaiveDate), usize> = HashMap::new();
    let mut merged: Vec<SummaryRecord> = Vec::with_capacity(existing.len() + incoming.len());
    for record in existing.into_iter().chain(incoming) {
        let key = (record.ticker, record.settlement_date);
        match by_key.get(&key) {
            Some(&idx) => merged[idx] = record,
            None => {
                by_key.insert(key, merged.len());
                merged.push(record);
            }
        }
    }
    merged.sort_by(|a, b| {
        a.ticker
            .cmp(&b.ticker)
            .then(b.settlement_date.cmp(&a.settlement_date))
    });
    merged
}
