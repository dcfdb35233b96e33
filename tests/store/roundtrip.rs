use ccass_rs::store::merge_summaries;
use ccass_rs::{CsvStore, HistoricalTable};

use crate::common::{date, holding, summary};

#[test]
fn save_then_load_round_trips_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("holdings.csv"), dir.path().join("summary.csv"));

    let mut table = HistoricalTable::new();
    table.reconcile(vec![
        holding(5, "A00001", "2023-01-09", 150, 0.015),
        holding(5, "A00001", "2023-01-10", 100, 0.010),
        holding(5, "B01234", "2023-01-10", 200, 0.020),
    ]);
    let summaries = vec![summary(5, "2023-01-10", 10_000_000)];

    store.save(&table, &summaries).unwrap();

    let loaded = store.load_holdings().unwrap();
    assert_eq!(loaded, table);

    let loaded_summaries = store.load_summaries().unwrap();
    assert_eq!(loaded_summaries, summaries);
}

#[test]
fn optional_delta_columns_survive_the_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("holdings.csv"), dir.path().join("summary.csv"));

    let mut table = HistoricalTable::new();
    table.reconcile(vec![
        holding(5, "A00001", "2023-01-09", 150, 0.015),
        holding(5, "A00001", "2023-01-10", 100, 0.010),
    ]);
    store.save(&table, &[]).unwrap();

    let loaded = store.load_holdings().unwrap();
    let newest = loaded
        .records()
        .iter()
        .find(|r| r.settlement_date == date("2023-01-10"))
        .unwrap();
    assert_eq!(newest.dod_share_change, Some(-50));
    let oldest = loaded
        .records()
        .iter()
        .find(|r| r.settlement_date == date("2023-01-09"))
        .unwrap();
    assert!(oldest.dod_share_change.is_none());
}

#[test]
fn save_replaces_an_existing_table_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let holdings_path = dir.path().join("holdings.csv");
    let store = CsvStore::new(&holdings_path, dir.path().join("summary.csv"));

    let mut first = HistoricalTable::new();
    first.reconcile(vec![
        holding(5, "A00001", "2023-01-09", 150, 0.015),
        holding(5, "B01234", "2023-01-09", 900, 0.090),
    ]);
    store.save(&first, &[]).unwrap();

    let mut second = HistoricalTable::new();
    second.reconcile(vec![holding(5, "A00001", "2023-01-10", 100, 0.010)]);
    store.save(&second, &[summary(5, "2023-01-10", 10_000_000)]).unwrap();

    assert_eq!(store.load_holdings().unwrap(), second);
    assert_eq!(store.load_summaries().unwrap().len(), 1);
    assert!(!holdings_path.with_extension("csv.tmp").exists());
}

#[test]
fn failed_save_leaves_the_existing_tables_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let holdings_path = dir.path().join("holdings.csv");
    let summary_path = dir.path().join("summary.csv");
    let store = CsvStore::new(&holdings_path, &summary_path);

    let mut table = HistoricalTable::new();
    table.reconcile(vec![holding(5, "A00001", "2023-01-10", 100, 0.010)]);
    let summaries = vec![summary(5, "2023-01-10", 10_000_000)];
    store.save(&table, &summaries).unwrap();

    // a plain file where the summary table's parent directory should go makes
    // the second write fail after the holdings table has already been staged
    std::fs::write(dir.path().join("blocker"), b"").unwrap();
    let broken = CsvStore::new(&holdings_path, dir.path().join("blocker/summary.csv"));

    let mut bigger = table.clone();
    bigger.reconcile(vec![holding(5, "B01234", "2023-01-10", 200, 0.020)]);
    assert!(broken.save(&bigger, &summaries).is_err());

    // the on-disk pair still holds the first run, with no stray temp file
    assert_eq!(store.load_holdings().unwrap(), table);
    assert_eq!(store.load_summaries().unwrap(), summaries);
    assert!(!holdings_path.with_extension("csv.tmp").exists());
}

#[test]
fn missing_files_load_as_empty_tables() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(dir.path().join("holdings.csv"), dir.path().join("summary.csv"));

    assert!(store.load_holdings().unwrap().is_empty());
    assert!(store.load_summaries().unwrap().is_empty());
}

#[test]
fn save_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvStore::new(
        dir.path().join("out/ccass/holdings.csv"),
        dir.path().join("out/ccass/summary.csv"),
    );

    store.save(&HistoricalTable::new(), &[]).unwrap();
    assert!(dir.path().join("out/ccass/holdings.csv").exists());
}

#[test]
fn merge_summaries_dedups_and_sorts_newest_first() {
    let existing = vec![
        summary(5, "2023-01-09", 10_000_000),
        summary(5, "2023-01-10", 10_000_000),
    ];
    let incoming = vec![
        summary(5, "2023-01-10", 10_500_000), // re-scrape supersedes
        summary(1, "2023-01-10", 4_000_000),
    ];

    let merged = merge_summaries(existing, incoming);

    let keys: Vec<(u32, String)> = merged
        .iter()
        .map(|s| (s.ticker, s.settlement_date.to_string()))
        .collect();
    assert_eq!(
        keys,
        vec![
            (1, "2023-01-10".to_string()),
            (5, "2023-01-10".to_string()),
            (5, "2023-01-09".to_string()),
        ]
    );

    let superseded = merged
        .iter()
        .find(|s| s.ticker == 5 && s.settlement_date == date("2023-01-10"))
        .unwrap();
    assert_eq!(superseded.shares_issued, 10_500_000);
}
