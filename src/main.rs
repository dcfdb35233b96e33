//! CLI entry point: scrape the last N days for a watchlist (or the whole
//! exchange) and update the persisted holdings + summary tables.

use std::num::NonZeroU32;
use std::path::PathBuf;

use chrono::{Datelike, Days, Weekday};
use clap::Parser;

use ccass_rs::{
    lookup, store, BatchBuilder, CcassClient, CcassError, CsvStore,
};

#[derive(Parser, Debug)]
#[command(name = "ccass", version, about = "Scrape CCASS shareholding disclosures and maintain the historical table")]
struct Args {
    /// Number of calendar days to scrape, ending yesterday.
    #[arg(long, default_value_t = 3)]
    days: u32,

    /// Explicit stock codes (comma separated). When omitted, every code in
    /// the stock-list index for the most recent date is scraped.
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<u32>>,

    /// Path of the holdings table.
    #[arg(long, default_value = "ccass_holdings.csv")]
    holdings: PathBuf,

    /// Path of the summary table.
    #[arg(long, default_value = "ccass_summary.csv")]
    summary: PathBuf,

    /// Request ceiling per 1-second window.
    #[arg(long, default_value_t = 4)]
    rps: u32,

    /// Maximum in-flight requests.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Keep Saturday/Sunday settlement rows instead of dropping them before
    /// reconciliation.
    #[arg(long)]
    include_weekends: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(error) = run(args).await {
        tracing::error!(%error, "run aborted");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CcassError> {
    let client = CcassClient::builder().build()?;

    let tickers = match args.tickers {
        Some(t) if !t.is_empty() => t,
        _ => {
            let yesterday = chrono::Utc::now()
                .date_naive()
                .checked_sub_days(Days::new(1))
                .expect("yesterday exists");
            let all = lookup::list_tickers(&client, yesterday).await?;
            tracing::info!(count = all.len(), "no ticker list given, scraping the full index");
            all
        }
    };

    let rps = NonZeroU32::new(args.rps)
        .ok_or_else(|| CcassError::InvalidParams("--rps must be at least 1".into()))?;

    let outcome = BatchBuilder::new(&client)
        .tickers(tickers)
        .days_back(args.days)
        .requests_per_second(rps)
        .concurrency(args.concurrency)
        .run()
        .await?;

    let mut incoming = outcome.holdings;
    if !args.include_weekends {
        // Weekend exclusion is caller policy, applied before reconciliation.
        incoming.retain(|r| {
            !matches!(r.settlement_date.weekday(), Weekday::Sat | Weekday::Sun)
        });
    }

    let csv_store = CsvStore::new(&args.holdings, &args.summary);
    let mut table = csv_store.load_holdings()?;
    if !args.include_weekends {
        table.retain_weekdays();
    }
    table.reconcile(incoming);

    let summaries = store::merge_summaries(csv_store.load_summaries()?, outcome.summaries);

    // A partial output table is worse than no update: any persistence failure
    // aborts the run.
    csv_store.save(&table, &summaries)?;

    tracing::info!(
        rows = table.len(),
        summaries = summaries.len(),
        skipped = outcome.failures.len(),
        "update complete"
    );
    Ok(())
}
