//! Incremental historical odds fetcher
//!
//! Usage:
//!   courtside_fetch --from 2024-01-01 --to 2024-01-31
//!   courtside_fetch --mock --from 2024-01-01 --to 2024-01-07
//!   courtside_fetch            (dates taken from the predictions table)
//!
//! Each day's raw records are archived as JSONL under data/raw/ before
//! being merged into the odds store; already-archived days are skipped
//! unless --force is given.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use courtside::config::Config;
use courtside::records::OddsRecord;
use courtside::source::{MockSource, OddsSource, PlaysportSource};
use courtside::store::{OddsStore, PredictionStore};
use courtside::teams::TeamNormalizer;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "courtside_fetch")]
#[command(about = "Fetch historical moneyline odds into the odds store")]
struct Cli {
    #[arg(long, default_value = "config/courtside.toml")]
    config: String,
    /// First US game date (YYYY-MM-DD). Defaults to the prediction
    /// table's date range.
    #[arg(long)]
    from: Option<String>,
    /// Last US game date, inclusive.
    #[arg(long)]
    to: Option<String>,
    /// Use the deterministic mock source instead of the live site.
    #[arg(long)]
    mock: bool,
    /// Refetch days that already have a raw archive.
    #[arg(long)]
    force: bool,
    /// Rebuild the odds store from the raw archives without fetching.
    #[arg(long)]
    rebuild: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Bad date: {}", s))
}

fn target_dates(cli: &Cli, config: &Config) -> Result<Vec<NaiveDate>> {
    if let (Some(from), Some(to)) = (&cli.from, &cli.to) {
        let (from, to) = (parse_date(from)?, parse_date(to)?);
        let mut dates = Vec::new();
        let mut day = from;
        while day <= to {
            dates.push(day);
            day = day + chrono::Duration::days(1);
        }
        return Ok(dates);
    }

    // No explicit range: fetch every date the prediction table covers.
    let store = PredictionStore::new(
        Path::new(&config.data_dir).join("predictions.csv"),
        TeamNormalizer::new(),
    );
    let predictions = store.load()?;
    let dates: BTreeSet<NaiveDate> = predictions.iter().map(|p| p.date).collect();
    Ok(dates.into_iter().collect())
}

fn archive_path(data_dir: &str, date: NaiveDate) -> PathBuf {
    Path::new(data_dir)
        .join("raw")
        .join(format!("odds_{}.jsonl", date.format("%Y-%m-%d")))
}

fn write_archive(path: &Path, records: &[OddsRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = String::new();
    for r in records {
        out.push_str(&serde_json::to_string(r)?);
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn read_archive(path: &Path) -> Result<Vec<OddsRecord>> {
    let content = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(line)?);
    }
    Ok(records)
}

/// Collect every day archive under data/raw, oldest first.
fn all_archives(data_dir: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(Path::new(data_dir).join("raw"))
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == "jsonl")
                    .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();
    paths.sort();
    paths
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if cli.rebuild {
        let mut all_records: Vec<OddsRecord> = Vec::new();
        for path in all_archives(&config.data_dir) {
            all_records.extend(
                read_archive(&path).with_context(|| format!("Failed to read {:?}", path))?,
            );
        }
        let store = OddsStore::new(
            Path::new(&config.data_dir).join("odds.csv"),
            TeamNormalizer::new(),
            config.reconcile.clone(),
        );
        let total = store.append(&all_records)?;
        println!("Rebuilt odds store from archives: {} rows", total);
        return Ok(());
    }

    let source: Box<dyn OddsSource> = if cli.mock {
        Box::new(MockSource::new(42, 8))
    } else {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.source.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Box::new(PlaysportSource::new(
            client,
            &config.source,
            TeamNormalizer::new(),
        ))
    };

    let dates = target_dates(&cli, &config)?;
    if dates.is_empty() {
        warn!("No dates to fetch");
        return Ok(());
    }
    info!(
        "Fetching {} days from source '{}'",
        dates.len(),
        source.name()
    );

    let bar = ProgressBar::new(dates.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut all_records: Vec<OddsRecord> = Vec::new();
    let mut fetched_days = 0usize;
    let mut reused_days = 0usize;
    let mut failed_days = 0usize;
    for date in &dates {
        bar.set_message(date.format("%Y-%m-%d").to_string());

        let archive = archive_path(&config.data_dir, *date);
        let records = if archive.exists() && !cli.force {
            reused_days += 1;
            read_archive(&archive)
                .with_context(|| format!("Failed to read archive {:?}", archive))?
        } else {
            match source.fetch_day(*date).await {
                Ok(records) => {
                    write_archive(&archive, &records)?;
                    fetched_days += 1;
                    tokio::time::sleep(Duration::from_millis(config.source.rate_limit_ms)).await;
                    records
                }
                Err(e) => {
                    // A failed day does not abort the run; the next
                    // invocation will retry anything missing.
                    warn!("Fetch failed for {}: {:#}", date, e);
                    failed_days += 1;
                    bar.inc(1);
                    continue;
                }
            }
        };
        all_records.extend(records);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let store = OddsStore::new(
        Path::new(&config.data_dir).join("odds.csv"),
        TeamNormalizer::new(),
        config.reconcile.clone(),
    );
    let total = store.append(&all_records)?;

    println!(
        "Fetched {} new days, {} reused from archive, {} failed; odds store now {} rows",
        fetched_days, reused_days, failed_days, total
    );

    Ok(())
}
