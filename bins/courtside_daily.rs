//! Reconcile → backtest → optimize → signals → parlays pipeline CLI
//!
//! Usage:
//!   courtside_daily league
//!   courtside_daily walk-forward
//!   courtside_daily signals --date 2024-01-05
//!   courtside_daily parlays --date 2024-01-05
//!   courtside_daily run-all [--date 2024-01-05]

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use courtside::analytics::{params_for_day, run_league, walk_forward};
use courtside::config::Config;
use courtside::outputs::{write_betting_plan, write_league, write_parlays, write_walk_forward};
use courtside::parlay::build_parlays;
use courtside::reconcile::reconcile;
use courtside::records::BetCandidate;
use courtside::signal::daily_plan;
use courtside::store::{OddsStore, PredictionStore};
use courtside::strategy::catalog;
use courtside::teams::TeamNormalizer;

#[derive(Parser)]
#[command(name = "courtside_daily")]
#[command(about = "Odds/prediction reconciliation and EV strategy pipeline")]
struct Cli {
    #[arg(long, default_value = "config/courtside.toml")]
    config: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the whole strategy catalog over graded history
    League,
    /// Rolling no-lookahead simulation of the threshold optimizer
    WalkForward,
    /// Classify one day's candidates into a betting plan
    Signals {
        #[arg(long)]
        date: String,
    },
    /// Rank two-leg parlays for one day under walk-forward thresholds
    Parlays {
        #[arg(long)]
        date: String,
        /// Top combinations kept per strategy before dedup
        #[arg(long)]
        top: Option<usize>,
    },
    /// League, walk-forward, then signals and parlays for the target day
    RunAll {
        /// Defaults to the latest date in the reconciled history.
        #[arg(long)]
        date: Option<String>,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Bad date: {}", s))
}

fn load_candidates(config: &Config) -> Result<Vec<BetCandidate>> {
    let data_dir = Path::new(&config.data_dir);
    let odds_store = OddsStore::new(
        data_dir.join("odds.csv"),
        TeamNormalizer::new(),
        config.reconcile.clone(),
    );
    let prediction_store =
        PredictionStore::new(data_dir.join("predictions.csv"), TeamNormalizer::new());

    let odds = odds_store.load()?;
    let predictions = prediction_store.load()?;
    let mut candidates = reconcile(&odds, &predictions);
    candidates.sort_by_key(|c| c.date);
    Ok(candidates)
}

fn out_path(config: &Config, name: &str) -> PathBuf {
    Path::new(&config.data_dir).join(name)
}

fn day_slice(candidates: &[BetCandidate], date: NaiveDate) -> Vec<BetCandidate> {
    candidates
        .iter()
        .filter(|c| c.date == date)
        .cloned()
        .collect()
}

fn run_league_command(config: &Config, candidates: &[BetCandidate]) -> Result<()> {
    let entries = run_league(candidates, &catalog(), &config.evaluator);
    write_league(&out_path(config, "strategy_league.csv"), &entries)?;

    println!("\n=== Strategy League ===");
    println!(
        "{:<16} {:<28} {:>5} {:>7} {:>9} {:>7}",
        "strategy", "filter", "bets", "win%", "profit", "roi%"
    );
    for e in &entries {
        println!(
            "{:<16} {:<28} {:>5} {:>6.1}% {:>+8.2}u {:>+6.1}%",
            e.report.strategy,
            e.report.strategy.describe(),
            e.report.bet_count,
            e.report.win_rate * 100.0,
            e.report.total_profit,
            e.report.roi
        );
    }
    Ok(())
}

fn run_walk_forward_command(config: &Config, candidates: &[BetCandidate]) -> Result<()> {
    let report = walk_forward(candidates, &config.optimizer, &config.evaluator);
    write_walk_forward(&out_path(config, "walk_forward.csv"), &report)?;

    println!("\n=== Walk-Forward Simulation ===");
    println!("Days evaluated: {}", report.days.len());
    println!("Bets placed:    {}", report.total_bets);
    println!("Total profit:   {:+.2}u", report.total_profit);
    println!("ROI:            {:+.2}%", report.roi());
    Ok(())
}

fn run_signals_command(
    config: &Config,
    candidates: &[BetCandidate],
    date: NaiveDate,
) -> Result<()> {
    let day = day_slice(candidates, date);
    let plan = daily_plan(&day);
    let path = out_path(config, &format!("betting_plan_{}.csv", date.format("%Y-%m-%d")));
    write_betting_plan(&path, &plan)?;

    if plan.is_empty() {
        println!("\nNo actionable signals for {}", date);
        return Ok(());
    }
    println!("\n=== Betting Plan {} ===", date);
    println!(
        "{:<5} {:<5} {:>5} {:>6} {:>6}  {}",
        "team", "opp", "win%", "odds", "ev", "signal"
    );
    for row in &plan {
        println!(
            "{:<5} {:<5} {:>4.0}% {:>6.2} {:>+5.2}  {}",
            row.candidate.team,
            row.candidate.opponent,
            row.candidate.win_probability * 100.0,
            row.candidate.odds,
            row.candidate.expected_value,
            row.signal
        );
    }
    Ok(())
}

fn run_parlays_command(
    config: &Config,
    candidates: &[BetCandidate],
    date: NaiveDate,
    top: Option<usize>,
) -> Result<()> {
    let golden = params_for_day(candidates, date, &config.optimizer, &config.evaluator);
    println!(
        "Thresholds for {} (trained on earlier days): prob >= {:.2}, ev >= {:.2}",
        date, golden.0, golden.1
    );

    let mut parlay_cfg = config.parlay.clone();
    if let Some(top) = top {
        parlay_cfg.top_per_strategy = top;
    }

    let day = day_slice(candidates, date);
    let parlays = build_parlays(&day, &catalog(), golden, &parlay_cfg);
    let path = out_path(config, &format!("parlays_{}.csv", date.format("%Y-%m-%d")));
    write_parlays(&path, &parlays)?;

    if parlays.is_empty() {
        println!("Fewer than two qualifying legs; no parlays for {}", date);
        return Ok(());
    }
    println!("\n=== Parlay Ranking {} ===", date);
    println!(
        "{:<11} {:<16} {:<10} {:>7} {:>6} {:>6}",
        "grade", "strategy", "pair", "odds", "win%", "ev"
    );
    for p in &parlays {
        println!(
            "{:<11} {:<16} {:<10} {:>7.2} {:>5.1}% {:>+5.2}",
            p.grade,
            p.strategy,
            format!("{}+{}", p.leg1.team, p.leg2.team),
            p.combined_odds,
            p.combined_probability * 100.0,
            p.combined_ev
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let candidates = load_candidates(&config)?;

    match cli.command {
        Commands::League => run_league_command(&config, &candidates)?,
        Commands::WalkForward => run_walk_forward_command(&config, &candidates)?,
        Commands::Signals { date } => {
            run_signals_command(&config, &candidates, parse_date(&date)?)?
        }
        Commands::Parlays { date, top } => {
            run_parlays_command(&config, &candidates, parse_date(&date)?, top)?
        }
        Commands::RunAll { date } => {
            let target = match date {
                Some(s) => parse_date(&s)?,
                None => candidates
                    .last()
                    .map(|c| c.date)
                    .context("No reconciled candidates; nothing to run")?,
            };
            run_league_command(&config, &candidates)?;
            run_walk_forward_command(&config, &candidates)?;
            run_signals_command(&config, &candidates, target)?;
            run_parlays_command(&config, &candidates, target, None)?;

            println!("\n=== Pipeline Summary ===");
            println!("Candidates reconciled: {}", candidates.len());
            println!("Target day: {}", target);
        }
    }

    Ok(())
}
