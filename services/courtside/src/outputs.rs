//! CSV snapshot writers for downstream consumers
//!
//! Every writer goes through an atomic temp-file-and-rename replace, so
//! a reader polling the output directory never sees a half-written
//! table. Values are rounded here and only here; upstream computation
//! stays on raw floats.

use crate::analytics::backtest::LeagueEntry;
use crate::analytics::optimizer::WalkForwardReport;
use crate::parlay::Parlay;
use crate::signal::PlanRow;
use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Replace `path` with `df` without exposing a partial file.
pub fn write_csv_atomic(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let file = std::fs::File::create(&tmp)
            .with_context(|| format!("Failed to create {:?}", tmp))?;
        CsvWriter::new(file)
            .include_header(true)
            .with_float_precision(Some(4))
            .finish(df)
            .with_context(|| format!("Failed to write {:?}", tmp))?;
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}

/// Daily betting plan: one row per actionable signal.
pub fn write_betting_plan(path: &Path, rows: &[PlanRow]) -> Result<()> {
    let date_col: Vec<String> = rows
        .iter()
        .map(|r| r.candidate.date.format("%Y-%m-%d").to_string())
        .collect();
    let team_col: Vec<&str> = rows.iter().map(|r| r.candidate.team.as_str()).collect();
    let opp_col: Vec<&str> = rows.iter().map(|r| r.candidate.opponent.as_str()).collect();
    let side_col: Vec<&str> = rows
        .iter()
        .map(|r| if r.candidate.is_home { "home" } else { "away" })
        .collect();
    let prob_col: Vec<f64> = rows.iter().map(|r| r.candidate.win_probability).collect();
    let odds_col: Vec<f64> = rows.iter().map(|r| r.candidate.odds).collect();
    let ev_col: Vec<f64> = rows.iter().map(|r| r.candidate.expected_value).collect();
    let signal_col: Vec<&str> = rows.iter().map(|r| r.signal.label()).collect();
    let rank_col: Vec<u32> = rows.iter().map(|r| r.signal.rank() as u32).collect();

    let mut df = DataFrame::new(vec![
        Series::new("date", date_col),
        Series::new("team", team_col),
        Series::new("opponent", opp_col),
        Series::new("side", side_col),
        Series::new("win_probability", prob_col),
        Series::new("odds", odds_col),
        Series::new("expected_value", ev_col),
        Series::new("signal", signal_col),
        Series::new("rank", rank_col),
    ])?;

    write_csv_atomic(path, &mut df)?;
    info!("Wrote {} plan rows to {:?}", rows.len(), path);
    Ok(())
}

/// Strategy league table, one row per catalog strategy.
pub fn write_league(path: &Path, entries: &[LeagueEntry]) -> Result<()> {
    let strategy_col: Vec<&str> = entries
        .iter()
        .map(|e| e.report.strategy.as_str())
        .collect();
    let filter_col: Vec<&str> = entries
        .iter()
        .map(|e| e.report.strategy.describe())
        .collect();
    let bets_col: Vec<u32> = entries.iter().map(|e| e.report.bet_count as u32).collect();
    let wins_col: Vec<u32> = entries.iter().map(|e| e.report.wins as u32).collect();
    let win_rate_col: Vec<f64> = entries.iter().map(|e| e.report.win_rate).collect();
    let profit_col: Vec<f64> = entries.iter().map(|e| e.report.total_profit).collect();
    let roi_col: Vec<f64> = entries.iter().map(|e| e.report.roi).collect();

    let mut df = DataFrame::new(vec![
        Series::new("strategy", strategy_col),
        Series::new("filter", filter_col),
        Series::new("bets", bets_col),
        Series::new("wins", wins_col),
        Series::new("win_rate", win_rate_col),
        Series::new("total_profit", profit_col),
        Series::new("roi", roi_col),
    ])?;

    write_csv_atomic(path, &mut df)?;
    info!("Wrote league table ({} strategies) to {:?}", entries.len(), path);
    Ok(())
}

/// Walk-forward day series with the thresholds each day trained to.
pub fn write_walk_forward(path: &Path, report: &WalkForwardReport) -> Result<()> {
    let date_col: Vec<String> = report
        .days
        .iter()
        .map(|d| d.date.format("%Y-%m-%d").to_string())
        .collect();
    let prob_col: Vec<f64> = report.days.iter().map(|d| d.prob_threshold).collect();
    let ev_col: Vec<f64> = report.days.iter().map(|d| d.ev_threshold).collect();
    let bets_col: Vec<u32> = report.days.iter().map(|d| d.bets as u32).collect();
    let profit_col: Vec<f64> = report.days.iter().map(|d| d.profit).collect();
    let cumulative_col: Vec<f64> = report.days.iter().map(|d| d.cumulative_profit).collect();

    let mut df = DataFrame::new(vec![
        Series::new("date", date_col),
        Series::new("prob_threshold", prob_col),
        Series::new("ev_threshold", ev_col),
        Series::new("bets", bets_col),
        Series::new("profit", profit_col),
        Series::new("cumulative_profit", cumulative_col),
    ])?;

    write_csv_atomic(path, &mut df)?;
    info!("Wrote walk-forward series ({} days) to {:?}", report.days.len(), path);
    Ok(())
}

/// Ranked parlay recommendations for the day.
pub fn write_parlays(path: &Path, parlays: &[Parlay]) -> Result<()> {
    let date_col: Vec<String> = parlays
        .iter()
        .map(|p| p.leg1.date.format("%Y-%m-%d").to_string())
        .collect();
    let grade_col: Vec<&str> = parlays.iter().map(|p| p.grade.as_str()).collect();
    let strategy_col: Vec<&str> = parlays.iter().map(|p| p.strategy.as_str()).collect();
    let team1_col: Vec<&str> = parlays.iter().map(|p| p.leg1.team.as_str()).collect();
    let team2_col: Vec<&str> = parlays.iter().map(|p| p.leg2.team.as_str()).collect();
    let odds_col: Vec<f64> = parlays.iter().map(|p| p.combined_odds).collect();
    let prob_col: Vec<f64> = parlays.iter().map(|p| p.combined_probability).collect();
    let ev_col: Vec<f64> = parlays.iter().map(|p| p.combined_ev).collect();

    let mut df = DataFrame::new(vec![
        Series::new("date", date_col),
        Series::new("grade", grade_col),
        Series::new("strategy", strategy_col),
        Series::new("team_1", team1_col),
        Series::new("team_2", team2_col),
        Series::new("combined_odds", odds_col),
        Series::new("combined_probability", prob_col),
        Series::new("combined_ev", ev_col),
    ])?;

    write_csv_atomic(path, &mut df)?;
    info!("Wrote {} parlays to {:?}", parlays.len(), path);
    Ok(())
}
