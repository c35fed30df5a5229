//! Full-history league table across the strategy catalog

use crate::config::EvaluatorConfig;
use crate::records::BetCandidate;
use crate::strategy::evaluate::{cumulative_profit, evaluate, StrategyReport};
use crate::strategy::Strategy;
use chrono::NaiveDate;

/// One strategy's backtest result plus its running profit curve.
#[derive(Debug, Clone)]
pub struct LeagueEntry {
    pub report: StrategyReport,
    pub curve: Vec<(NaiveDate, f64)>,
}

/// Evaluate every catalog strategy over the same graded history and
/// rank by ROI, best first. Strategies with no qualifying bets stay in
/// the table with an all-zero row.
pub fn run_league(
    candidates: &[BetCandidate],
    strategies: &[Strategy],
    cfg: &EvaluatorConfig,
) -> Vec<LeagueEntry> {
    let mut entries: Vec<LeagueEntry> = strategies
        .iter()
        .map(|s| LeagueEntry {
            report: evaluate(s, candidates, cfg),
            curve: cumulative_profit(s, candidates, cfg),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.report
            .roi
            .partial_cmp(&a.report.roi)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}
