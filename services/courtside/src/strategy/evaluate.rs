//! Aggregate strategy performance over graded candidates

use crate::config::EvaluatorConfig;
use crate::records::BetCandidate;
use crate::strategy::{Strategy, StrategyName};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Snapshot of one strategy's historical performance. Recomputed fresh
/// on every run; the CSV export is never treated as mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy: StrategyName,
    pub bet_count: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_profit: f64,
    pub roi: f64,
}

impl StrategyReport {
    pub fn empty(strategy: StrategyName) -> Self {
        Self {
            strategy,
            bet_count: 0,
            wins: 0,
            win_rate: 0.0,
            total_profit: 0.0,
            roi: 0.0,
        }
    }
}

/// Unit-stake settlement with the corrupt-quote guard applied: a profit
/// above `clip` units is implausible for a single moneyline bet and is
/// zeroed so it cannot distort the cumulative series. The bet itself
/// still counts. Ungraded candidates settle to `None`.
pub fn clipped_profit(candidate: &BetCandidate, clip: f64) -> Option<f64> {
    let profit = candidate.unit_profit()?;
    if profit > clip {
        warn!(
            "Clipping implausible profit {:+.2}u for {} on {} (odds {:.2})",
            profit, candidate.team, candidate.date, candidate.odds
        );
        return Some(0.0);
    }
    Some(profit)
}

/// Evaluate an arbitrary predicate as a strategy. Zero qualifying bets
/// yields an all-zero report rather than an error or NaN.
pub fn evaluate_where<F>(
    name: StrategyName,
    predicate: F,
    candidates: &[BetCandidate],
    cfg: &EvaluatorConfig,
) -> StrategyReport
where
    F: Fn(&BetCandidate) -> bool,
{
    let mut bet_count = 0usize;
    let mut wins = 0usize;
    let mut total_profit = 0.0f64;

    for candidate in candidates.iter().filter(|c| predicate(c)) {
        let Some(won) = candidate.realized_win else {
            continue; // Ungraded games carry no settlement.
        };
        let Some(profit) = clipped_profit(candidate, cfg.profit_clip_units) else {
            continue;
        };
        bet_count += 1;
        if won {
            wins += 1;
        }
        total_profit += profit;
    }

    if bet_count == 0 {
        return StrategyReport::empty(name);
    }

    StrategyReport {
        strategy: name,
        bet_count,
        wins,
        win_rate: wins as f64 / bet_count as f64,
        total_profit,
        roi: total_profit / bet_count as f64 * 100.0,
    }
}

pub fn evaluate(
    strategy: &Strategy,
    candidates: &[BetCandidate],
    cfg: &EvaluatorConfig,
) -> StrategyReport {
    evaluate_where(strategy.name, |c| strategy.accepts(c), candidates, cfg)
}

/// Per-date running profit for one strategy, for the league export.
/// Candidates are bucketed by date in chronological order.
pub fn cumulative_profit(
    strategy: &Strategy,
    candidates: &[BetCandidate],
    cfg: &EvaluatorConfig,
) -> Vec<(NaiveDate, f64)> {
    let mut picked: Vec<&BetCandidate> = candidates
        .iter()
        .filter(|c| strategy.accepts(c) && c.is_graded())
        .collect();
    picked.sort_by_key(|c| c.date);

    let mut series: Vec<(NaiveDate, f64)> = Vec::new();
    let mut running = 0.0f64;
    for c in picked {
        if let Some(profit) = clipped_profit(c, cfg.profit_clip_units) {
            running += profit;
            match series.last_mut() {
                Some(last) if last.0 == c.date => last.1 = running,
                _ => series.push((c.date, running)),
            }
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::catalog;
    use crate::teams::TeamCode;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn graded(d: &str, prob: f64, odds: f64, won: bool) -> BetCandidate {
        BetCandidate::new(
            date(d),
            TeamCode::Bos,
            TeamCode::Lal,
            true,
            prob,
            odds,
            Some(won),
        )
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let report = evaluate_where(
            StrategyName::Baseline,
            |_| true,
            &[],
            &EvaluatorConfig::default(),
        );
        assert_eq!(report.bet_count, 0);
        assert_eq!(report.win_rate, 0.0);
        assert_eq!(report.roi, 0.0);
        assert!(!report.roi.is_nan());
    }

    #[test]
    fn test_no_matches_is_all_zero() {
        let candidates = vec![graded("2024-01-01", 0.55, 1.80, true)];
        let report = evaluate_where(
            StrategyName::Fortress,
            |c| c.win_probability >= 0.70,
            &candidates,
            &EvaluatorConfig::default(),
        );
        assert_eq!(report.bet_count, 0);
        assert_eq!(report.roi, 0.0);
    }

    #[test]
    fn test_profit_and_roi() {
        let candidates = vec![
            graded("2024-01-01", 0.60, 1.80, true),  // +0.80
            graded("2024-01-02", 0.60, 1.90, false), // -1.00
            graded("2024-01-03", 0.60, 2.00, true),  // +1.00
        ];
        let report = evaluate_where(
            StrategyName::Baseline,
            |_| true,
            &candidates,
            &EvaluatorConfig::default(),
        );
        assert_eq!(report.bet_count, 3);
        assert_eq!(report.wins, 2);
        assert!((report.total_profit - 0.80).abs() < 1e-9);
        assert!((report.roi - 0.80 / 3.0 * 100.0).abs() < 1e-9);
        assert!((report.win_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_implausible_profit_clipped_but_counted() {
        let mut corrupt = graded("2024-01-01", 0.30, 15.0, true);
        corrupt.odds = 15.0; // +14u on a win, above the 10u ceiling.
        let candidates = vec![corrupt, graded("2024-01-02", 0.60, 1.80, false)];

        let report = evaluate_where(
            StrategyName::Baseline,
            |_| true,
            &candidates,
            &EvaluatorConfig::default(),
        );
        assert_eq!(report.bet_count, 2);
        assert_eq!(report.wins, 1);
        // Clipped win contributes nothing; the loss still costs a unit.
        assert!((report.total_profit + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ungraded_candidates_skipped() {
        let mut future = graded("2024-01-05", 0.60, 1.80, true);
        future.realized_win = None;
        let candidates = vec![graded("2024-01-01", 0.60, 1.80, true), future];

        let report = evaluate_where(
            StrategyName::Baseline,
            |_| true,
            &candidates,
            &EvaluatorConfig::default(),
        );
        assert_eq!(report.bet_count, 1);
    }

    #[test]
    fn test_catalog_evaluate() {
        let candidates = vec![
            graded("2024-01-01", 0.66, 1.50, true),
            graded("2024-01-02", 0.40, 2.40, false),
        ];
        let steady = catalog()
            .into_iter()
            .find(|s| s.name == StrategyName::SteadyProb)
            .unwrap();
        let report = evaluate(&steady, &candidates, &EvaluatorConfig::default());
        assert_eq!(report.bet_count, 1);
        assert_eq!(report.wins, 1);
    }

    #[test]
    fn test_cumulative_series_buckets_by_date() {
        let candidates = vec![
            graded("2024-01-01", 0.60, 1.80, true),
            graded("2024-01-01", 0.60, 2.00, false),
            graded("2024-01-03", 0.70, 1.50, true),
        ];
        let baseline = catalog()[0];
        let series = cumulative_profit(&baseline, &candidates, &EvaluatorConfig::default());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].0, date("2024-01-01"));
        assert!((series[0].1 - (-0.20)).abs() < 1e-9);
        assert!((series[1].1 - 0.30).abs() < 1e-9);
    }
}
