//! Walk-forward threshold selection
//!
//! Picks the (probability, EV) floor pair that maximized historical ROI,
//! using only data strictly before the day being decided. The same
//! search also drives a rolling simulation that replays every historical
//! day under the parameters it would have chosen at the time.

use crate::config::{EvaluatorConfig, OptimizerConfig};
use crate::parlay;
use crate::records::BetCandidate;
use crate::strategy::evaluate::clipped_profit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

fn passes(c: &BetCandidate, prob_floor: f64, ev_floor: f64) -> bool {
    c.win_probability >= prob_floor && c.expected_value >= ev_floor
}

/// Grid-search the threshold pair with the best mean per-bet profit on
/// the given training slice.
///
/// Cold start: fewer graded rows than `min_train_rows` returns the
/// configured default pair without searching. A grid cell backed by
/// fewer than `min_cell_rows` bets is ineligible. Ties keep the first
/// cell in grid order (probability outer, EV inner), so selection is
/// deterministic.
pub fn best_params(
    train: &[BetCandidate],
    cfg: &OptimizerConfig,
    eval_cfg: &EvaluatorConfig,
) -> (f64, f64) {
    let graded: Vec<&BetCandidate> = train.iter().filter(|c| c.is_graded()).collect();
    if graded.len() < cfg.min_train_rows {
        debug!(
            "Training set {} below minimum {}; using default thresholds",
            graded.len(),
            cfg.min_train_rows
        );
        return (cfg.default_prob, cfg.default_ev);
    }

    let mut best = (cfg.default_prob, cfg.default_ev);
    let mut best_roi = f64::NEG_INFINITY;

    for &p in &cfg.prob_grid {
        for &e in &cfg.ev_grid {
            let profits: Vec<f64> = graded
                .iter()
                .filter(|c| passes(c, p, e))
                .filter_map(|c| clipped_profit(c, eval_cfg.profit_clip_units))
                .collect();
            if profits.len() < cfg.min_cell_rows {
                continue;
            }
            let roi = profits.iter().sum::<f64>() / profits.len() as f64 * 100.0;
            if roi > best_roi {
                best_roi = roi;
                best = (p, e);
            }
        }
    }

    best
}

/// Thresholds for `day`, trained on everything strictly earlier.
pub fn params_for_day(
    history: &[BetCandidate],
    day: NaiveDate,
    cfg: &OptimizerConfig,
    eval_cfg: &EvaluatorConfig,
) -> (f64, f64) {
    let train: Vec<BetCandidate> = history.iter().filter(|c| c.date < day).cloned().collect();
    best_params(&train, cfg, eval_cfg)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardDay {
    pub date: NaiveDate,
    pub prob_threshold: f64,
    pub ev_threshold: f64,
    pub bets: usize,
    pub profit: f64,
    pub cumulative_profit: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkForwardReport {
    pub days: Vec<WalkForwardDay>,
    pub total_bets: usize,
    pub total_profit: f64,
}

impl WalkForwardReport {
    pub fn roi(&self) -> f64 {
        if self.total_bets == 0 {
            0.0
        } else {
            self.total_profit / self.total_bets as f64 * 100.0
        }
    }
}

/// Replay history one day at a time: learn thresholds from strictly
/// earlier days, stake one unit on that day's best parlay by combined
/// EV, settle, move on. The first `warmup_days` game days only
/// accumulate training data.
pub fn walk_forward(
    history: &[BetCandidate],
    cfg: &OptimizerConfig,
    eval_cfg: &EvaluatorConfig,
) -> WalkForwardReport {
    let dates: Vec<NaiveDate> = history
        .iter()
        .filter(|c| c.is_graded())
        .map(|c| c.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut report = WalkForwardReport::default();
    let mut cumulative = 0.0f64;

    for day in dates.iter().skip(cfg.warmup_days) {
        let train: Vec<BetCandidate> = history.iter().filter(|c| c.date < *day).cloned().collect();
        let (prob_floor, ev_floor) = best_params(&train, cfg, eval_cfg);

        let today: Vec<&BetCandidate> = history
            .iter()
            .filter(|c| c.date == *day && c.is_graded() && passes(c, prob_floor, ev_floor))
            .collect();

        let mut day_bets = 0usize;
        let mut day_profit = 0.0f64;

        if today.len() >= 2 {
            let mut best: Option<(f64, &BetCandidate, &BetCandidate)> = None;
            for i in 0..today.len() {
                for j in (i + 1)..today.len() {
                    if parlay::same_game(today[i], today[j]) {
                        continue;
                    }
                    let (_, _, ev) = parlay::combined(today[i], today[j]);
                    if best.as_ref().map(|(b, _, _)| ev > *b).unwrap_or(true) {
                        best = Some((ev, today[i], today[j]));
                    }
                }
            }
            if let Some((_, leg1, leg2)) = best {
                if let (Some(w1), Some(w2)) = (leg1.realized_win, leg2.realized_win) {
                    let (odds, _, _) = parlay::combined(leg1, leg2);
                    day_bets = 1;
                    day_profit = if w1 && w2 { odds - 1.0 } else { -1.0 };
                }
            }
        }

        cumulative += day_profit;
        report.total_bets += day_bets;
        report.total_profit += day_profit;
        report.days.push(WalkForwardDay {
            date: *day,
            prob_threshold: prob_floor,
            ev_threshold: ev_floor,
            bets: day_bets,
            profit: day_profit,
            cumulative_profit: cumulative,
        });
    }

    info!(
        "Walk-forward: {} days, {} bets, {:+.2}u, ROI {:.2}%",
        report.days.len(),
        report.total_bets,
        report.total_profit,
        report.roi()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::TeamCode;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn graded(d: &str, team: TeamCode, opp: TeamCode, prob: f64, odds: f64, won: bool) -> BetCandidate {
        BetCandidate::new(date(d), team, opp, true, prob, odds, Some(won))
    }

    fn small_cfg() -> OptimizerConfig {
        OptimizerConfig {
            min_train_rows: 4,
            min_cell_rows: 2,
            warmup_days: 1,
            ..OptimizerConfig::default()
        }
    }

    #[test]
    fn test_cold_start_returns_defaults() {
        let cfg = OptimizerConfig::default(); // min_train_rows = 50
        let train: Vec<BetCandidate> = (0..5)
            .map(|i| {
                graded(
                    "2024-01-01",
                    TeamCode::Bos,
                    TeamCode::Lal,
                    0.60 + i as f64 * 0.01,
                    1.80,
                    true,
                )
            })
            .collect();
        assert_eq!(
            best_params(&train, &cfg, &EvaluatorConfig::default()),
            (cfg.default_prob, cfg.default_ev)
        );
    }

    #[test]
    fn test_grid_prefers_profitable_cell() {
        // Winners at prob 0.70, losers at 0.56 with positive EV.
        let mut train = Vec::new();
        for i in 0..10 {
            train.push(graded(
                &format!("2024-01-{:02}", i + 1),
                TeamCode::Bos,
                TeamCode::Lal,
                0.70,
                1.60,
                true,
            ));
            train.push(graded(
                &format!("2024-01-{:02}", i + 1),
                TeamCode::Mia,
                TeamCode::Nyk,
                0.56,
                2.00,
                false,
            ));
        }
        // Losers qualify everywhere below prob 0.60, so the first cell
        // that excludes them wins; later equally-good cells lose the tie.
        let params = best_params(&train, &small_cfg(), &EvaluatorConfig::default());
        assert_eq!(params, (0.60, 0.0));
    }

    #[test]
    fn test_no_lookahead() {
        // A wildly profitable future day must not affect today's choice.
        let mut history = Vec::new();
        for i in 0..10 {
            history.push(graded(
                &format!("2024-01-{:02}", i + 1),
                TeamCode::Bos,
                TeamCode::Lal,
                0.56,
                1.80,
                i % 2 == 0,
            ));
        }
        history.push(graded(
            "2024-02-01",
            TeamCode::Den,
            TeamCode::Okc,
            0.66,
            2.50,
            true,
        ));

        let cfg = small_cfg();
        let on_jan15 = params_for_day(&history, date("2024-01-15"), &cfg, &EvaluatorConfig::default());
        let without_future: Vec<BetCandidate> = history
            .iter()
            .filter(|c| c.date < date("2024-01-15"))
            .cloned()
            .collect();
        assert_eq!(
            on_jan15,
            best_params(&without_future, &cfg, &EvaluatorConfig::default())
        );
    }

    #[test]
    fn test_walk_forward_warmup_produces_no_bets() {
        let history = vec![
            graded("2024-01-01", TeamCode::Bos, TeamCode::Lal, 0.60, 1.80, true),
            graded("2024-01-02", TeamCode::Mia, TeamCode::Nyk, 0.60, 1.80, true),
        ];
        let cfg = OptimizerConfig {
            warmup_days: 2,
            ..OptimizerConfig::default()
        };
        let report = walk_forward(&history, &cfg, &EvaluatorConfig::default());
        assert!(report.days.is_empty());
        assert_eq!(report.total_bets, 0);
        assert_eq!(report.roi(), 0.0);
    }

    #[test]
    fn test_walk_forward_settles_top_parlay() {
        // One warmup day, then a day with two qualifying winners.
        let history = vec![
            graded("2024-01-01", TeamCode::Den, TeamCode::Okc, 0.60, 1.80, true),
            graded("2024-01-02", TeamCode::Bos, TeamCode::Lal, 0.62, 1.80, true),
            graded("2024-01-02", TeamCode::Mia, TeamCode::Nyk, 0.60, 1.70, true),
        ];
        let report = walk_forward(&history, &small_cfg(), &EvaluatorConfig::default());
        assert_eq!(report.days.len(), 1);
        assert_eq!(report.total_bets, 1);
        assert!((report.total_profit - (1.80 * 1.70 - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_walk_forward_cumulative_is_running_sum() {
        let mut history = Vec::new();
        for i in 0..6 {
            history.push(graded(
                &format!("2024-01-{:02}", i + 1),
                TeamCode::Bos,
                TeamCode::Lal,
                0.60,
                1.80,
                true,
            ));
            history.push(graded(
                &format!("2024-01-{:02}", i + 1),
                TeamCode::Mia,
                TeamCode::Nyk,
                0.60,
                1.70,
                false,
            ));
        }
        let report = walk_forward(&history, &small_cfg(), &EvaluatorConfig::default());
        let mut running = 0.0;
        for day in &report.days {
            running += day.profit;
            assert!((day.cumulative_profit - running).abs() < 1e-9);
        }
    }
}
