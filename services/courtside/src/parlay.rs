//! Two-leg parlay construction, grading and cross-strategy ranking

use crate::config::ParlayConfig;
use crate::records::BetCandidate;
use crate::strategy::{Strategy, StrategyName};
use crate::teams::TeamCode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Quality label attached to a ranked parlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParlayGrade {
    /// Both legs clear the walk-forward-optimized thresholds.
    Golden,
    /// Combined EV of at least 15%.
    HighValue,
    /// Combined win probability of at least 50%.
    Solid,
    Standard,
}

impl ParlayGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParlayGrade::Golden => "golden",
            ParlayGrade::HighValue => "high_value",
            ParlayGrade::Solid => "solid",
            ParlayGrade::Standard => "standard",
        }
    }
}

impl fmt::Display for ParlayGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parlay {
    pub strategy: StrategyName,
    pub grade: ParlayGrade,
    pub leg1: BetCandidate,
    pub leg2: BetCandidate,
    pub combined_odds: f64,
    pub combined_probability: f64,
    pub combined_ev: f64,
}

/// Two candidates drawn from the same physical game can never be
/// combined; one of them losing is certain.
pub fn same_game(a: &BetCandidate, b: &BetCandidate) -> bool {
    a.team == b.opponent || b.team == a.opponent
}

/// Combined (odds, probability, EV) under the independence assumption.
/// Leg outcomes are correlated in reality; this is a deliberate
/// simplification, fine for ranking same-day picks.
pub fn combined(a: &BetCandidate, b: &BetCandidate) -> (f64, f64, f64) {
    let odds = a.odds * b.odds;
    let prob = a.win_probability * b.win_probability;
    (odds, prob, prob * odds - 1.0)
}

fn grade(leg1: &BetCandidate, leg2: &BetCandidate, golden: (f64, f64)) -> ParlayGrade {
    let (prob_floor, ev_floor) = golden;
    let leg_ok = |c: &BetCandidate| c.win_probability >= prob_floor && c.expected_value >= ev_floor;
    let (_, comb_prob, comb_ev) = combined(leg1, leg2);

    if leg_ok(leg1) && leg_ok(leg2) {
        ParlayGrade::Golden
    } else if comb_ev >= 0.15 {
        ParlayGrade::HighValue
    } else if comb_prob >= 0.5 {
        ParlayGrade::Solid
    } else {
        ParlayGrade::Standard
    }
}

fn unordered_pair_key(a: &BetCandidate, b: &BetCandidate) -> (TeamCode, TeamCode) {
    if a.team <= b.team {
        (a.team, b.team)
    } else {
        (b.team, a.team)
    }
}

/// Build the day's ranked parlay list.
///
/// Per strategy (in catalog priority order): filter the day's
/// candidates, enumerate unordered two-leg combinations excluding
/// same-game pairs, rank by combined EV and keep the top few. The same
/// team pair surfaced by several strategies is kept only under the
/// highest-priority one. Fewer than two qualifying legs anywhere is an
/// empty result, not an error.
pub fn build_parlays(
    day_candidates: &[BetCandidate],
    strategies: &[Strategy],
    golden: (f64, f64),
    cfg: &ParlayConfig,
) -> Vec<Parlay> {
    let mut seen: HashSet<(TeamCode, TeamCode)> = HashSet::new();
    let mut out: Vec<Parlay> = Vec::new();

    for strategy in strategies {
        let legs: Vec<&BetCandidate> = day_candidates
            .iter()
            .filter(|c| strategy.accepts(c))
            .collect();
        if legs.len() < 2 {
            continue;
        }

        let mut pairs: Vec<(f64, &BetCandidate, &BetCandidate)> = Vec::new();
        for i in 0..legs.len() {
            for j in (i + 1)..legs.len() {
                if same_game(legs[i], legs[j]) {
                    continue;
                }
                let (_, _, ev) = combined(legs[i], legs[j]);
                pairs.push((ev, legs[i], legs[j]));
            }
        }
        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        for (_, leg1, leg2) in pairs.into_iter().take(cfg.top_per_strategy) {
            let key = unordered_pair_key(leg1, leg2);
            if !seen.insert(key) {
                continue; // An earlier (higher-priority) strategy owns this pair.
            }
            let (odds, prob, ev) = combined(leg1, leg2);
            out.push(Parlay {
                strategy: strategy.name,
                grade: grade(leg1, leg2, golden),
                leg1: leg1.clone(),
                leg2: leg2.clone(),
                combined_odds: odds,
                combined_probability: prob,
                combined_ev: ev,
            });
        }
    }

    out.sort_by(|a, b| {
        b.combined_ev
            .partial_cmp(&a.combined_ev)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out.truncate(cfg.max_output);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::catalog;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn leg(team: TeamCode, opp: TeamCode, is_home: bool, prob: f64, odds: f64) -> BetCandidate {
        BetCandidate::new(date("2024-01-05"), team, opp, is_home, prob, odds, None)
    }

    #[test]
    fn test_combined_metrics() {
        let a = leg(TeamCode::Atl, TeamCode::Was, true, 0.60, 1.90);
        let b = leg(TeamCode::Bos, TeamCode::Mia, true, 0.65, 1.70);
        let (odds, prob, ev) = combined(&a, &b);
        assert!((odds - 3.23).abs() < 1e-9);
        assert!((prob - 0.39).abs() < 1e-9);
        assert!((ev - (0.39 * 3.23 - 1.0)).abs() < 1e-9);
        assert!((ev - 0.2597).abs() < 1e-3);
    }

    #[test]
    fn test_same_game_excluded_both_directions() {
        let home = leg(TeamCode::Bos, TeamCode::Lal, true, 0.60, 1.80);
        let away = leg(TeamCode::Lal, TeamCode::Bos, false, 0.40, 2.10);
        assert!(same_game(&home, &away));
        assert!(same_game(&away, &home));

        let other = leg(TeamCode::Mia, TeamCode::Nyk, true, 0.60, 1.80);
        assert!(!same_game(&home, &other));
    }

    #[test]
    fn test_build_excludes_same_game_pairs() {
        let day = vec![
            leg(TeamCode::Bos, TeamCode::Lal, true, 0.60, 1.90),
            leg(TeamCode::Lal, TeamCode::Bos, false, 0.40, 2.90),
        ];
        let out = build_parlays(&day, &catalog(), (0.55, 0.0), &ParlayConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_fewer_than_two_legs_is_empty() {
        let day = vec![leg(TeamCode::Bos, TeamCode::Lal, true, 0.60, 1.90)];
        let out = build_parlays(&day, &catalog(), (0.55, 0.0), &ParlayConfig::default());
        assert!(out.is_empty());
        let out = build_parlays(&[], &catalog(), (0.55, 0.0), &ParlayConfig::default());
        assert!(out.is_empty());
    }

    #[test]
    fn test_dedup_keeps_highest_priority_strategy() {
        // Both legs qualify for Baseline (priority 0) and several later
        // strategies; the pair must be tagged with Baseline.
        let day = vec![
            leg(TeamCode::Bos, TeamCode::Lal, true, 0.66, 1.70),
            leg(TeamCode::Mia, TeamCode::Nyk, true, 0.66, 1.60),
        ];
        let out = build_parlays(&day, &catalog(), (0.55, 0.0), &ParlayConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].strategy, StrategyName::Baseline);
    }

    #[test]
    fn test_output_sorted_by_ev_desc() {
        let day = vec![
            leg(TeamCode::Bos, TeamCode::Lal, true, 0.66, 1.70),
            leg(TeamCode::Mia, TeamCode::Nyk, true, 0.64, 1.65),
            leg(TeamCode::Den, TeamCode::Okc, true, 0.70, 1.80),
            leg(TeamCode::Gsw, TeamCode::Sac, true, 0.60, 1.75),
        ];
        let cfg = ParlayConfig {
            top_per_strategy: 6,
            max_output: 10,
        };
        let out = build_parlays(&day, &catalog(), (0.55, 0.0), &cfg);
        assert!(out.len() >= 2);
        for pair in out.windows(2) {
            assert!(pair[0].combined_ev >= pair[1].combined_ev);
        }
        // P2 holds across the whole output.
        for p in &out {
            assert!(p.leg1.team != p.leg2.opponent && p.leg2.team != p.leg1.opponent);
        }
    }

    #[test]
    fn test_golden_grade_requires_both_legs() {
        let strong = leg(TeamCode::Bos, TeamCode::Lal, true, 0.66, 1.70); // ev 0.122
        let weak = leg(TeamCode::Mia, TeamCode::Nyk, true, 0.52, 1.60); // ev -0.168
        let golden = (0.60, 0.05);
        assert_eq!(
            grade(&strong, &weak, golden),
            // 0.66*0.52 = 0.343 prob, ev well below 0.15.
            ParlayGrade::Standard
        );

        let strong2 = leg(TeamCode::Den, TeamCode::Okc, true, 0.68, 1.65); // ev 0.122
        assert_eq!(grade(&strong, &strong2, golden), ParlayGrade::Golden);
    }

    #[test]
    fn test_high_value_and_solid_grades() {
        let a = leg(TeamCode::Bos, TeamCode::Lal, true, 0.58, 2.00); // ev 0.16
        let b = leg(TeamCode::Mia, TeamCode::Nyk, true, 0.58, 2.00);
        // Combined ev = 0.3364*4 - 1 = 0.3456 >= 0.15, legs miss golden floor.
        assert_eq!(grade(&a, &b, (0.60, 0.0)), ParlayGrade::HighValue);

        let c = leg(TeamCode::Den, TeamCode::Okc, true, 0.80, 1.30); // ev 0.04
        let d = leg(TeamCode::Gsw, TeamCode::Sac, true, 0.80, 1.30);
        // Combined prob 0.64, combined ev 0.0816 < 0.15.
        assert_eq!(grade(&c, &d, (0.85, 0.0)), ParlayGrade::Solid);
    }
}
