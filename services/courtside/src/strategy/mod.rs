//! Named betting strategies as data-driven threshold filters
//!
//! Strategy membership is carried by [`StrategyName`], never re-derived
//! from a rendered label. The catalog order doubles as the priority
//! order used when parlays from different strategies collide.

pub mod evaluate;

pub use evaluate::{evaluate, evaluate_where, StrategyReport};

use crate::records::BetCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyName {
    Baseline,
    SteadyProb,
    SteadyFiltered,
    Fortress,
    UnderdogSniper,
    DeepValue,
    Balanced,
    Precision,
    HomeEdge,
    RoadHunter,
}

impl StrategyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::Baseline => "baseline",
            StrategyName::SteadyProb => "steady_prob",
            StrategyName::SteadyFiltered => "steady_filtered",
            StrategyName::Fortress => "fortress",
            StrategyName::UnderdogSniper => "underdog_sniper",
            StrategyName::DeepValue => "deep_value",
            StrategyName::Balanced => "balanced",
            StrategyName::Precision => "precision",
            StrategyName::HomeEdge => "home_edge",
            StrategyName::RoadHunter => "road_hunter",
        }
    }

    /// Human-facing description of the filter, for console tables.
    pub fn describe(&self) -> &'static str {
        match self {
            StrategyName::Baseline => "EV >= 0",
            StrategyName::SteadyProb => "Prob >= 65%",
            StrategyName::SteadyFiltered => "Prob >= 60%, Odds >= 1.30",
            StrategyName::Fortress => "Prob >= 75%",
            StrategyName::UnderdogSniper => "Odds >= 1.75, EV >= 5%",
            StrategyName::DeepValue => "EV >= 15%",
            StrategyName::Balanced => "Prob >= 55%, Odds >= 1.60",
            StrategyName::Precision => "Prob >= 65%, EV >= 5%",
            StrategyName::HomeEdge => "Home, Prob >= 60%",
            StrategyName::RoadHunter => "Away, EV >= 5%",
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy is a tuple of inclusive thresholds, not a code branch.
/// Absent fields do not constrain.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub name: StrategyName,
    /// `Some(true)` = home legs only, `Some(false)` = away legs only.
    pub side: Option<bool>,
    pub min_prob: Option<f64>,
    pub min_odds: Option<f64>,
    pub min_ev: Option<f64>,
}

impl Strategy {
    pub fn accepts(&self, c: &BetCandidate) -> bool {
        if let Some(side) = self.side {
            if c.is_home != side {
                return false;
            }
        }
        if let Some(p) = self.min_prob {
            if c.win_probability < p {
                return false;
            }
        }
        if let Some(o) = self.min_odds {
            if c.odds < o {
                return false;
            }
        }
        if let Some(e) = self.min_ev {
            if c.expected_value < e {
                return false;
            }
        }
        true
    }
}

/// The fixed strategy library, in priority order.
pub fn catalog() -> Vec<Strategy> {
    vec![
        Strategy {
            name: StrategyName::Baseline,
            side: None,
            min_prob: None,
            min_odds: None,
            min_ev: Some(0.0),
        },
        Strategy {
            name: StrategyName::SteadyProb,
            side: None,
            min_prob: Some(0.65),
            min_odds: None,
            min_ev: None,
        },
        Strategy {
            name: StrategyName::SteadyFiltered,
            side: None,
            min_prob: Some(0.60),
            min_odds: Some(1.30),
            min_ev: None,
        },
        Strategy {
            name: StrategyName::Fortress,
            side: None,
            min_prob: Some(0.75),
            min_odds: None,
            min_ev: None,
        },
        Strategy {
            name: StrategyName::UnderdogSniper,
            side: None,
            min_prob: None,
            min_odds: Some(1.75),
            min_ev: Some(0.05),
        },
        Strategy {
            name: StrategyName::DeepValue,
            side: None,
            min_prob: None,
            min_odds: None,
            min_ev: Some(0.15),
        },
        Strategy {
            name: StrategyName::Balanced,
            side: None,
            min_prob: Some(0.55),
            min_odds: Some(1.60),
            min_ev: None,
        },
        Strategy {
            name: StrategyName::Precision,
            side: None,
            min_prob: Some(0.65),
            min_odds: None,
            min_ev: Some(0.05),
        },
        Strategy {
            name: StrategyName::HomeEdge,
            side: Some(true),
            min_prob: Some(0.60),
            min_odds: None,
            min_ev: None,
        },
        Strategy {
            name: StrategyName::RoadHunter,
            side: Some(false),
            min_prob: None,
            min_odds: None,
            min_ev: Some(0.05),
        },
    ]
}

/// Position in the catalog; lower wins parlay dedup ties.
pub fn priority(name: StrategyName) -> usize {
    catalog()
        .iter()
        .position(|s| s.name == name)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::TeamCode;
    use chrono::NaiveDate;

    fn candidate(is_home: bool, prob: f64, odds: f64) -> BetCandidate {
        BetCandidate::new(
            NaiveDate::parse_from_str("2024-01-01", "%Y-%m-%d").unwrap(),
            TeamCode::Bos,
            TeamCode::Lal,
            is_home,
            prob,
            odds,
            Some(true),
        )
    }

    #[test]
    fn test_catalog_has_ten_strategies() {
        assert_eq!(catalog().len(), 10);
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let steady = catalog()
            .into_iter()
            .find(|s| s.name == StrategyName::SteadyProb)
            .unwrap();
        assert!(steady.accepts(&candidate(true, 0.65, 1.50)));
        assert!(!steady.accepts(&candidate(true, 0.649, 1.50)));
    }

    #[test]
    fn test_side_filters() {
        let home_edge = catalog()
            .into_iter()
            .find(|s| s.name == StrategyName::HomeEdge)
            .unwrap();
        assert!(home_edge.accepts(&candidate(true, 0.62, 1.40)));
        assert!(!home_edge.accepts(&candidate(false, 0.62, 1.40)));

        let road = catalog()
            .into_iter()
            .find(|s| s.name == StrategyName::RoadHunter)
            .unwrap();
        // 0.55 * 2.0 - 1 = 0.10 >= 0.05
        assert!(road.accepts(&candidate(false, 0.55, 2.0)));
        assert!(!road.accepts(&candidate(true, 0.55, 2.0)));
    }

    #[test]
    fn test_compound_thresholds() {
        let sniper = catalog()
            .into_iter()
            .find(|s| s.name == StrategyName::UnderdogSniper)
            .unwrap();
        // 0.62 * 1.75 - 1 = 0.085
        assert!(sniper.accepts(&candidate(false, 0.62, 1.75)));
        // Odds below the floor even though EV clears it.
        assert!(!sniper.accepts(&candidate(false, 0.80, 1.50)));
    }

    #[test]
    fn test_priority_follows_catalog_order() {
        assert_eq!(priority(StrategyName::Baseline), 0);
        assert!(priority(StrategyName::RoadHunter) > priority(StrategyName::DeepValue));
    }
}
