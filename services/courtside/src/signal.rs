//! Daily single-game signal classification
//!
//! Turns a day's bet candidates into a ranked betting plan. Signals are
//! tagged with an enum; the display label is presentation only and is
//! never parsed back.

use crate::records::BetCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Home side in the 60-70% probability band with positive EV.
    RoiKing,
    /// Home side in the 50-60% band with positive EV.
    HomeValue,
    /// Either side with EV of at least 20%.
    HighEv,
    /// Heavy away favorite worth anchoring a parlay on.
    Anchor,
    /// Favorite priced too short to carry value.
    OddsTooLow,
    Pass,
}

impl SignalKind {
    pub fn rank(&self) -> u8 {
        match self {
            SignalKind::RoiKing => 3,
            SignalKind::HomeValue | SignalKind::HighEv => 2,
            SignalKind::Anchor => 1,
            SignalKind::OddsTooLow | SignalKind::Pass => 0,
        }
    }

    /// A straight single-game bet recommendation.
    pub fn is_bet(&self) -> bool {
        matches!(
            self,
            SignalKind::RoiKing | SignalKind::HomeValue | SignalKind::HighEv
        )
    }

    /// Eligible as a parlay leg (anchors qualify, passes do not).
    pub fn parlay_eligible(&self) -> bool {
        self.rank() >= 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::RoiKing => "BET (ROI King)",
            SignalKind::HomeValue => "BET (Value)",
            SignalKind::HighEv => "BET (High EV)",
            SignalKind::Anchor => "ANCHOR",
            SignalKind::OddsTooLow => "PASS (Odds Too Low)",
            SignalKind::Pass => "PASS",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One rule in the classification table. Probability bounds are
/// half-open (`prob_min <= p < prob_max`); EV bounds are strict
/// (`ev > ev_above`, `ev < ev_below`).
struct SignalRule {
    side: Option<bool>,
    prob_min: Option<f64>,
    prob_max: Option<f64>,
    ev_above: Option<f64>,
    ev_below: Option<f64>,
    kind: SignalKind,
}

impl SignalRule {
    fn matches(&self, c: &BetCandidate) -> bool {
        if let Some(side) = self.side {
            if c.is_home != side {
                return false;
            }
        }
        if let Some(lo) = self.prob_min {
            if c.win_probability < lo {
                return false;
            }
        }
        if let Some(hi) = self.prob_max {
            if c.win_probability >= hi {
                return false;
            }
        }
        if let Some(lo) = self.ev_above {
            if c.expected_value <= lo {
                return false;
            }
        }
        if let Some(hi) = self.ev_below {
            if c.expected_value >= hi {
                return false;
            }
        }
        true
    }
}

fn rules() -> Vec<SignalRule> {
    vec![
        SignalRule {
            side: Some(true),
            prob_min: Some(0.60),
            prob_max: Some(0.70),
            ev_above: Some(0.0),
            ev_below: None,
            kind: SignalKind::RoiKing,
        },
        SignalRule {
            side: Some(true),
            prob_min: Some(0.50),
            prob_max: Some(0.60),
            ev_above: Some(0.0),
            ev_below: None,
            kind: SignalKind::HomeValue,
        },
        SignalRule {
            side: None,
            prob_min: None,
            prob_max: None,
            ev_above: Some(0.20),
            ev_below: None,
            kind: SignalKind::HighEv,
        },
        SignalRule {
            side: None,
            prob_min: Some(0.80),
            prob_max: None,
            ev_above: None,
            ev_below: Some(0.15),
            kind: SignalKind::OddsTooLow,
        },
        SignalRule {
            side: Some(false),
            prob_min: Some(0.75),
            prob_max: None,
            ev_above: None,
            ev_below: None,
            kind: SignalKind::Anchor,
        },
    ]
}

/// First matching rule wins; no rule means `Pass`.
pub fn classify(candidate: &BetCandidate) -> SignalKind {
    rules()
        .iter()
        .find(|r| r.matches(candidate))
        .map(|r| r.kind)
        .unwrap_or(SignalKind::Pass)
}

/// One row of the daily betting plan.
#[derive(Debug, Clone)]
pub struct PlanRow {
    pub candidate: BetCandidate,
    pub signal: SignalKind,
}

/// Classify a day's candidates and keep the actionable rows, ordered by
/// rank then probability, both descending.
pub fn daily_plan(day_candidates: &[BetCandidate]) -> Vec<PlanRow> {
    let mut rows: Vec<PlanRow> = day_candidates
        .iter()
        .map(|c| PlanRow {
            candidate: c.clone(),
            signal: classify(c),
        })
        .filter(|row| row.signal.parlay_eligible())
        .collect();

    rows.sort_by(|a, b| {
        b.signal
            .rank()
            .cmp(&a.signal.rank())
            .then_with(|| {
                b.candidate
                    .win_probability
                    .partial_cmp(&a.candidate.win_probability)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
    rows
}
