//! Core record types flowing between pipeline stages

use crate::teams::TeamCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One game's moneyline quotes from the odds site.
///
/// Natural key is `(date, home_team, away_team)`; games carry no time
/// component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    pub date: NaiveDate,
    pub home_team: TeamCode,
    pub away_team: TeamCode,
    pub home_odds: f64,
    pub away_odds: f64,
}

impl OddsRecord {
    pub fn key(&self) -> (NaiveDate, TeamCode, TeamCode) {
        (self.date, self.home_team, self.away_team)
    }
}

/// One game's model output, always stated from the home perspective.
///
/// `home_win` means "the home team won the game" — per-perspective
/// outcomes are derived downstream, never stored. `None` for games that
/// have not been graded yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub date: NaiveDate,
    pub home_team: TeamCode,
    pub away_team: TeamCode,
    pub home_win_probability: f64,
    pub home_win: Option<bool>,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

/// A single-team betting perspective on one game, with its quote and
/// expected value attached. Each reconciled game yields two of these
/// (home view, away view) with complementary probabilities and outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetCandidate {
    pub date: NaiveDate,
    pub team: TeamCode,
    pub opponent: TeamCode,
    pub is_home: bool,
    pub win_probability: f64,
    pub odds: f64,
    pub expected_value: f64,
    pub realized_win: Option<bool>,
}

impl BetCandidate {
    pub fn new(
        date: NaiveDate,
        team: TeamCode,
        opponent: TeamCode,
        is_home: bool,
        win_probability: f64,
        odds: f64,
        realized_win: Option<bool>,
    ) -> Self {
        Self {
            date,
            team,
            opponent,
            is_home,
            win_probability,
            odds,
            expected_value: win_probability * odds - 1.0,
            realized_win,
        }
    }

    /// Unit-stake settlement: `odds - 1` on a win, `-1` on a loss,
    /// `None` while the game is ungraded.
    pub fn unit_profit(&self) -> Option<f64> {
        self.realized_win
            .map(|won| if won { self.odds - 1.0 } else { -1.0 })
    }

    pub fn is_graded(&self) -> bool {
        self.realized_win.is_some()
    }
}
