//! Join odds quotes with model predictions into per-team bet candidates

use crate::records::{BetCandidate, OddsRecord, PredictionRecord};
use crate::teams::TeamCode;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Index a day's quotes by `(date, team)`.
///
/// Each game contributes two entries, one per side, so a prediction whose
/// home/away assignment disagrees with the odds source still finds its
/// quote — the lookup never depends on orientation. Requires that no team
/// plays twice on one date; when that assumption breaks the colliding
/// team-date is unusable and both quotes are discarded.
fn quote_index(odds: &[OddsRecord]) -> HashMap<(NaiveDate, TeamCode), f64> {
    let mut index: HashMap<(NaiveDate, TeamCode), f64> = HashMap::new();
    let mut poisoned: Vec<(NaiveDate, TeamCode)> = Vec::new();

    for record in odds {
        for (team, quote) in [
            (record.home_team, record.home_odds),
            (record.away_team, record.away_odds),
        ] {
            let key = (record.date, team);
            if index.insert(key, quote).is_some() {
                poisoned.push(key);
            }
        }
    }

    for key in poisoned {
        warn!(
            "Team {} has more than one game on {}; discarding its quotes for that date",
            key.1, key.0
        );
        index.remove(&key);
    }

    index
}

/// Derive the two per-team candidates for every prediction that has a
/// matching quote. A side with no quote is dropped silently — the market
/// may simply not have opened, or the game predates odds coverage.
pub fn reconcile(odds: &[OddsRecord], predictions: &[PredictionRecord]) -> Vec<BetCandidate> {
    let index = quote_index(odds);
    let mut candidates = Vec::with_capacity(predictions.len() * 2);
    let mut unmatched = 0usize;

    for pred in predictions {
        let sides = [
            (
                pred.home_team,
                pred.away_team,
                true,
                pred.home_win_probability,
                pred.home_win,
            ),
            (
                pred.away_team,
                pred.home_team,
                false,
                1.0 - pred.home_win_probability,
                pred.home_win.map(|won| !won),
            ),
        ];

        for (team, opponent, is_home, probability, outcome) in sides {
            match index.get(&(pred.date, team)) {
                Some(&quote) => candidates.push(BetCandidate::new(
                    pred.date, team, opponent, is_home, probability, quote, outcome,
                )),
                None => {
                    unmatched += 1;
                    debug!("No quote for {} on {}", team, pred.date);
                }
            }
        }
    }

    if unmatched > 0 {
        debug!("{} prediction sides had no matching quote", unmatched);
    }
    candidates
}
