//! Read-only view over the externally produced predictions table

use crate::error::CourtsideError;
use crate::records::PredictionRecord;
use crate::teams::TeamNormalizer;
use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The predictions table is written by the upstream model, never by this
/// pipeline. `home_win_prob` is the model's probability that the home
/// team wins; `home_win` (0/1, optional) records whether the home team
/// actually won. Rows for ungraded games simply leave the outcome
/// columns empty.
pub struct PredictionStore {
    path: PathBuf,
    normalizer: TeamNormalizer,
}

impl PredictionStore {
    pub fn new<P: Into<PathBuf>>(path: P, normalizer: TeamNormalizer) -> Self {
        Self {
            path: path.into(),
            normalizer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<PredictionRecord>> {
        if !self.path.exists() {
            return Err(CourtsideError::MissingTable(self.path.clone()).into());
        }

        let df = LazyCsvReader::new(&self.path)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| CourtsideError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let malformed = |reason: String| CourtsideError::Malformed {
            path: self.path.clone(),
            reason,
        };

        let date_col = df
            .column("date")
            .and_then(|c| c.str())
            .map_err(|e| malformed(e.to_string()))?
            .clone();
        let home_col = df
            .column("home_team")
            .and_then(|c| c.str())
            .map_err(|e| malformed(e.to_string()))?
            .clone();
        let away_col = df
            .column("away_team")
            .and_then(|c| c.str())
            .map_err(|e| malformed(e.to_string()))?
            .clone();
        let prob = df
            .column("home_win_prob")
            .and_then(|c| c.cast(&DataType::Float64))
            .map_err(|e| malformed(e.to_string()))?;
        let prob = prob.f64().map_err(|e| malformed(e.to_string()))?;

        // Outcome and score columns are optional; absent means ungraded.
        let home_win = optional_i64(&df, "home_win");
        let home_score = optional_i64(&df, "home_score");
        let away_score = optional_i64(&df, "away_score");

        let mut rows = Vec::with_capacity(df.height());
        let mut dropped = 0usize;
        for i in 0..df.height() {
            let parsed = date_col
                .get(i)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
            let date = match parsed {
                Some(d) => d,
                None => {
                    dropped += 1;
                    continue;
                }
            };
            let home_team = self.normalizer.normalize(home_col.get(i).unwrap_or(""));
            let away_team = self.normalizer.normalize(away_col.get(i).unwrap_or(""));
            let p = prob.get(i).unwrap_or(f64::NAN);

            if !home_team.is_known()
                || !away_team.is_known()
                || home_team == away_team
                || !(0.0..=1.0).contains(&p)
            {
                dropped += 1;
                continue;
            }

            rows.push(PredictionRecord {
                date,
                home_team,
                away_team,
                home_win_probability: p,
                home_win: get_i64(&home_win, i).map(|v| v != 0),
                home_score: get_i64(&home_score, i).map(|v| v as u32),
                away_score: get_i64(&away_score, i).map(|v| v as u32),
            });
        }
        if dropped > 0 {
            warn!(
                "Dropped {} invalid prediction rows from {:?}",
                dropped, self.path
            );
        }
        rows.sort_by_key(|r| (r.date, r.home_team, r.away_team));
        Ok(rows)
    }
}

fn optional_i64(df: &DataFrame, name: &str) -> Option<Series> {
    df.column(name)
        .ok()
        .and_then(|c| c.cast(&DataType::Int64).ok())
}

fn get_i64(col: &Option<Series>, idx: usize) -> Option<i64> {
    col.as_ref()
        .and_then(|s| s.i64().ok())
        .and_then(|c| c.get(idx))
}
