//! Growing odds table with incremental, de-duplicating append

use crate::config::ReconcileConfig;
use crate::error::CourtsideError;
use crate::outputs::write_csv_atomic;
use crate::records::OddsRecord;
use crate::teams::TeamNormalizer;
use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct OddsStore {
    path: PathBuf,
    normalizer: TeamNormalizer,
    limits: ReconcileConfig,
}

impl OddsStore {
    pub fn new<P: Into<PathBuf>>(path: P, normalizer: TeamNormalizer, limits: ReconcileConfig) -> Self {
        Self {
            path: path.into(),
            normalizer,
            limits,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full table. Absence is fatal to the calling stage.
    pub fn load(&self) -> Result<Vec<OddsRecord>> {
        if !self.path.exists() {
            return Err(CourtsideError::MissingTable(self.path.clone()).into());
        }
        self.read_rows()
    }

    /// Load the table if present, otherwise start empty. Used by append,
    /// where an empty store is a normal first run.
    pub fn load_or_empty(&self) -> Result<Vec<OddsRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        self.read_rows()
    }

    /// Merge new quotes into the table, keeping the most recently
    /// appended quote when a `(date, home, away)` key collides, and
    /// replace the file atomically. Returns the row count after merge.
    pub fn append(&self, incoming: &[OddsRecord]) -> Result<usize> {
        let existing = self.load_or_empty()?;

        let mut merged: HashMap<(NaiveDate, _, _), OddsRecord> = HashMap::new();
        for r in &existing {
            merged.insert(r.key(), r.clone());
        }
        let mut replaced = 0usize;
        for r in incoming {
            if !self.is_valid(r) {
                warn!(
                    "Dropping invalid quote {} {} vs {} ({:.2}/{:.2})",
                    r.date, r.home_team, r.away_team, r.home_odds, r.away_odds
                );
                continue;
            }
            if merged.insert(r.key(), r.clone()).is_some() {
                replaced += 1;
            }
        }

        let mut rows: Vec<OddsRecord> = merged.into_values().collect();
        rows.sort_by_key(|r| r.key());

        let mut df = odds_frame(&rows)?;
        write_csv_atomic(&self.path, &mut df)?;

        info!(
            "Odds store now {} rows ({} incoming, {} replaced)",
            rows.len(),
            incoming.len(),
            replaced
        );
        Ok(rows.len())
    }

    fn is_valid(&self, r: &OddsRecord) -> bool {
        r.home_team.is_known()
            && r.away_team.is_known()
            && r.home_team != r.away_team
            && r.home_odds >= self.limits.min_odds
            && r.home_odds <= self.limits.max_odds
            && r.away_odds >= self.limits.min_odds
            && r.away_odds <= self.limits.max_odds
    }

    fn read_rows(&self) -> Result<Vec<OddsRecord>> {
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
        let home_odds = df
            .column("home_odds")
            .and_then(|c| c.cast(&DataType::Float64))
            .map_err(|e| malformed(e.to_string()))?;
        let home_odds = home_odds.f64().map_err(|e| malformed(e.to_string()))?;
        let away_odds = df
            .column("away_odds")
            .and_then(|c| c.cast(&DataType::Float64))
            .map_err(|e| malformed(e.to_string()))?;
        let away_odds = away_odds.f64().map_err(|e| malformed(e.to_string()))?;

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
            let record = OddsRecord {
                date,
                home_team: self.normalizer.normalize(home_col.get(i).unwrap_or("")),
                away_team: self.normalizer.normalize(away_col.get(i).unwrap_or("")),
                home_odds: home_odds.get(i).unwrap_or(0.0),
                away_odds: away_odds.get(i).unwrap_or(0.0),
            };
            if self.is_valid(&record) {
                rows.push(record);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("Dropped {} invalid odds rows from {:?}", dropped, self.path);
        }
        rows.sort_by_key(|r| r.key());
        Ok(rows)
    }
}

/// Build the store frame from typed rows.
pub fn odds_frame(rows: &[OddsRecord]) -> Result<DataFrame> {
    let date_col: Vec<String> = rows.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect();
    let home_col: Vec<&str> = rows.iter().map(|r| r.home_team.as_str()).collect();
    let away_col: Vec<&str> = rows.iter().map(|r| r.away_team.as_str()).collect();
    let home_odds_col: Vec<f64> = rows.iter().map(|r| r.home_odds).collect();
    let away_odds_col: Vec<f64> = rows.iter().map(|r| r.away_odds).collect();

    let df = DataFrame::new(vec![
        Series::new("date", date_col),
        Series::new("home_team", home_col),
        Series::new("away_team", away_col),
        Series::new("home_odds", home_odds_col),
        Series::new("away_odds", away_odds_col),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teams::TeamCode;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn quote(d: &str, home: TeamCode, away: TeamCode, h: f64, a: f64) -> OddsRecord {
        OddsRecord {
            date: date(d),
            home_team: home,
            away_team: away,
            home_odds: h,
            away_odds: a,
        }
    }

    fn store(dir: &TempDir) -> OddsStore {
        OddsStore::new(
            dir.path().join("odds.csv"),
            TeamNormalizer::new(),
            ReconcileConfig::default(),
        )
    }

    #[test]
    fn test_missing_table_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).load().unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_append_round_trip() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let rows = vec![
            quote("2024-01-01", TeamCode::Bos, TeamCode::Lal, 1.80, 2.10),
            quote("2024-01-02", TeamCode::Mia, TeamCode::Nyk, 2.05, 1.85),
        ];
        assert_eq!(s.append(&rows).unwrap(), 2);
        let loaded = s.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].home_team, TeamCode::Bos);
        assert!((loaded[0].away_odds - 2.10).abs() < 1e-9);
    }

    #[test]
    fn test_append_dedup_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.append(&[quote("2024-01-01", TeamCode::Bos, TeamCode::Lal, 1.80, 2.10)])
            .unwrap();
        // Re-scrape of the same game with a moved line replaces the old quote.
        s.append(&[quote("2024-01-01", TeamCode::Bos, TeamCode::Lal, 1.75, 2.20)])
            .unwrap();
        let loaded = s.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!((loaded[0].home_odds - 1.75).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rows_dropped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let rows = vec![
            quote("2024-01-01", TeamCode::Bos, TeamCode::Lal, 1.80, 2.10),
            // Out-of-range quote and a self-game never make it in.
            quote("2024-01-01", TeamCode::Mia, TeamCode::Nyk, 55.0, 2.10),
            quote("2024-01-01", TeamCode::Den, TeamCode::Den, 1.80, 2.10),
        ];
        assert_eq!(s.append(&rows).unwrap(), 1);
    }

    #[test]
    fn test_variant_codes_normalized_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odds.csv");
        std::fs::write(
            &path,
            "date,home_team,away_team,home_odds,away_odds\n2024-01-01,PHX,BKN,1.9,1.9\n",
        )
        .unwrap();
        let s = OddsStore::new(path, TeamNormalizer::new(), ReconcileConfig::default());
        let loaded = s.load().unwrap();
        assert_eq!(loaded[0].home_team, TeamCode::Pho);
        assert_eq!(loaded[0].away_team, TeamCode::Brk);
    }
}
