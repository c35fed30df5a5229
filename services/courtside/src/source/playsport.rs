//! Live odds source backed by the PlaySport results page

use crate::config::SourceConfig;
use crate::records::OddsRecord;
use crate::source::traits::OddsSource;
use crate::teams::{TeamCode, TeamNormalizer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use regex::Regex;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Fetches a day's games from the site's result table.
///
/// The HTTP client is injected at construction so callers control
/// timeouts, proxies and connection reuse; nothing in here reaches for
/// a process-global transport.
pub struct PlaysportSource {
    client: reqwest::Client,
    base_url: String,
    alliance_id: u32,
    normalizer: TeamNormalizer,
}

impl PlaysportSource {
    pub fn new(client: reqwest::Client, cfg: &SourceConfig, normalizer: TeamNormalizer) -> Self {
        Self {
            client,
            base_url: cfg.base_url.clone(),
            alliance_id: cfg.alliance_id,
            normalizer,
        }
    }

    fn day_url(&self, local_date: NaiveDate) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Bad base url {}", self.base_url))?;
        url.set_path("/gamesData/result");
        url.query_pairs_mut()
            .append_pair("allianceid", &self.alliance_id.to_string())
            .append_pair("gametime", &local_date.format("%Y%m%d").to_string());
        Ok(url)
    }
}

#[async_trait]
impl OddsSource for PlaysportSource {
    fn name(&self) -> &str {
        "playsport"
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<OddsRecord>> {
        // The site lists games under the local (UTC+8) calendar day,
        // one ahead of the US game date.
        let local_date = date + Duration::days(1);
        let url = self.day_url(local_date)?;
        debug!("Fetching {}", url);

        let body = self
            .client
            .get(url.clone())
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .with_context(|| format!("Request failed for {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad status from {}", url))?
            .text()
            .await
            .context("Failed to read response body")?;

        parse_result_table(&body, date, &self.normalizer)
    }
}

/// Extract game rows from the result-table markup.
///
/// Rows carry a `gameid` attribute and come in pairs: away row first,
/// home row second. Occasionally both team anchors sit in the first
/// row. The moneyline cell holds free text whose last number is the
/// decimal quote. Anything that does not resolve is skipped, never
/// fatal — an unparseable day just yields fewer records.
pub fn parse_result_table(
    html: &str,
    us_date: NaiveDate,
    normalizer: &TeamNormalizer,
) -> Result<Vec<OddsRecord>> {
    let row_re = Regex::new(r#"(?s)<tr[^>]*\bgameid="([^"]+)"[^>]*>(.*?)</tr>"#)?;
    let team_cell_re = Regex::new(r#"(?s)<td[^>]*td-teaminfo[^>]*>(.*?)</td>"#)?;
    let anchor_re = Regex::new(r#"(?s)<a[^>]*>(.*?)</a>"#)?;
    let odds_cell_re = Regex::new(r#"(?s)<td[^>]*td-bank-bet03[^>]*>(.*?)</td>"#)?;
    let number_re = Regex::new(r"[-+]?\d*\.\d+|\d+")?;

    // Group rows by game id, preserving row order within a game.
    let mut games: Vec<(String, Vec<String>)> = Vec::new();
    for caps in row_re.captures_iter(html) {
        let gid = caps[1].to_string();
        let row = caps[2].to_string();
        match games.iter_mut().find(|(id, _)| *id == gid) {
            Some((_, rows)) => rows.push(row),
            None => games.push((gid, vec![row])),
        }
    }

    let teams_in_row = |row: &str| -> Vec<TeamCode> {
        let Some(cell) = team_cell_re.captures(row) else {
            return Vec::new();
        };
        anchor_re
            .captures_iter(&cell[1])
            .map(|a| normalizer.normalize(strip_tags(&a[1]).trim()))
            .filter(|code| code.is_known())
            .collect()
    };

    let odds_in_row = |row: &str| -> Option<f64> {
        let cell = odds_cell_re.captures(row)?;
        let text = strip_tags(&cell[1]);
        number_re
            .find_iter(&text)
            .last()
            .and_then(|m| m.as_str().parse::<f64>().ok())
    };

    let mut records = Vec::new();
    for (gid, rows) in &games {
        if rows.len() < 2 {
            continue;
        }
        let (away_row, home_row) = (&rows[0], &rows[1]);

        let first_row_teams = teams_in_row(away_row);
        let (away, home) = if first_row_teams.len() >= 2 {
            (first_row_teams[0], first_row_teams[1])
        } else {
            let away = first_row_teams.first().copied();
            let home = teams_in_row(home_row).first().copied();
            match (away, home) {
                (Some(a), Some(h)) => (a, h),
                _ => {
                    debug!("Game {} missing a resolvable team; skipped", gid);
                    continue;
                }
            }
        };

        let (Some(away_odds), Some(home_odds)) = (odds_in_row(away_row), odds_in_row(home_row))
        else {
            debug!("Game {} missing a moneyline quote; skipped", gid);
            continue;
        };

        if away == home {
            warn!("Game {} resolved both rows to {}; skipped", gid, home);
            continue;
        }

        records.push(OddsRecord {
            date: us_date,
            home_team: home,
            away_team: away,
            home_odds,
            away_odds,
        });
    }

    Ok(records)
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
