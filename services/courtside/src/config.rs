use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub parlay: ParlayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_alliance_id")]
    pub alliance_id: u32,
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default = "default_min_odds")]
    pub min_odds: f64,
    #[serde(default = "default_max_odds")]
    pub max_odds: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorConfig {
    /// Single-bet profit above this is treated as a corrupt quote and
    /// clipped to zero.
    #[serde(default = "default_profit_clip_units")]
    pub profit_clip_units: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_prob_grid")]
    pub prob_grid: Vec<f64>,
    #[serde(default = "default_ev_grid")]
    pub ev_grid: Vec<f64>,
    /// Below this many graded training rows the optimizer returns the
    /// default thresholds instead of searching.
    #[serde(default = "default_min_train_rows")]
    pub min_train_rows: usize,
    /// A grid cell with fewer qualifying bets than this is ineligible.
    #[serde(default = "default_min_cell_rows")]
    pub min_cell_rows: usize,
    #[serde(default = "default_prob_threshold")]
    pub default_prob: f64,
    #[serde(default = "default_ev_threshold")]
    pub default_ev: f64,
    /// Calendar days skipped at the start of a walk-forward run.
    #[serde(default = "default_warmup_days")]
    pub warmup_days: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParlayConfig {
    #[serde(default = "default_top_per_strategy")]
    pub top_per_strategy: usize,
    #[serde(default = "default_max_output")]
    pub max_output: usize,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config from {:?}", path.as_ref()))?;
        let config: Config = toml::from_str(&content).context("Failed to parse config TOML")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            source: SourceConfig::default(),
            reconcile: ReconcileConfig::default(),
            evaluator: EvaluatorConfig::default(),
            optimizer: OptimizerConfig::default(),
            parlay: ParlayConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            alliance_id: default_alliance_id(),
            rate_limit_ms: default_rate_limit_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_odds: default_min_odds(),
            max_odds: default_max_odds(),
        }
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            profit_clip_units: default_profit_clip_units(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            prob_grid: default_prob_grid(),
            ev_grid: default_ev_grid(),
            min_train_rows: default_min_train_rows(),
            min_cell_rows: default_min_cell_rows(),
            default_prob: default_prob_threshold(),
            default_ev: default_ev_threshold(),
            warmup_days: default_warmup_days(),
        }
    }
}

impl Default for ParlayConfig {
    fn default() -> Self {
        Self {
            top_per_strategy: default_top_per_strategy(),
            max_output: default_max_output(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_base_url() -> String {
    "https://www.playsport.cc".to_string()
}

fn default_alliance_id() -> u32 {
    3
}

fn default_rate_limit_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_min_odds() -> f64 {
    1.01
}

fn default_max_odds() -> f64 {
    15.0
}

fn default_profit_clip_units() -> f64 {
    10.0
}

fn default_prob_grid() -> Vec<f64> {
    vec![0.55, 0.60, 0.65]
}

fn default_ev_grid() -> Vec<f64> {
    vec![0.0, 0.05, 0.10]
}

fn default_min_train_rows() -> usize {
    50
}

fn default_min_cell_rows() -> usize {
    10
}

fn default_prob_threshold() -> f64 {
    0.55
}

fn default_ev_threshold() -> f64 {
    0.0
}

fn default_warmup_days() -> usize {
    10
}

fn default_top_per_strategy() -> usize {
    2
}

fn default_max_output() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let toml_str = r#"
data_dir = "test_data"
[optimizer]
min_train_rows = 25
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, "test_data");
        assert_eq!(config.optimizer.min_train_rows, 25);
        assert_eq!(config.optimizer.prob_grid, vec![0.55, 0.60, 0.65]);
        assert_eq!(config.parlay.top_per_strategy, 2);
        assert_eq!(config.reconcile.max_odds, 15.0);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.evaluator.profit_clip_units, 10.0);
        assert_eq!(config.optimizer.warmup_days, 10);
    }
}
