//! Basketball odds/prediction reconciliation and EV strategy engine
//!
//! Batch pipeline over two growing CSV tables: scraped moneyline odds
//! and externally produced win-probability predictions. Stages:
//! reconcile quotes with predictions into per-team bet candidates,
//! backtest a fixed strategy catalog, pick daily thresholds by
//! walk-forward grid search, and rank two-leg parlays.

pub mod analytics;
pub mod config;
pub mod error;
pub mod outputs;
pub mod parlay;
pub mod reconcile;
pub mod records;
pub mod signal;
pub mod source;
pub mod store;
pub mod strategy;
pub mod teams;
