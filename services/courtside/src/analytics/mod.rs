//! Historical analysis: strategy league backtest and walk-forward
//! threshold optimization.

pub mod backtest;
pub mod optimizer;

pub use backtest::{run_league, LeagueEntry};
pub use optimizer::{best_params, params_for_day, walk_forward, WalkForwardDay, WalkForwardReport};
