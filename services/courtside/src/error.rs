//! Fatal error taxonomy
//!
//! Only conditions that stop a stage live here: a required input table
//! that is absent or unreadable. Everything else in the pipeline (missing
//! odds match, thin training sample, implausible quote) is recovered
//! in place and at most logged.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CourtsideError {
    #[error("required input table not found: {0}")]
    MissingTable(PathBuf),

    #[error("malformed input table {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}
