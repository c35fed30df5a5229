//! CSV-backed record stores
//!
//! One growing odds table and one growing predictions table, both plain
//! CSV under the data directory. Loading is strict about table presence
//! and shape, lenient about individual bad rows.

pub mod odds;
pub mod predictions;

pub use odds::OddsStore;
pub use predictions::PredictionStore;
