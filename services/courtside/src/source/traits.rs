use crate::records::OddsRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Provider of one calendar day's moneyline quotes.
///
/// `date` is always the US game date; sources that index by another
/// timezone translate internally. An empty vec is a normal answer
/// (no games, or markets not open yet), not an error.
#[async_trait]
pub trait OddsSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<OddsRecord>>;
}
