use async_trait::async_trait;
use chrono::NaiveDate;

use super::FetchError;
use crate::db::models::Match;

/// Trait that every match-data source must implement.
#[async_trait]
pub trait MatchProvider: Send + Sync {
    /// Fetch all fixtures for the given calendar date.
    async fn fetch_matches(&self, date: NaiveDate) -> Result<Vec<Match>, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// False for the embedded demo fixtures.
    fn is_live(&self) -> bool {
        true
    }
}
