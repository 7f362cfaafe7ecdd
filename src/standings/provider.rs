use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::StandingsRow;

/// Trait that every standings source must implement.
#[async_trait]
pub trait StandingsProvider: Send + Sync {
    /// Perform exactly one upstream attempt for the given competition code.
    async fn fetch(&self, competition_code: &str) -> Result<Vec<StandingsRow>, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
