//! Bounded retry with exponential backoff around a single provider.
//!
//! Only transport failures are retried. The delay before re-attempting after
//! failed attempt `n` (0-indexed) is `base_delay * 2^n`, so the default policy
//! (3 retries, 1s base) makes at most four attempts separated by 1s, 2s, 4s.
//!
//! Sleeping goes through the [`Sleeper`] trait so tests can record delays
//! instead of waiting on real timers.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

use super::provider::StandingsProvider;
use crate::error::FetchError;
use crate::models::StandingsRow;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries beyond the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay applied after failed attempt `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Suspends the calling task between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fetch with retries. Returns the last failure once the budget is spent.
pub async fn fetch_with_retry(
    provider: &dyn StandingsProvider,
    competition_code: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<Vec<StandingsRow>, FetchError> {
    let mut attempt = 0u32;
    loop {
        match provider.fetch(competition_code).await {
            Ok(rows) => {
                if attempt > 0 {
                    info!(
                        "[{}] {} recovered after {} retr{}",
                        provider.name(),
                        competition_code,
                        attempt,
                        if attempt == 1 { "y" } else { "ies" }
                    );
                }
                return Ok(rows);
            }
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "[{}] {} attempt {}/{} failed: {}; retrying in {:?}",
                    provider.name(),
                    competition_code,
                    attempt + 1,
                    policy.max_retries + 1,
                    err,
                    delay
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(
                    "[{}] {} giving up after {} attempt(s): {}",
                    provider.name(),
                    competition_code,
                    attempt + 1,
                    err
                );
                return Err(err);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    fn transient() -> FetchError {
        FetchError::Transient("connection reset".into())
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_success_needs_no_sleep() {
        let provider = ScriptedProvider::always(Ok(vec![row(1, "A")]));
        let sleeper = RecordingSleeper::default();
        let rows = fetch_with_retry(&provider, "PL", &RetryPolicy::default(), &sleeper)
            .await
            .unwrap();
        assert_eq!(rows, vec![row(1, "A")]);
        assert_eq!(provider.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_transient_exhausts_budget_with_exponential_delays() {
        let provider = ScriptedProvider::always(Err(transient()));
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy::default();

        let err = fetch_with_retry(&provider, "PL", &policy, &sleeper)
            .await
            .unwrap_err();

        assert_eq!(err, transient());
        assert_eq!(provider.calls(), DEFAULT_MAX_RETRIES as usize + 1);
        assert_eq!(
            sleeper.delays(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_is_never_retried() {
        let provider = ScriptedProvider::always(Err(FetchError::RateLimited { retry_after: 60 }));
        let sleeper = RecordingSleeper::default();

        let err = fetch_with_retry(&provider, "PL", &RetryPolicy::default(), &sleeper)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::RateLimited { retry_after: 60 });
        assert_eq!(provider.calls(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_non_transport_failures_are_not_retried() {
        for failure in [
            FetchError::Upstream {
                status: 500,
                message: "Internal Server Error".into(),
            },
            FetchError::Malformed("missing 'standings' array".into()),
            FetchError::InvalidRequest("builder error".into()),
        ] {
            let provider = ScriptedProvider::always(Err(failure.clone()));
            let sleeper = RecordingSleeper::default();
            let err = fetch_with_retry(&provider, "PL", &RetryPolicy::default(), &sleeper)
                .await
                .unwrap_err();
            assert_eq!(err, failure);
            assert_eq!(provider.calls(), 1);
        }
    }

    #[tokio::test]
    async fn test_recovers_mid_sequence() {
        let provider = ScriptedProvider::new(
            vec![Err(transient()), Err(transient())],
            Ok(vec![row(1, "A")]),
        );
        let sleeper = RecordingSleeper::default();

        let rows = fetch_with_retry(&provider, "PL", &RetryPolicy::default(), &sleeper)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(provider.calls(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let provider = ScriptedProvider::always(Err(transient()));
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(10),
        };
        assert!(fetch_with_retry(&provider, "PL", &policy, &sleeper).await.is_err());
        assert_eq!(provider.calls(), 1);
    }
}
