use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::StandingsCache;
use super::provider::StandingsProvider;
use super::retry::{fetch_with_retry, RetryPolicy, Sleeper, TokioSleeper};
use crate::error::StandingsError;
use crate::leagues::{LeagueDescriptor, LeagueRegistry};
use crate::models::StandingsPayload;

/// Cache-first standings lookup with retrying fetch and stale fallback.
///
/// All collaborators are injected so handlers and tests each get their own
/// instance. Concurrent misses for the same league may both fetch; the last
/// write to the cache wins.
#[derive(Clone)]
pub struct StandingsService {
    leagues: LeagueRegistry,
    cache: StandingsCache,
    provider: Arc<dyn StandingsProvider>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
}

impl StandingsService {
    pub fn new(
        leagues: LeagueRegistry,
        cache: StandingsCache,
        provider: Arc<dyn StandingsProvider>,
        retry: RetryPolicy,
    ) -> Self {
        StandingsService {
            leagues,
            cache,
            provider,
            sleeper: Arc::new(TokioSleeper),
            retry,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn leagues(&self) -> &LeagueRegistry {
        &self.leagues
    }

    /// Standings for a league slug or id.
    ///
    /// Fresh cache hits return without touching upstream. On a miss the
    /// provider is called with retries; if that fails, any cached entry is
    /// served with `stale = true` and the failure as a warning.
    pub async fn standings(&self, league_key: &str) -> Result<StandingsPayload, StandingsError> {
        let league = self
            .leagues
            .find(league_key)
            .ok_or_else(|| StandingsError::NotFound(league_key.to_string()))?;
        self.standings_for(league).await
    }

    /// Same as [`standings`](Self::standings) for an already resolved league.
    pub async fn standings_for(
        &self,
        league: &LeagueDescriptor,
    ) -> Result<StandingsPayload, StandingsError> {
        let cache_key = league.slug.as_str();

        if let Some(entry) = self.cache.get(cache_key).await {
            if self.cache.is_fresh(&entry, Utc::now()) {
                debug!("Cache hit for {}", cache_key);
                return Ok(StandingsPayload::fresh(entry));
            }
        }

        match fetch_with_retry(
            self.provider.as_ref(),
            &league.code,
            &self.retry,
            self.sleeper.as_ref(),
        )
        .await
        {
            Ok(rows) => {
                info!("Fetched {} rows for {} ({})", rows.len(), league.name, league.code);
                self.cache.put(cache_key, rows.clone()).await;
                Ok(StandingsPayload::live(rows))
            }
            Err(err) => match self.cache.get(cache_key).await {
                Some(entry) => {
                    warn!(
                        "Serving stale standings for {} (fetched {}): {}",
                        cache_key, entry.fetched_at, err
                    );
                    Ok(StandingsPayload::stale(entry, err.to_string()))
                }
                None => {
                    warn!("No standings available for {}: {}", cache_key, err);
                    Err(err.into())
                }
            },
        }
    }

    /// Load every league once, concurrently. Returns how many succeeded.
    pub async fn warm(&self) -> usize {
        let lookups = self.leagues.all().iter().map(|league| async move {
            let result = self.standings(&league.slug).await;
            if let Err(e) = &result {
                warn!("Warm-up failed for {}: {}", league.slug, e);
            }
            result.is_ok()
        });

        let loaded = futures_util::future::join_all(lookups)
            .await
            .into_iter()
            .filter(|ok| *ok)
            .count();
        info!(
            "Cache warm-up loaded {}/{} league(s), {} cached",
            loaded,
            self.leagues.all().len(),
            self.cache.len().await
        );
        loaded
    }
}
