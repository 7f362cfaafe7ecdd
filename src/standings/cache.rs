//! In-memory standings cache, one entry per league key.
//!
//! Entries older than the TTL are reported as not fresh but are never evicted,
//! so a failed refresh can still serve the last known table.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{CacheEntry, StandingsRow};

pub const DEFAULT_TTL_SECS: i64 = 60;

/// Thread-safe standings cache. Cloning shares the same storage.
#[derive(Clone)]
pub struct StandingsCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

impl Default for StandingsCache {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl StandingsCache {
    pub fn new(ttl: Duration) -> Self {
        StandingsCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, league_key: &str) -> Option<CacheEntry> {
        self.inner.read().await.get(league_key).cloned()
    }

    /// Store a freshly fetched table, overwriting any previous entry.
    pub async fn put(&self, league_key: &str, rows: Vec<StandingsRow>) -> CacheEntry {
        let entry = CacheEntry {
            league_key: league_key.to_string(),
            rows,
            fetched_at: Utc::now(),
        };
        self.insert(entry.clone()).await;
        entry
    }

    pub async fn insert(&self, entry: CacheEntry) {
        debug!(
            "StandingsCache: storing {} rows for {}",
            entry.rows.len(),
            entry.league_key
        );
        self.inner
            .write()
            .await
            .insert(entry.league_key.clone(), entry);
    }

    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }

    /// Number of cached leagues.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
