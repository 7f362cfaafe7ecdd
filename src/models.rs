use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized row of a league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    #[serde(rename = "gf")]
    pub goals_for: u32,
    #[serde(rename = "ga")]
    pub goals_against: u32,
    /// goals_for − goals_against, as supplied upstream
    #[serde(rename = "gd")]
    pub goal_difference: i32,
    pub points: u32,
}

/// Last successfully fetched table for a league.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub league_key: String,
    /// Ordered by position ascending
    pub rows: Vec<StandingsRow>,
    pub fetched_at: DateTime<Utc>,
}

/// Successful answer to a standings request, possibly served from cache.
/// The HTTP layer turns this into its wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsPayload {
    pub rows: Vec<StandingsRow>,
    pub cached: bool,
    pub cached_at: Option<DateTime<Utc>>,
    pub stale: Option<bool>,
    /// Warning carried alongside a stale serve
    pub error: Option<String>,
}

impl StandingsPayload {
    pub fn live(rows: Vec<StandingsRow>) -> Self {
        StandingsPayload {
            rows,
            cached: false,
            cached_at: None,
            stale: None,
            error: None,
        }
    }

    pub fn fresh(entry: CacheEntry) -> Self {
        StandingsPayload {
            rows: entry.rows,
            cached: true,
            cached_at: Some(entry.fetched_at),
            stale: None,
            error: None,
        }
    }

    pub fn stale(entry: CacheEntry, warning: String) -> Self {
        StandingsPayload {
            rows: entry.rows,
            cached: true,
            cached_at: Some(entry.fetched_at),
            stale: Some(true),
            error: Some(warning),
        }
    }
}
