use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::provider::StandingsProvider;
use crate::error::FetchError;
use crate::models::StandingsRow;

/// football-data.org sends the seconds until the quota resets in this header.
const REQUEST_COUNTER_RESET: &str = "X-RequestCounter-Reset";

/// Standings provider backed by the football-data.org v4 API.
/// Docs: <https://www.football-data.org/documentation/api>
pub struct FootballData {
    http: Client,
    base_url: String,
    api_token: String,
    /// Used when a 429 carries no usable reset hint
    default_retry_after: u64,
}

impl FootballData {
    pub fn new(
        base_url: &str,
        api_token: &str,
        timeout: Duration,
        default_retry_after: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(FootballData {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
            default_retry_after,
        })
    }

    fn retry_after(&self, headers: &HeaderMap) -> u64 {
        [RETRY_AFTER.as_str(), REQUEST_COUNTER_RESET]
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(self.default_retry_after)
    }
}

#[async_trait]
impl StandingsProvider for FootballData {
    fn name(&self) -> &str {
        "football-data.org"
    }

    async fn fetch(&self, competition_code: &str) -> Result<Vec<StandingsRow>, FetchError> {
        let url = format!("{}/competitions/{}/standings", self.base_url, competition_code);
        debug!("Fetching standings from {}", url);

        let resp = self
            .http
            .get(&url)
            .header("X-Auth-Token", &self.api_token)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                retry_after: self.retry_after(resp.headers()),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;
        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))?;

        parse_standings_response(&raw)
    }
}

/// Only failures that happened on the wire are transient.
fn classify_send_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::InvalidRequest(err.to_string())
    } else {
        FetchError::Transient(err.to_string())
    }
}

/// football-data.org error bodies look like `{"message": "...", "errorCode": 403}`.
fn upstream_message(body: &str) -> Option<String> {
    let raw: serde_json::Value = serde_json::from_str(body).ok()?;
    raw["message"].as_str().map(str::to_string)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpstreamRow {
    position: u32,
    team: UpstreamTeam,
    played_games: u32,
    won: u32,
    draw: u32,
    lost: u32,
    goals_for: u32,
    goals_against: u32,
    goal_difference: i32,
    points: u32,
}

#[derive(Debug, Deserialize)]
struct UpstreamTeam {
    name: String,
}

impl From<UpstreamRow> for StandingsRow {
    fn from(row: UpstreamRow) -> Self {
        StandingsRow {
            position: row.position,
            team: row.team.name,
            played: row.played_games,
            won: row.won,
            drawn: row.draw,
            lost: row.lost,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference,
            points: row.points,
        }
    }
}

fn normalize_row(raw: &serde_json::Value) -> Result<StandingsRow, FetchError> {
    UpstreamRow::deserialize(raw)
        .map(StandingsRow::from)
        .map_err(|e| FetchError::Malformed(format!("bad table row: {}", e)))
}

/// Extract the overall table. A single bad row rejects the whole response.
fn parse_standings_response(raw: &serde_json::Value) -> Result<Vec<StandingsRow>, FetchError> {
    let groups = raw["standings"]
        .as_array()
        .ok_or_else(|| FetchError::Malformed("missing 'standings' array".into()))?;

    // Total table first; home/away splits are only a fallback
    let group = groups
        .iter()
        .find(|g| g["type"].as_str() == Some("TOTAL"))
        .or_else(|| groups.first())
        .ok_or_else(|| FetchError::Malformed("empty 'standings' array".into()))?;

    let table = group["table"]
        .as_array()
        .ok_or_else(|| FetchError::Malformed("missing 'table' array".into()))?;

    let mut rows = table
        .iter()
        .map(normalize_row)
        .collect::<Result<Vec<_>, _>>()?;
    rows.sort_by_key(|r| r.position);
    Ok(rows)
}
