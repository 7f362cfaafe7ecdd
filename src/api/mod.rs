use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::StandingsError;
use crate::leagues::{classify, LeagueDescriptor, Zone};
use crate::models::{StandingsPayload, StandingsRow};
use crate::standings::StandingsService;

#[derive(Clone)]
pub struct AppState {
    pub standings: StandingsService,
}

/// Build the Axum router for the standings API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/leagues", get(leagues_handler))
        .route("/api/leagues/:key", get(league_handler))
        .route("/api/standings/:key", get(standings_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// A table row plus the zone its position falls in.
#[derive(Debug, Serialize)]
struct TableRow {
    #[serde(flatten)]
    row: StandingsRow,
    zone: Zone,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StandingsResponse {
    rows: Vec<TableRow>,
    cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StandingsResponse {
    fn new(payload: StandingsPayload, league: &LeagueDescriptor) -> Self {
        let rows = payload
            .rows
            .into_iter()
            .map(|row| TableRow {
                zone: classify(row.position, &league.zones),
                row,
            })
            .collect();
        StandingsResponse {
            rows,
            cached: payload.cached,
            cached_at: payload.cached_at,
            stale: payload.stale,
            error: payload.error,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_limited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ErrorBody {
    fn plain(error: String) -> Self {
        ErrorBody {
            error,
            rate_limited: None,
            retry_after: None,
        }
    }
}

impl IntoResponse for StandingsError {
    fn into_response(self) -> Response {
        match self {
            StandingsError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody::plain(self.to_string()))).into_response()
            }
            StandingsError::RateLimited {
                message,
                retry_after,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after.to_string())],
                Json(ErrorBody {
                    error: message,
                    rate_limited: Some(true),
                    retry_after: Some(retry_after),
                }),
            )
                .into_response(),
            StandingsError::Upstream(message) => {
                (StatusCode::BAD_GATEWAY, Json(ErrorBody::plain(message))).into_response()
            }
        }
    }
}

/// GET /health
async fn health_handler() -> &'static str {
    "ok"
}

/// GET /api/leagues
async fn leagues_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.standings.leagues().all().to_vec())
}

/// GET /api/leagues/:key
async fn league_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<LeagueDescriptor>, StandingsError> {
    state
        .standings
        .leagues()
        .find(&key)
        .cloned()
        .map(Json)
        .ok_or(StandingsError::NotFound(key))
}

/// GET /api/standings/:key
async fn standings_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<StandingsResponse>, StandingsError> {
    let league = state
        .standings
        .leagues()
        .find(&key)
        .ok_or_else(|| StandingsError::NotFound(key.clone()))?;
    let payload = state.standings.standings_for(league).await?;
    Ok(Json(StandingsResponse::new(payload, league)))
}
