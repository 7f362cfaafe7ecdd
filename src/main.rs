use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod api;
mod config;
mod error;
mod leagues;
mod models;
mod standings;

use api::AppState;
use config::Config;
use leagues::LeagueRegistry;
use standings::{FootballData, StandingsCache, StandingsProvider, StandingsService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let leagues = LeagueRegistry::load(config.leagues_file.as_deref())?;

    let provider: Arc<dyn StandingsProvider> = Arc::new(FootballData::new(
        &config.api_url,
        config.api_token.as_deref().unwrap_or_default(),
        config.request_timeout(),
        config.rate_limit_retry_after_secs,
    )?);
    info!(
        "Standings provider: {} (cache ttl {}s, max {} retries)",
        provider.name(),
        config.cache_ttl_secs,
        config.max_retries
    );

    let service = StandingsService::new(
        leagues,
        StandingsCache::new(config.cache_ttl()?),
        provider,
        config.retry_policy(),
    );

    if config.warm_cache {
        let warm = service.clone();
        tokio::spawn(async move {
            warm.warm().await;
        });
    }

    let app = api::router(AppState { standings: service });
    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Standings API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
