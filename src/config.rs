use anyhow::Context;
use clap::Parser;
use reqwest::header::HeaderValue;
use std::time::Duration;

use crate::standings::RetryPolicy;

/// Upper bound for `--cache-ttl-secs` (one day).
const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Football league standings API
#[derive(Parser, Debug, Clone)]
#[command(name = "league-standings", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// football-data.org API base URL
    #[arg(
        long,
        env = "FOOTBALL_DATA_API_URL",
        default_value = "https://api.football-data.org/v4"
    )]
    pub api_url: String,

    /// football-data.org API token (sent as X-Auth-Token)
    #[arg(long, env = "FOOTBALL_DATA_API_TOKEN")]
    pub api_token: Option<String>,

    /// Seconds a fetched table is served from cache before refreshing
    #[arg(long, env = "CACHE_TTL_SECS", default_value = "60")]
    pub cache_ttl_secs: u64,

    /// Retries after a transport failure, beyond the first attempt
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// Backoff before the first retry; doubles on each further retry
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value = "1000")]
    pub retry_base_delay_ms: u64,

    /// Upstream HTTP request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Suggested wait after a 429 that carries no reset hint
    #[arg(long, env = "RATE_LIMIT_RETRY_AFTER_SECS", default_value = "60")]
    pub rate_limit_retry_after_secs: u64,

    /// JSON file with league descriptors (built-in list when omitted)
    #[arg(long, env = "LEAGUES_FILE")]
    pub leagues_file: Option<String>,

    /// Fetch every league once at startup
    #[arg(long, env = "WARM_CACHE", default_value = "false")]
    pub warm_cache: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.api_token.as_deref() {
            Some(token) if !token.trim().is_empty() => {
                if HeaderValue::from_str(token).is_err() {
                    anyhow::bail!(
                        "FOOTBALL_DATA_API_TOKEN contains characters not allowed in an HTTP header"
                    );
                }
            }
            _ => anyhow::bail!("FOOTBALL_DATA_API_TOKEN is required"),
        }
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("invalid api_url '{}': {}", self.api_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_url must be http or https, got '{}'", url.scheme());
        }
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("cache_ttl_secs must be positive");
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            anyhow::bail!("cache_ttl_secs must be at most {}", MAX_CACHE_TTL_SECS);
        }
        if self.max_retries > 10 {
            anyhow::bail!("max_retries must be at most 10");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn cache_ttl(&self) -> anyhow::Result<chrono::Duration> {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .with_context(|| format!("cache_ttl_secs {} is out of range", self.cache_ttl_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["league-standings"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--api-token", "abc"]);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert!(!config.warm_cache);
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl().unwrap(), chrono::Duration::seconds(60));
    }

    #[test]
    fn test_requires_token() {
        assert!(parse(&["--api-token", "  "]).validate().is_err());
    }

    #[test]
    fn test_rejects_token_unusable_as_header() {
        assert!(parse(&["--api-token", "abc\n"]).validate().is_err());
        assert!(parse(&["--api-token", "abc\u{7f}"]).validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_cache_ttl() {
        for ttl in ["86401", "100000000000000000", "18446744073709551615"] {
            let config = parse(&["--api-token", "abc", "--cache-ttl-secs", ttl]);
            assert!(config.validate().is_err(), "ttl {} accepted", ttl);
        }
        let config = parse(&["--api-token", "abc", "--cache-ttl-secs", "86400"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl().unwrap(), chrono::Duration::seconds(86_400));
    }

    #[test]
    fn test_cache_ttl_never_wraps() {
        let mut config = parse(&["--api-token", "abc"]);
        config.cache_ttl_secs = u64::MAX;
        assert!(config.cache_ttl().is_err());
    }

    #[test]
    fn test_rejects_bad_url() {
        let config = parse(&["--api-token", "abc", "--api-url", "not a url"]);
        assert!(config.validate().is_err());
        let config = parse(&["--api-token", "abc", "--api-url", "ftp://example.com"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(parse(&["--api-token", "abc", "--cache-ttl-secs", "0"])
            .validate()
            .is_err());
        assert!(parse(&["--api-token", "abc", "--max-retries", "11"])
            .validate()
            .is_err());
        assert!(parse(&["--api-token", "abc", "--request-timeout-secs", "0"])
            .validate()
            .is_err());
    }
}
