use thiserror::Error;

/// Classified failure of a single upstream fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// HTTP 429 from upstream. Never retried.
    #[error("upstream rate limit reached, retry in {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// Any other non-success HTTP status.
    #[error("upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level failure (connect, timeout, reset). The only retried kind.
    #[error("upstream request failed: {0}")]
    Transient(String),

    /// The request could not be built (e.g. a token that is not a valid header value).
    /// Never retried.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(String),

    /// Upstream answered 2xx but the body was not a usable standings table.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transient(_))
    }
}

/// Failure surfaced to the caller of the standings service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StandingsError {
    #[error("unknown league '{0}'")]
    NotFound(String),

    #[error("{message}")]
    RateLimited { message: String, retry_after: u64 },

    #[error("{0}")]
    Upstream(String),
}

impl From<FetchError> for StandingsError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::RateLimited { retry_after } => StandingsError::RateLimited {
                message: err.to_string(),
                retry_after,
            },
            other => StandingsError::Upstream(other.to_string()),
        }
    }
}
