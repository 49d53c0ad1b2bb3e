//! Crate-wide error hierarchy for index-client.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type IndexResult<T> = Result<T, IndexError>;

/// Root error type for remote index queries.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Unauthorized (HTTP 401).
    #[error("index unauthorized")]
    Unauthorized,

    /// Not found (HTTP 404), usually a wrong endpoint path.
    #[error("index endpoint not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("index rate limited")]
    RateLimited,

    /// Server error (HTTP 5xx).
    #[error("index server error: status {0}")]
    Server(u16),

    /// Other non-2xx status.
    #[error("index http status error: status {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("index request timed out")]
    Timeout,

    /// DNS/connect/reset failures without an HTTP status.
    #[error("index network error: {0}")]
    Network(String),

    /// Response body did not decode into the expected shape.
    #[error("invalid index response: {0}")]
    InvalidResponse(String),

    /// Missing endpoints or bad client settings.
    #[error("index config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for IndexError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return IndexError::Timeout;
        }

        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 | 403 => IndexError::Unauthorized,
                404 => IndexError::NotFound,
                429 => IndexError::RateLimited,
                500..=599 => IndexError::Server(code),
                _ => IndexError::HttpStatus(code),
            };
        }

        if e.is_decode() {
            return IndexError::InvalidResponse(e.to_string());
        }

        IndexError::Network(e.to_string())
    }
}
