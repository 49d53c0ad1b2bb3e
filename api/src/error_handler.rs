use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use searcher::{ArchiveReadError, IndexError, SearchError};
use thiserror::Error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        field: Option<&'static str>,
    },

    /// Anything the searcher reports, at startup or per request.
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, field: Option<&'static str>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            field,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Bind { .. } | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Search(e) => match e {
                SearchError::InvalidRequest(_) | SearchError::Pattern(_) => StatusCode::BAD_REQUEST,
                SearchError::ArchiveRead(ArchiveReadError::Open { .. }) => StatusCode::NOT_FOUND,
                SearchError::ArchiveRead(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SearchError::MatcherInvocation(_) => StatusCode::BAD_GATEWAY,
                SearchError::RemoteIndex(IndexError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
                SearchError::RemoteIndex(_) => StatusCode::BAD_GATEWAY,
                SearchError::RangeOutOfBounds { .. }
                | SearchError::Config(_)
                | SearchError::Io(_)
                | SearchError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest { .. } => "BAD_REQUEST",
            AppError::Search(e) => match e {
                SearchError::InvalidRequest(_) => "INVALID_REQUEST",
                SearchError::Pattern(_) => "INVALID_PATTERN",
                SearchError::ArchiveRead(ArchiveReadError::Open { .. }) => "SNAPSHOT_NOT_FOUND",
                SearchError::ArchiveRead(_) => "SNAPSHOT_UNREADABLE",
                SearchError::RangeOutOfBounds { .. } => "MATCH_RANGE_OUT_OF_BOUNDS",
                SearchError::MatcherInvocation(_) => "MATCHER_FAILED",
                SearchError::RemoteIndex(_) => "INDEX_UNAVAILABLE",
                SearchError::Config(_) => "CONFIG_ERROR",
                SearchError::Io(_) => "IO_ERROR",
                SearchError::Join(_) => "JOIN_ERROR",
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let field = match &self {
            AppError::BadRequest { field, .. } => *field,
            _ => None,
        };
        ApiResponse::<()>::failure(self.status_code(), self.error_code(), self.to_string(), field)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::bad_request(err.body_text(), None)
    }
}
