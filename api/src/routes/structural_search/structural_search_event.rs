use axum::body::Bytes;
use searcher::{FileMatch, SearchError, SearchStats};
use serde::Serialize;

use crate::error_handler::AppError;

/// One NDJSON line of the result stream. A stream is zero or more `match`
/// events followed by exactly one `done` or `error`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    Match(FileMatch),
    Done(SearchStats),
    Error { code: &'static str, message: String },
}

impl SearchEvent {
    pub fn from_error(err: SearchError) -> Self {
        let err = AppError::from(err);
        SearchEvent::Error {
            code: err.error_code(),
            message: err.to_string(),
        }
    }

    /// Serialized line including the trailing newline.
    pub fn to_ndjson(&self) -> Bytes {
        let mut line = serde_json::to_vec(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","code":"ENCODE_ERROR","message":"{e}"}}"#).into_bytes()
        });
        line.push(b'\n');
        Bytes::from(line)
    }
}
