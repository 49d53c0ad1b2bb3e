use std::path::PathBuf;

use searcher::PatternRequest;
use serde::Deserialize;

use crate::error_handler::{AppError, AppResult};

/// Body of `POST /structural_search`: the pattern request plus, for snapshot
/// searches, the zip to search.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralSearchRequest {
    #[serde(flatten)]
    pub request: PatternRequest,
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl StructuralSearchRequest {
    /// Rejects requests that cannot start, before any streaming.
    pub fn validate(&self) -> AppResult<()> {
        if !self.request.is_structural_pat {
            return Err(AppError::bad_request(
                "only structural patterns are served here",
                Some("isStructuralPat"),
            ));
        }
        if self.request.pattern.trim().is_empty() {
            return Err(AppError::bad_request("pattern is empty", Some("pattern")));
        }
        if !self.request.indexed && self.snapshot_path.is_none() {
            return Err(AppError::bad_request(
                "snapshotPath is required unless indexed is set",
                Some("snapshotPath"),
            ));
        }
        Ok(())
    }
}
