use std::sync::Arc;

use searcher::{SearcherConfig, StructuralSearchMetrics, StructuralSearcher, global_metrics};

use crate::error_handler::AppResult;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<StructuralSearcher>,
    /// Registry the searcher's observer reports into; served on `/metrics`.
    pub metrics: &'static StructuralSearchMetrics,
}

impl AppState {
    pub fn new(searcher: StructuralSearcher, metrics: &'static StructuralSearchMetrics) -> Self {
        Self {
            searcher: Arc::new(searcher),
            metrics,
        }
    }

    /// Load shared state from environment variables.
    pub fn from_env() -> AppResult<Self> {
        let cfg = SearcherConfig::from_env();
        let searcher = StructuralSearcher::from_config(cfg)?;
        Ok(Self::new(searcher, global_metrics()))
    }
}
