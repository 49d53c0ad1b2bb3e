//! Structural search execution.
//!
//! A request is served from one of two sources:
//!
//! - a zip snapshot supplied by the caller, optionally narrowed by a regex
//!   prefilter ([`prefilter`]) before comby runs over the candidates;
//! - the indexed revision of a repository ([`indexed`]), whose candidates are
//!   materialized into a temporary snapshot first.
//!
//! Either way a single comby invocation ([`structural`]) produces raw spans that
//! are validated and translated ([`translate`]) and pushed to a [`MatchSender`]
//! one file at a time.

pub mod config;
pub mod errors;
pub mod indexed;
pub mod matcher;
pub mod observer;
pub mod prefilter;
pub mod regex_scan;
mod sender;
pub mod snapshot;
pub mod structural;
pub mod telemetry;
pub mod translate;
mod types;

#[cfg(test)]
mod test_support;

use std::{path::Path, sync::Arc};

use comby_client::{CombyCli, StructuralMatcher};
use index_client::{IndexClient, RemoteIndex};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

pub use comby_client::CombyError;
pub use config::SearcherConfig;
pub use errors::{ArchiveReadError, SearchError, SearchResult};
pub use index_client::IndexError;
pub use matcher::{GENERIC_MATCHER, MatcherKey, MatcherResolution, resolve_matcher};
pub use observer::{
    STRUCTURAL_SEARCH_COUNTER, SearchObserver, SpanRecorder, StructuralSearchMetrics,
    TracingObserver, global_metrics,
};
pub use sender::MatchSender;
pub use structural::{StructuralExecutor, StructuralQuery};
pub use types::{FileMatch, Location, MultilineMatch, PatternRequest, SearchScope, SearchStats};

/// Entry point for structural search requests.
pub struct StructuralSearcher {
    cfg: SearcherConfig,
    executor: StructuralExecutor,
    index: Option<Arc<dyn RemoteIndex>>,
}

impl StructuralSearcher {
    /// Searcher without a remote index; indexed requests are rejected until
    /// [`StructuralSearcher::with_index`] is called.
    pub fn new(
        cfg: SearcherConfig,
        matcher: Arc<dyn StructuralMatcher>,
        observer: Arc<dyn SearchObserver>,
    ) -> SearchResult<Self> {
        cfg.validate()?;
        let executor = StructuralExecutor::new(matcher, observer, cfg.num_workers);
        Ok(Self {
            cfg,
            executor,
            index: None,
        })
    }

    /// Production wiring: comby CLI, tracing observer on the global metrics and
    /// the HTTP index client.
    pub fn from_config(cfg: SearcherConfig) -> SearchResult<Self> {
        let index = IndexClient::from_config(cfg.index_client_config())?;
        let matcher = Arc::new(CombyCli::new(cfg.comby_path.clone()));
        info!(
            comby = %cfg.comby_path.display(),
            workers = cfg.num_workers,
            prefilter = cfg.prefilter,
            index_endpoints = cfg.index_endpoints.len(),
            "structural searcher configured"
        );
        Ok(Self::new(cfg, matcher, Arc::new(TracingObserver::global()))?
            .with_index(Arc::new(index)))
    }

    pub fn with_index(mut self, index: Arc<dyn RemoteIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Runs one structural request.
    ///
    /// `snapshot` is required unless `req.indexed` is set, in which case it is
    /// ignored. Results go to `sender` as they are produced.
    #[instrument(skip_all, fields(repo = %req.repo, indexed = req.indexed))]
    pub async fn search(
        &self,
        req: &PatternRequest,
        snapshot: Option<&Path>,
        sender: &dyn MatchSender,
        cancel: &CancellationToken,
    ) -> SearchResult<SearchStats> {
        if !req.is_structural_pat {
            return Err(SearchError::InvalidRequest(
                "pattern is not a structural pattern".into(),
            ));
        }
        if req.pattern.trim().is_empty() {
            return Err(SearchError::InvalidRequest("empty pattern".into()));
        }

        if req.indexed {
            let index = self.index.as_deref().ok_or_else(|| {
                SearchError::InvalidRequest("indexed search without an index client".into())
            })?;
            return indexed::structural_search_with_index(
                &self.executor,
                index,
                req,
                self.cfg.tmp_dir.as_deref(),
                sender,
                cancel,
            )
            .await;
        }

        let snapshot = snapshot
            .ok_or_else(|| SearchError::InvalidRequest("snapshot path is required".into()))?;
        if self.cfg.prefilter {
            prefilter::filtered_structural_search(&self.executor, snapshot, req, sender, cancel)
                .await
        } else {
            self.executor
                .search(
                    snapshot,
                    SearchScope::AllFiles,
                    None,
                    &StructuralQuery::from_request(req),
                    sender,
                    cancel,
                )
                .await
        }
    }
}
