//! Tracing and metrics as an injected observer.
//!
//! The executor reports to a [`SearchObserver`]; the default [`TracingObserver`]
//! turns that into a `tracing` span per structural run and increments the
//! process-wide [`StructuralSearchMetrics`] registry.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        OnceLock, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::{Span, error, field, info_span};

/// Name of the matcher-usage counter.
pub const STRUCTURAL_SEARCH_COUNTER: &str = "searcher_service_request_total_structural_search";

/// Hooks the executor calls. Implementations must be cheap and thread-safe.
pub trait SearchObserver: Send + Sync {
    /// Opens the span for one structural run. Dropping the recorder closes it.
    fn structural_search_started(&self, repo: &str) -> Box<dyn SpanRecorder>;

    /// Called once per structural run with the resolved matcher label.
    fn matcher_resolved(&self, label: &str);
}

/// An open span.
pub trait SpanRecorder: Send {
    fn record_paths(&mut self, paths: usize);
    fn record_error(&mut self, message: &str);

    /// `tracing` span the run executes in. Events logged during the run nest
    /// under it.
    fn span(&self) -> Span {
        Span::none()
    }
}

/// Counter registry keyed by matcher label.
///
/// Increments on known labels take a shared read lock and an atomic add; only the
/// first increment of a new label takes the write lock.
#[derive(Debug, Default)]
pub struct StructuralSearchMetrics {
    by_label: RwLock<HashMap<String, AtomicU64>>,
}

impl StructuralSearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, label: &str) {
        {
            let map = self.by_label.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = map.get(label) {
                c.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        let mut map = self.by_label.write().unwrap_or_else(PoisonError::into_inner);
        map.entry(label.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, label: &str) -> u64 {
        let map = self.by_label.read().unwrap_or_else(PoisonError::into_inner);
        map.get(label).map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Point-in-time copy of all counters, sorted by label.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        let map = self.by_label.read().unwrap_or_else(PoisonError::into_inner);
        map.iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Process-wide registry used by [`TracingObserver::global`].
pub fn global_metrics() -> &'static StructuralSearchMetrics {
    static METRICS: OnceLock<StructuralSearchMetrics> = OnceLock::new();
    METRICS.get_or_init(StructuralSearchMetrics::new)
}

/// Default observer: `tracing` spans plus a metrics registry.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    metrics: &'static StructuralSearchMetrics,
}

impl TracingObserver {
    pub fn global() -> Self {
        Self {
            metrics: global_metrics(),
        }
    }

    pub fn with_metrics(metrics: &'static StructuralSearchMetrics) -> Self {
        Self { metrics }
    }
}

impl SearchObserver for TracingObserver {
    fn structural_search_started(&self, repo: &str) -> Box<dyn SpanRecorder> {
        let span = info_span!(
            "structural_search",
            repo = %repo,
            paths = field::Empty,
            error = field::Empty,
        );
        Box::new(TracingSpan { span })
    }

    fn matcher_resolved(&self, label: &str) {
        self.metrics.inc(label);
    }
}

struct TracingSpan {
    span: Span,
}

impl SpanRecorder for TracingSpan {
    fn record_paths(&mut self, paths: usize) {
        self.span.record("paths", paths as u64);
    }

    fn record_error(&mut self, message: &str) {
        self.span.record("error", message);
        error!(parent: &self.span, error = %message, "structural search failed");
    }

    fn span(&self) -> Span {
        self.span.clone()
    }
}
