//! One comby invocation over a snapshot, streamed as translated results.

use std::{path::Path, sync::Arc};

use comby_client::{Args, Input, ResultKind, StructuralMatcher};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug};

use crate::{
    errors::SearchResult,
    matcher::to_matcher,
    observer::{SearchObserver, SpanRecorder},
    sender::MatchSender,
    snapshot::Snapshot,
    translate::to_file_match,
    types::{PatternRequest, SearchScope, SearchStats},
};

/// Template side of a structural run, borrowed from the request.
#[derive(Debug, Clone, Copy)]
pub struct StructuralQuery<'a> {
    pub pattern: &'a str,
    pub rule: Option<&'a str>,
    pub languages: &'a [String],
    pub repo: &'a str,
}

impl<'a> StructuralQuery<'a> {
    pub fn from_request(req: &'a PatternRequest) -> Self {
        Self {
            pattern: &req.pattern,
            rule: req.rule(),
            languages: &req.languages,
            repo: &req.repo,
        }
    }
}

/// Runs comby with a fixed worker cap and streams translated matches.
pub struct StructuralExecutor {
    matcher: Arc<dyn StructuralMatcher>,
    observer: Arc<dyn SearchObserver>,
    num_workers: usize,
}

impl StructuralExecutor {
    pub fn new(
        matcher: Arc<dyn StructuralMatcher>,
        observer: Arc<dyn SearchObserver>,
        num_workers: usize,
    ) -> Self {
        Self {
            matcher,
            observer,
            num_workers,
        }
    }

    /// Searches `snapshot` restricted to `scope`.
    ///
    /// Results reach `sender` in comby's order. A cancelled token stops the run
    /// with `Ok` and `cancelled` set; results already sent stay sent. Any error
    /// aborts the run and marks the span failed.
    pub async fn search(
        &self,
        snapshot: &Path,
        scope: SearchScope,
        extension_hint: Option<&str>,
        query: &StructuralQuery<'_>,
        sender: &dyn MatchSender,
        cancel: &CancellationToken,
    ) -> SearchResult<SearchStats> {
        let mut span = self.observer.structural_search_started(query.repo);
        let parent = span.span();
        let res = self
            .run(span.as_mut(), snapshot, scope, extension_hint, query, sender, cancel)
            .instrument(parent)
            .await;
        if let Err(e) = &res {
            span.record_error(&e.to_string());
        }
        res
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        span: &mut dyn SpanRecorder,
        snapshot: &Path,
        scope: SearchScope,
        extension_hint: Option<&str>,
        query: &StructuralQuery<'_>,
        sender: &dyn MatchSender,
        cancel: &CancellationToken,
    ) -> SearchResult<SearchStats> {
        let matcher = to_matcher(query.languages, extension_hint, self.observer.as_ref());

        let file_patterns = match scope {
            SearchScope::AllFiles => Vec::new(),
            SearchScope::FileSubset(paths) if paths.is_empty() => {
                span.record_paths(0);
                debug!("empty file subset, matcher not started");
                return Ok(SearchStats::default());
            }
            SearchScope::FileSubset(paths) => paths,
        };
        span.record_paths(file_patterns.len());

        let args = Args {
            input: Input::ZipPath(snapshot.to_path_buf()),
            matcher: matcher.key.as_str().to_string(),
            match_template: query.pattern.to_string(),
            result_kind: ResultKind::MatchOnly,
            file_patterns,
            rule: query.rule.map(str::to_string),
            num_workers: self.num_workers,
        };
        debug!(
            snapshot = %snapshot.display(),
            matcher = %matcher.key,
            inferred = matcher.inferred,
            paths = args.file_patterns.len(),
            workers = args.num_workers,
            "starting comby"
        );

        // Dropping the matcher future kills the child process.
        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("cancelled while comby was running");
                return Ok(SearchStats { cancelled: true, ..Default::default() });
            }
            res = self.matcher.matches(&args) => res?,
        };

        let mut archive = Snapshot::open(snapshot)?;
        let mut stats = SearchStats::default();
        for raw_match in &raw {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }
            let file_match = to_file_match(&mut archive, raw_match)?;
            stats.files += 1;
            stats.matches += file_match.match_count;
            sender.send(file_match);
        }

        debug!(
            files = stats.files,
            matches = stats.matches,
            cancelled = stats.cancelled,
            "structural search finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::SearchError,
        test_support::{
            Collector, FakeMatcher, RecordingObserver, ScriptedMatcher, snapshot_with,
        },
        types::Location,
    };
    use comby_client::{Match, Position};

    const A_GO: &str = "func f() {\n  x := 1\n}\n";

    fn executor(
        matcher: Arc<dyn StructuralMatcher>,
        observer: Arc<RecordingObserver>,
    ) -> StructuralExecutor {
        StructuralExecutor::new(matcher, observer, 4)
    }

    fn query<'a>(pattern: &'a str, languages: &'a [String]) -> StructuralQuery<'a> {
        StructuralQuery {
            pattern,
            rule: None,
            languages,
            repo: "github.com/acme/widgets",
        }
    }

    #[tokio::test]
    async fn go_assignment_scenario() {
        let zip = snapshot_with(&[("a.go", A_GO)]);
        let matcher = Arc::new(FakeMatcher::default());
        let observer = Arc::new(RecordingObserver::default());
        let exec = executor(matcher.clone(), observer.clone());
        let out = Collector::default();
        let langs = vec!["go".to_string()];

        let stats = exec
            .search(
                zip.path(),
                SearchScope::AllFiles,
                None,
                &query("x := :[v]", &langs),
                &out,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(stats.files, 1);
        assert_eq!(stats.matches, 1);
        assert!(!stats.cancelled);

        let results = out.take();
        assert_eq!(results.len(), 1);
        let fm = &results[0];
        assert_eq!(fm.path, "a.go");
        assert_eq!(fm.match_count, 1);
        assert!(!fm.limit_hit);
        let m = &fm.multiline_matches[0];
        assert_eq!(m.start, Location { offset: 13, line: 1, column: 2 });
        assert_eq!(m.end, Location { offset: 19, line: 1, column: 8 });
        assert_eq!(m.preview, "  x := 1");

        let args = matcher.calls();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].matcher, ".go");
        assert_eq!(args[0].num_workers, 4);
        assert!(args[0].file_patterns.is_empty());
        assert_eq!(observer.labels(), vec![".go".to_string()]);
    }

    #[tokio::test]
    async fn worker_cap_reaches_comby() {
        let zip = snapshot_with(&[("a.go", A_GO)]);
        let matcher = Arc::new(FakeMatcher::default());
        let exec = StructuralExecutor::new(
            matcher.clone(),
            Arc::new(RecordingObserver::default()),
            2,
        );

        exec.search(
            zip.path(),
            SearchScope::AllFiles,
            Some(".go"),
            &query("x := :[v]", &[]),
            &Collector::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let args = matcher.calls();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].num_workers, 2);
        assert_eq!(args[0].matcher, ".go");
    }

    #[tokio::test]
    async fn subset_is_forwarded_as_file_patterns() {
        let zip = snapshot_with(&[("a.go", A_GO), ("b.go", A_GO)]);
        let matcher = Arc::new(FakeMatcher::default());
        let exec = executor(matcher.clone(), Arc::new(RecordingObserver::default()));
        let out = Collector::default();

        exec.search(
            zip.path(),
            SearchScope::subset(["b.go"]),
            Some(".go"),
            &query("x := :[v]", &[]),
            &out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(matcher.calls()[0].file_patterns, vec!["b.go".to_string()]);
        let paths: Vec<_> = out.take().into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["b.go"]);
    }

    #[tokio::test]
    async fn empty_subset_never_starts_the_matcher() {
        let zip = snapshot_with(&[("a.go", A_GO)]);
        let matcher = Arc::new(FakeMatcher::default());
        let observer = Arc::new(RecordingObserver::default());
        let exec = executor(matcher.clone(), observer.clone());
        let out = Collector::default();

        let stats = exec
            .search(
                zip.path(),
                SearchScope::FileSubset(Vec::new()),
                None,
                &query("x := :[v]", &[]),
                &out,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(stats, SearchStats::default());
        assert!(out.take().is_empty());
        assert!(matcher.calls().is_empty());
        assert_eq!(observer.labels(), vec!["inferred:.generic".to_string()]);
        assert_eq!(observer.paths_recorded(), vec![0]);
    }

    #[tokio::test]
    async fn cancel_after_first_result_stops_streaming() {
        let zip = snapshot_with(&[("a.go", A_GO), ("b.go", A_GO), ("c.go", A_GO)]);
        let matcher = Arc::new(FakeMatcher::default());
        let exec = executor(matcher.clone(), Arc::new(RecordingObserver::default()));
        let cancel = CancellationToken::new();
        let out = Collector::cancelling_after(1, cancel.clone());

        let stats = exec
            .search(
                zip.path(),
                SearchScope::AllFiles,
                None,
                &query("x := :[v]", &[]),
                &out,
                &cancel,
            )
            .await
            .unwrap();

        assert!(stats.cancelled);
        assert_eq!(stats.files, 1);
        assert_eq!(out.take().len(), 1);
        assert_eq!(matcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_start_returns_nothing() {
        let zip = snapshot_with(&[("a.go", A_GO)]);
        let matcher = Arc::new(FakeMatcher::default());
        let exec = executor(matcher, Arc::new(RecordingObserver::default()));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = Collector::default();

        let stats = exec
            .search(
                zip.path(),
                SearchScope::AllFiles,
                None,
                &query("x := :[v]", &[]),
                &out,
                &cancel,
            )
            .await
            .unwrap();

        assert!(stats.cancelled);
        assert!(out.take().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_span_fails_and_marks_span() {
        let zip = snapshot_with(&[("a.go", "short")]);
        let scripted = ScriptedMatcher::new(vec![comby_client::FileMatch {
            uri: "a.go".into(),
            matches: vec![Match::new(
                Position::new(0, 1, 1),
                Position::new(50, 1, 51),
                "",
            )],
        }]);
        let observer = Arc::new(RecordingObserver::default());
        let exec = executor(Arc::new(scripted), observer.clone());
        let out = Collector::default();

        let err = exec
            .search(
                zip.path(),
                SearchScope::AllFiles,
                None,
                &query("s:[x]", &[]),
                &out,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::RangeOutOfBounds { len: 5, .. }));
        assert!(out.take().is_empty());
        let errors = observer.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("match range exceeds file size"));
        assert_eq!(observer.opened_spans(), 1);
        assert_eq!(observer.closed_spans(), 1);
    }

    #[tokio::test]
    async fn earlier_results_stay_sent_when_a_later_file_fails() {
        let zip = snapshot_with(&[("a.go", A_GO)]);
        let good = comby_client::FileMatch {
            uri: "a.go".into(),
            matches: vec![Match::new(Position::new(13, 2, 3), Position::new(19, 2, 9), "")],
        };
        let missing = comby_client::FileMatch {
            uri: "gone.go".into(),
            matches: Vec::new(),
        };
        let exec = executor(
            Arc::new(ScriptedMatcher::new(vec![good, missing])),
            Arc::new(RecordingObserver::default()),
        );
        let out = Collector::default();

        let err = exec
            .search(
                zip.path(),
                SearchScope::AllFiles,
                None,
                &query("x := :[v]", &[]),
                &out,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::ArchiveRead(_)));
        assert_eq!(out.take().len(), 1);
    }

    /// Records, for every event, whether a `structural_search` span encloses it.
    struct EnclosingRun(Arc<std::sync::Mutex<Vec<bool>>>);

    impl<S> tracing_subscriber::Layer<S> for EnclosingRun
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let inside = ctx
                .event_scope(event)
                .is_some_and(|mut scope| scope.any(|s| s.name() == "structural_search"));
            self.0.lock().unwrap().push(inside);
        }
    }

    #[tokio::test]
    async fn run_events_nest_under_the_observer_span() {
        use tracing_subscriber::layer::SubscriberExt;

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(EnclosingRun(seen.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let metrics: &'static crate::observer::StructuralSearchMetrics =
            Box::leak(Box::new(crate::observer::StructuralSearchMetrics::new()));
        let exec = StructuralExecutor::new(
            Arc::new(FakeMatcher::default()),
            Arc::new(crate::observer::TracingObserver::with_metrics(metrics)),
            4,
        );
        let zip = snapshot_with(&[("a.go", A_GO)]);

        exec.search(
            zip.path(),
            SearchScope::AllFiles,
            None,
            &query("x := :[v]", &[]),
            &Collector::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|inside| *inside));
        assert_eq!(metrics.get("inferred:.generic"), 1);
    }
}
