//! Regex prefilter: narrow a snapshot to candidate files, then run comby only
//! on those.

use std::path::Path;

use comby_client::structural_pat_to_regexp_query;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::{
    errors::SearchResult,
    matcher::extension_hint,
    regex_scan::{CompiledPattern, ScanOutcome, regex_search_batch},
    sender::MatchSender,
    snapshot::Snapshot,
    structural::{StructuralExecutor, StructuralQuery},
    types::{PatternRequest, SearchScope, SearchStats},
};

/// Candidate paths for `req` in archive order.
///
/// The derived regex over-approximates the structural pattern, so every file comby
/// could match is a candidate. The request's limit applies to the candidate list.
pub async fn prefilter_candidates(
    snapshot: &Path,
    req: &PatternRequest,
) -> SearchResult<ScanOutcome> {
    let regex_req = req.to_regex_request(structural_pat_to_regexp_query(&req.pattern));
    debug!(regex = %regex_req.pattern, "derived prefilter regex");
    let compiled = CompiledPattern::compile(&regex_req)?;

    let path = snapshot.to_path_buf();
    let limit = req.limit;
    let outcome = tokio::task::spawn_blocking(move || -> SearchResult<ScanOutcome> {
        let mut archive = Snapshot::open(&path)?;
        regex_search_batch(&mut archive, &compiled, limit)
    })
    .await??;

    if outcome.limit_hit {
        warn!(
            limit,
            candidates = outcome.paths.len(),
            "prefilter reached the file limit, later candidates are skipped"
        );
    }
    Ok(outcome)
}

/// Prefilter then structural search over the candidate subset. Nothing is sent
/// unless the prefilter succeeds; zero candidates means zero results.
#[instrument(skip_all, fields(repo = %req.repo, snapshot = %snapshot.display()))]
pub async fn filtered_structural_search(
    executor: &StructuralExecutor,
    snapshot: &Path,
    req: &PatternRequest,
    sender: &dyn MatchSender,
    cancel: &CancellationToken,
) -> SearchResult<SearchStats> {
    let outcome = prefilter_candidates(snapshot, req).await?;
    let hint = outcome.paths.first().and_then(|p| extension_hint(p));
    debug!(candidates = outcome.paths.len(), hint = ?hint, "prefilter finished");

    executor
        .search(
            snapshot,
            SearchScope::subset(outcome.paths),
            hint.as_deref(),
            &StructuralQuery::from_request(req),
            sender,
            cancel,
        )
        .await
}
