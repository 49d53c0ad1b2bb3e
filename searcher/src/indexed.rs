//! Structural search over the indexed revision of a repository.
//!
//! The remote index returns candidate files with their content; those are written
//! to a throwaway zip and searched like any other snapshot.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use index_client::{IndexQuery, IndexedFile, RemoteIndex};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::{
    errors::SearchResult,
    matcher::extension_hint,
    sender::MatchSender,
    snapshot::write_zip,
    structural::{StructuralExecutor, StructuralQuery},
    types::{PatternRequest, SearchScope, SearchStats},
};

/// Branch searched when the request names none.
pub const DEFAULT_BRANCH: &str = "HEAD";

/// Index query for `req`. Pattern fields are forwarded unchanged.
pub fn index_query(req: &PatternRequest) -> IndexQuery {
    IndexQuery {
        pattern: req.pattern.clone(),
        is_negated: req.is_negated,
        is_regexp: req.is_regexp,
        is_structural_pat: req.is_structural_pat,
        comby_rule: req.comby_rule.clone(),
        is_word_match: req.is_word_match,
        is_case_sensitive: req.is_case_sensitive,
        file_match_limit: req.limit,
        include_patterns: req.include_patterns.clone(),
        exclude_pattern: req.exclude_pattern.clone(),
        path_patterns_are_case_sensitive: req.path_patterns_are_case_sensitive,
        pattern_matches_content: req.pattern_matches_content,
        pattern_matches_path: req.pattern_matches_path,
        languages: req.languages.clone(),
        branch: req
            .branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRANCH)
            .to_string(),
        repo_id: req.repo_id,
    }
}

/// Drops later files whose path was already seen. Replicas of the same shard
/// return the same files and a zip cannot hold two entries with one name.
fn unique_paths(files: Vec<IndexedFile>) -> Vec<IndexedFile> {
    let total = files.len();
    let mut seen = HashSet::new();
    let files: Vec<IndexedFile> = files
        .into_iter()
        .filter(|f| seen.insert(f.path.clone()))
        .collect();
    if files.len() < total {
        debug!(dropped = total - files.len(), "duplicate index paths dropped");
    }
    files
}

/// Fetches candidates from `index`, materializes them and runs comby over all
/// of them. The temporary zip is gone when this returns, on every path.
#[instrument(skip_all, fields(repo = %req.repo, repo_id = req.repo_id))]
pub async fn structural_search_with_index(
    executor: &StructuralExecutor,
    index: &dyn RemoteIndex,
    req: &PatternRequest,
    tmp_dir: Option<&Path>,
    sender: &dyn MatchSender,
    cancel: &CancellationToken,
) -> SearchResult<SearchStats> {
    let query = index_query(req);
    let files = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Ok(SearchStats { cancelled: true, ..Default::default() });
        }
        res = index.search(&req.indexer_endpoints, &query) => res?,
    };
    if files.is_empty() {
        debug!(branch = %query.branch, "index returned no candidates");
        return Ok(SearchStats::default());
    }
    let files = unique_paths(files);

    let hint = extension_hint(&files[0].path);
    let candidates = files.len();
    let dir: Option<PathBuf> = tmp_dir.map(Path::to_path_buf);
    let archive = tokio::task::spawn_blocking(move || -> SearchResult<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("structural-").suffix(".zip");
        let tmp = match &dir {
            Some(d) => builder.tempfile_in(d)?,
            None => builder.tempfile()?,
        };
        write_zip(
            tmp.as_file(),
            files
                .iter()
                .map(|f| (f.path.as_str(), f.content.as_bytes())),
        )?;
        Ok(tmp)
    })
    .await??;
    debug!(
        candidates,
        archive = %archive.path().display(),
        "materialized index candidates"
    );

    executor
        .search(
            archive.path(),
            SearchScope::AllFiles,
            hint.as_deref(),
            &StructuralQuery::from_request(req),
            sender,
            cancel,
        )
        .await
}
