//! Batched regex scan over a snapshot.
//!
//! Used as the cheap first phase of a structural search: it only answers "which
//! files could match", it never produces match ranges.

use regex::{Regex, RegexBuilder, bytes};
use tracing::debug;

use crate::{errors::SearchResult, snapshot::Snapshot, types::PatternRequest};

/// A request compiled for file-level matching.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: bytes::Regex,
    include: Vec<Regex>,
    exclude: Option<Regex>,
    match_content: bool,
    match_path: bool,
    negated: bool,
}

impl CompiledPattern {
    pub fn compile(req: &PatternRequest) -> SearchResult<Self> {
        let mut expr = if req.is_regexp {
            req.pattern.clone()
        } else {
            regex::escape(&req.pattern)
        };
        if req.is_word_match {
            expr = format!(r"\b(?:{expr})\b");
        }
        let pattern = bytes::RegexBuilder::new(&expr)
            .case_insensitive(!req.is_case_sensitive)
            .multi_line(true)
            .build()?;

        let path_regex = |p: &str| {
            RegexBuilder::new(p)
                .case_insensitive(!req.path_patterns_are_case_sensitive)
                .build()
        };
        let include = req
            .include_patterns
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| path_regex(p.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude = req
            .exclude_pattern
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(path_regex)
            .transpose()?;

        Ok(Self {
            pattern,
            include,
            exclude,
            // A request that targets neither still searches content.
            match_content: req.pattern_matches_content || !req.pattern_matches_path,
            match_path: req.pattern_matches_path,
            negated: req.is_negated,
        })
    }

    /// Include/exclude filtering only.
    pub fn path_allowed(&self, path: &str) -> bool {
        self.include.iter().all(|r| r.is_match(path))
            && !self.exclude.as_ref().is_some_and(|r| r.is_match(path))
    }

    /// Whether the file counts as a hit for this request.
    pub fn matches_file(&self, path: &str, content: &[u8]) -> bool {
        if !self.path_allowed(path) {
            return false;
        }
        let hit = (self.match_path && self.pattern.is_match(path.as_bytes()))
            || (self.match_content && self.pattern.is_match(content));
        hit != self.negated
    }
}

/// Paths that matched, in archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub paths: Vec<String>,
    /// The scan stopped because `limit` files had matched and more remained.
    pub limit_hit: bool,
}

/// Scans every file of `snapshot`. A `limit` of zero means unlimited.
pub fn regex_search_batch(
    snapshot: &mut Snapshot,
    pattern: &CompiledPattern,
    limit: usize,
) -> SearchResult<ScanOutcome> {
    let mut out = ScanOutcome::default();
    snapshot.for_each_file(|path, content| {
        if !pattern.matches_file(path, content) {
            return Ok(true);
        }
        if limit > 0 && out.paths.len() == limit {
            out.limit_hit = true;
            return Ok(false);
        }
        out.paths.push(path.to_string());
        Ok(true)
    })?;
    debug!(
        snapshot = %snapshot.path().display(),
        matched = out.paths.len(),
        limit_hit = out.limit_hit,
        "regex scan finished"
    );
    Ok(out)
}
