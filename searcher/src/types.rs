//! Request, scope and result model.

use serde::{Deserialize, Serialize};

/// One search request as sent by the caller. Request-scoped; the searcher only
/// borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternRequest {
    pub pattern: String,
    pub is_negated: bool,
    #[serde(rename = "isRegExp")]
    pub is_regexp: bool,
    pub is_structural_pat: bool,
    /// Optional comby rule (`where ...`).
    pub comby_rule: Option<String>,
    pub is_word_match: bool,
    pub is_case_sensitive: bool,
    /// Maximum number of files. Zero means no limit.
    pub limit: usize,
    /// Every include pattern must match the path.
    pub include_patterns: Vec<String>,
    pub exclude_pattern: Option<String>,
    pub path_patterns_are_case_sensitive: bool,
    pub pattern_matches_content: bool,
    pub pattern_matches_path: bool,
    pub languages: Vec<String>,

    pub repo: String,
    #[serde(rename = "repoID")]
    pub repo_id: u32,
    pub branch: Option<String>,
    pub indexer_endpoints: Vec<String>,
    /// Search the repository's indexed revision instead of a supplied snapshot.
    pub indexed: bool,
}

impl Default for PatternRequest {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            is_negated: false,
            is_regexp: false,
            is_structural_pat: false,
            comby_rule: None,
            is_word_match: false,
            is_case_sensitive: false,
            limit: 0,
            include_patterns: Vec::new(),
            exclude_pattern: None,
            path_patterns_are_case_sensitive: false,
            pattern_matches_content: true,
            pattern_matches_path: false,
            languages: Vec::new(),
            repo: String::new(),
            repo_id: 0,
            branch: None,
            indexer_endpoints: Vec::new(),
            indexed: false,
        }
    }
}

impl PatternRequest {
    /// The comby rule, if one was given and is not blank.
    pub fn rule(&self) -> Option<&str> {
        self.comby_rule.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// Copy of this request turned into a plain regex search for `regex_pattern`.
    /// Limit and every other flag are kept.
    pub fn to_regex_request(&self, regex_pattern: String) -> Self {
        Self {
            pattern: regex_pattern,
            is_regexp: true,
            is_structural_pat: false,
            ..self.clone()
        }
    }
}

/// Which files of a snapshot a structural run may look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchScope {
    AllFiles,
    /// Snapshot-relative paths. Empty means "match nothing".
    FileSubset(Vec<String>),
}

impl SearchScope {
    /// Builds a subset, dropping empty paths and later duplicates.
    pub fn subset<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = std::collections::HashSet::new();
        let paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        SearchScope::FileSubset(paths)
    }
}

/// Zero-based position inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

/// One match, possibly spanning several lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultilineMatch {
    /// Every line the match touches, in full, without the trailing newline.
    pub preview: String,
    pub start: Location,
    pub end: Location,
}

/// All matches in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMatch {
    pub path: String,
    pub multiline_matches: Vec<MultilineMatch>,
    pub match_count: usize,
    pub limit_hit: bool,
}

/// Summary of a finished (or cooperatively stopped) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub files: usize,
    pub matches: usize,
    pub cancelled: bool,
}
