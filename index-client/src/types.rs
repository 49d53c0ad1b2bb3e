//! Wire model of the remote index search endpoint.

use serde::{Deserialize, Serialize};

/// Pattern filter plus a branch/repository selector.
///
/// All pattern fields are forwarded as the caller sent them; the index decides how
/// to approximate structural patterns on its side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuery {
    pub pattern: String,
    pub is_negated: bool,
    pub is_regexp: bool,
    pub is_structural_pat: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comby_rule: Option<String>,
    pub is_word_match: bool,
    pub is_case_sensitive: bool,
    /// Maximum number of files to return. Zero means no limit.
    pub file_match_limit: usize,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_pattern: Option<String>,
    pub path_patterns_are_case_sensitive: bool,
    pub pattern_matches_content: bool,
    pub pattern_matches_path: bool,
    #[serde(default)]
    pub languages: Vec<String>,
    pub branch: String,
    pub repo_id: u32,
}

/// One candidate file with its indexed content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFile {
    /// Repository-relative path.
    pub path: String,
    pub content: String,
}

/// Response envelope of `POST /api/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSearchResponse {
    #[serde(default)]
    pub files: Vec<IndexedFile>,
}
