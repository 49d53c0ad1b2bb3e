//! Raw match model as reported by comby in `-json-lines -match-only` mode.
//!
//! Lines and columns are 1-based, offsets are byte offsets into the file as comby
//! read it. Nothing here is validated; callers check spans against the real content.

use serde::{Deserialize, Serialize};

/// All matches comby found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    /// Path of the file relative to the input root (zip entry name for zip input).
    pub uri: String,
    #[serde(default)]
    pub matches: Vec<Match>,
}

/// One matched span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub range: Range,
    /// Comby's own rendering of the matched text. Not used for previews.
    #[serde(default)]
    pub matched: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Match {
    /// Convenience constructor used by fakes and tests.
    pub fn new(start: Position, end: Position, matched: impl Into<String>) -> Self {
        Self {
            range: Range { start, end },
            matched: matched.into(),
        }
    }
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}
