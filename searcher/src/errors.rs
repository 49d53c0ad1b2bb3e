//! Unified error types for the searcher crate.
//!
//! Every variant is fatal for the request that raised it. Cooperative cancellation is
//! not an error; it shows up as `SearchStats::cancelled`.

use std::path::PathBuf;

use thiserror::Error;
use zip::result::ZipError;

/// Result alias for the whole crate.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Top-level error for structural search requests.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Snapshot could not be opened or an entry could not be read.
    #[error(transparent)]
    ArchiveRead(#[from] ArchiveReadError),

    /// The matcher reported a span outside the file as stored in the snapshot.
    #[error("match range exceeds file size: {path} [{start}, {end}) but file has {len} bytes")]
    RangeOutOfBounds {
        path: String,
        start: usize,
        end: usize,
        len: usize,
    },

    /// Spawning or talking to the external matcher failed.
    #[error("matcher invocation failed: {0}")]
    MatcherInvocation(#[from] comby_client::CombyError),

    /// Remote index query failed.
    #[error("remote index query failed: {0}")]
    RemoteIndex(#[from] index_client::IndexError),

    /// Prefilter or path filter regex did not compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Request cannot be served as asked (missing snapshot, not structural, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),

    /// Filesystem errors outside snapshot reads (temp files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled by the runtime.
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Snapshot (zip) access failures.
#[derive(Debug, Error)]
pub enum ArchiveReadError {
    #[error("cannot open snapshot {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("snapshot entry not found: {path}")]
    MissingEntry { path: String },

    #[error("cannot read snapshot entry {path}: {source}")]
    Entry {
        path: String,
        #[source]
        source: ZipError,
    },

    #[error("cannot read snapshot entry {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write snapshot: {0}")]
    Write(#[source] ZipError),
}
