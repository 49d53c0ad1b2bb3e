//! Remote index client.
//!
//! The searcher asks the index which files of a repository branch satisfy a pattern
//! filter and gets their indexed content back, so it can build a small snapshot
//! instead of scanning the whole repository.

mod client;
pub mod errors;
mod types;

use std::{future::Future, pin::Pin};

pub use client::{IndexClient, IndexClientConfig};
pub use errors::{IndexError, IndexResult};
pub use types::{IndexQuery, IndexSearchResponse, IndexedFile};

/// Boxed future returned by [`RemoteIndex`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Query seam for the remote index. `endpoints` may be empty, in which case the
/// implementation falls back to its configured defaults.
pub trait RemoteIndex: Send + Sync {
    fn search<'a>(
        &'a self,
        endpoints: &'a [String],
        query: &'a IndexQuery,
    ) -> BoxFuture<'a, IndexResult<Vec<IndexedFile>>>;
}
