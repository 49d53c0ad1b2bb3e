//! Client side of the comby structural matcher.
//!
//! - [`Args`] describes one invocation and lowers it into CLI flags.
//! - [`StructuralMatcher`] is the seam the searcher depends on; [`CombyCli`] is the
//!   production implementation that spawns the `comby` binary.
//! - [`structural_pat_to_regexp_query`] derives a prefilter regex from a template.

mod args;
pub mod errors;
mod runner;
mod transform;
mod types;

use std::{future::Future, pin::Pin};

pub use args::{Args, Input, ResultKind};
pub use errors::{CombyError, CombyResult};
pub use runner::{CombyCli, decode_json_lines};
pub use transform::structural_pat_to_regexp_query;
pub use types::{FileMatch, Match, Position, Range};

/// Boxed future returned by the matcher trait.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Anything that can run a structural match over an input and report raw matches
/// in its own scheduling order.
pub trait StructuralMatcher: Send + Sync {
    fn matches<'a>(&'a self, args: &'a Args) -> BoxFuture<'a, CombyResult<Vec<FileMatch>>>;
}
