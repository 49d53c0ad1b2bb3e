use crate::types::FileMatch;

/// Sink for translated results. `send` must not block; results are pushed once
/// and never retracted.
pub trait MatchSender: Send + Sync {
    fn send(&self, file_match: FileMatch);
}

impl<F> MatchSender for F
where
    F: Fn(FileMatch) + Send + Sync,
{
    fn send(&self, file_match: FileMatch) {
        self(file_match)
    }
}
