//! Fakes for the matcher, the index and the observer, plus snapshot builders.

use std::{
    io,
    sync::{Arc, Mutex},
};

use comby_client::{
    Args, BoxFuture, CombyError, CombyResult, FileMatch as RawFileMatch, Input, Match, Position,
    StructuralMatcher,
};
use index_client::{IndexError, IndexQuery, IndexResult, IndexedFile, RemoteIndex};
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

use crate::{
    observer::{SearchObserver, SpanRecorder},
    sender::MatchSender,
    snapshot::{Snapshot, write_zip},
    types::FileMatch,
};

/// Zip file on disk holding `files` in the given order.
pub fn snapshot_with(files: &[(&str, &str)]) -> NamedTempFile {
    let tmp = tempfile::Builder::new()
        .suffix(".zip")
        .tempfile()
        .expect("temp zip");
    write_zip(
        tmp.as_file(),
        files.iter().map(|(p, c)| (*p, c.as_bytes())),
    )
    .expect("write zip");
    tmp
}

// ---- matcher fakes ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Lit(u8),
    Space,
    Hole,
}

fn tokenize(template: &str) -> Vec<Token> {
    let bytes = template.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b":[") {
            let mut depth = 0usize;
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'[' => depth += 1,
                    b']' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                j += 1;
            }
            out.push(Token::Hole);
            i = j + 1;
        } else if bytes[i].is_ascii_whitespace() {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if out.last() != Some(&Token::Space) {
                out.push(Token::Space);
            }
        } else {
            out.push(Token::Lit(bytes[i]));
            i += 1;
        }
    }
    out
}

fn match_at(tokens: &[Token], content: &[u8], pos: usize) -> Option<usize> {
    let Some((tok, rest)) = tokens.split_first() else {
        return Some(pos);
    };
    match *tok {
        Token::Lit(b) => (content.get(pos) == Some(&b))
            .then(|| match_at(rest, content, pos + 1))
            .flatten(),
        Token::Space => {
            let run = content[pos..]
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            (1..=run)
                .rev()
                .find_map(|n| match_at(rest, content, pos + n))
        }
        Token::Hole => {
            let line = content[pos..].iter().take_while(|&&b| b != b'\n').count();
            if line == 0 {
                return None;
            }
            if rest.is_empty() {
                return Some(pos + line);
            }
            (1..=line).find_map(|n| match_at(rest, content, pos + n))
        }
    }
}

fn position(content: &[u8], offset: usize) -> Position {
    let before = &content[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() as u32 + 1;
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    Position::new(offset, line, (offset - line_start) as u32 + 1)
}

/// Non-overlapping matches of `template` in `content`.
pub fn naive_structural_matches(template: &str, content: &[u8]) -> Vec<Match> {
    let tokens = tokenize(template);
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < content.len() {
        match match_at(&tokens, content, pos) {
            Some(end) if end > pos => {
                out.push(Match::new(
                    position(content, pos),
                    position(content, end),
                    String::from_utf8_lossy(&content[pos..end]),
                ));
                pos = end;
            }
            _ => pos += 1,
        }
    }
    out
}

/// In-process stand-in for comby: literal bytes match exactly, a whitespace run
/// matches one or more whitespace bytes, a hole matches one or more bytes within
/// a line (a trailing hole runs to the end of the line).
#[derive(Default)]
pub struct FakeMatcher {
    calls: Mutex<Vec<Args>>,
}

impl FakeMatcher {
    pub fn calls(&self) -> Vec<Args> {
        self.calls.lock().unwrap().clone()
    }
}

impl StructuralMatcher for FakeMatcher {
    fn matches<'a>(&'a self, args: &'a Args) -> BoxFuture<'a, CombyResult<Vec<RawFileMatch>>> {
        Box::pin(async move {
            args.to_cli_args()?;
            self.calls.lock().unwrap().push(args.clone());
            let Input::ZipPath(path) = &args.input else {
                return Err(CombyError::InvalidArgs("fake matcher only reads zips"));
            };
            let mut snap = Snapshot::open(path).map_err(|e| io::Error::other(e.to_string()))?;
            let mut out = Vec::new();
            snap.for_each_file(|name, content| {
                let wanted = args.file_patterns.is_empty()
                    || args.file_patterns.iter().any(|p| name.ends_with(p.as_str()));
                if wanted {
                    let matches = naive_structural_matches(&args.match_template, content);
                    if !matches.is_empty() {
                        out.push(RawFileMatch {
                            uri: name.to_string(),
                            matches,
                        });
                    }
                }
                Ok(true)
            })
            .map_err(|e| io::Error::other(e.to_string()))?;
            Ok(out)
        })
    }
}

/// Returns the same canned matches on every call.
pub struct ScriptedMatcher {
    matches: Vec<RawFileMatch>,
}

impl ScriptedMatcher {
    pub fn new(matches: Vec<RawFileMatch>) -> Self {
        Self { matches }
    }
}

impl StructuralMatcher for ScriptedMatcher {
    fn matches<'a>(&'a self, _args: &'a Args) -> BoxFuture<'a, CombyResult<Vec<RawFileMatch>>> {
        let out = self.matches.clone();
        Box::pin(async move { Ok(out) })
    }
}

// ---- index fake ----

/// Serves a fixed candidate list, or fails once with a given error.
pub struct FakeIndex {
    files: Vec<IndexedFile>,
    error: Mutex<Option<IndexError>>,
    queries: Mutex<Vec<IndexQuery>>,
}

impl FakeIndex {
    pub fn returning(files: Vec<IndexedFile>) -> Self {
        Self {
            files,
            error: Mutex::new(None),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: IndexError) -> Self {
        Self {
            files: Vec::new(),
            error: Mutex::new(Some(err)),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<IndexQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl RemoteIndex for FakeIndex {
    fn search<'a>(
        &'a self,
        _endpoints: &'a [String],
        query: &'a IndexQuery,
    ) -> BoxFuture<'a, IndexResult<Vec<IndexedFile>>> {
        Box::pin(async move {
            self.queries.lock().unwrap().push(query.clone());
            if let Some(err) = self.error.lock().unwrap().take() {
                return Err(err);
            }
            Ok(self.files.clone())
        })
    }
}

// ---- observer fake ----

#[derive(Debug, Default)]
struct ObserverLog {
    labels: Vec<String>,
    paths: Vec<usize>,
    errors: Vec<String>,
    opened: usize,
    closed: usize,
}

/// Records every observer call.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    log: Arc<Mutex<ObserverLog>>,
}

impl RecordingObserver {
    pub fn labels(&self) -> Vec<String> {
        self.log.lock().unwrap().labels.clone()
    }

    pub fn paths_recorded(&self) -> Vec<usize> {
        self.log.lock().unwrap().paths.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.log.lock().unwrap().errors.clone()
    }

    pub fn opened_spans(&self) -> usize {
        self.log.lock().unwrap().opened
    }

    pub fn closed_spans(&self) -> usize {
        self.log.lock().unwrap().closed
    }
}

impl SearchObserver for RecordingObserver {
    fn structural_search_started(&self, _repo: &str) -> Box<dyn SpanRecorder> {
        self.log.lock().unwrap().opened += 1;
        Box::new(RecordingSpan {
            log: Arc::clone(&self.log),
        })
    }

    fn matcher_resolved(&self, label: &str) {
        self.log.lock().unwrap().labels.push(label.to_string());
    }
}

struct RecordingSpan {
    log: Arc<Mutex<ObserverLog>>,
}

impl SpanRecorder for RecordingSpan {
    fn record_paths(&mut self, paths: usize) {
        self.log.lock().unwrap().paths.push(paths);
    }

    fn record_error(&mut self, message: &str) {
        self.log.lock().unwrap().errors.push(message.to_string());
    }
}

impl Drop for RecordingSpan {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.closed += 1;
        }
    }
}

// ---- sender ----

/// Collects sent results; optionally cancels a token after `n` sends.
#[derive(Default)]
pub struct Collector {
    got: Mutex<Vec<FileMatch>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl Collector {
    pub fn cancelling_after(n: usize, token: CancellationToken) -> Self {
        Self {
            got: Mutex::new(Vec::new()),
            cancel_after: Some((n, token)),
        }
    }

    pub fn take(&self) -> Vec<FileMatch> {
        std::mem::take(&mut *self.got.lock().unwrap())
    }
}

impl MatchSender for Collector {
    fn send(&self, file_match: FileMatch) {
        let mut got = self.got.lock().unwrap();
        got.push(file_match);
        if let Some((n, token)) = &self.cancel_after {
            if got.len() >= *n {
                token.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naive_matcher_reports_one_based_positions() {
        let content = b"func f() {\n  x := 1\n}\n";
        let m = naive_structural_matches("x := :[v]", content);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].range.start, Position::new(13, 2, 3));
        assert_eq!(m[0].range.end, Position::new(19, 2, 9));
        assert_eq!(m[0].matched, "x := 1");
    }

    #[test]
    fn naive_matcher_is_non_overlapping_and_needs_whitespace() {
        assert_eq!(naive_structural_matches("a(:[x])", b"a(1) a(2)").len(), 2);
        assert!(naive_structural_matches("x := 1", b"x:=1").is_empty());
        assert!(naive_structural_matches("f(:[x])", b"f()").is_empty());
    }
}
