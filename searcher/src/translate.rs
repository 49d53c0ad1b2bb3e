//! Raw comby spans to validated, zero-based results with full-line previews.

use comby_client as comby;

use crate::{
    errors::{SearchError, SearchResult},
    snapshot::Snapshot,
    types::{FileMatch, Location, MultilineMatch},
};

/// Reads the file named by `raw` from `snapshot` and translates all its spans.
pub fn to_file_match(snapshot: &mut Snapshot, raw: &comby::FileMatch) -> SearchResult<FileMatch> {
    let content = snapshot.read_entry(&raw.uri)?;
    translate_spans(&raw.uri, &content, &raw.matches)
}

/// Translates spans against `content`. Any span outside `content` fails the
/// whole file; spans are never clamped.
pub fn translate_spans(
    path: &str,
    content: &[u8],
    spans: &[comby::Match],
) -> SearchResult<FileMatch> {
    let multiline_matches = spans
        .iter()
        .map(|m| translate_one(path, content, &m.range))
        .collect::<SearchResult<Vec<_>>>()?;

    Ok(FileMatch {
        path: path.to_string(),
        match_count: multiline_matches.len(),
        multiline_matches,
        limit_hit: false,
    })
}

fn translate_one(path: &str, content: &[u8], range: &comby::Range) -> SearchResult<MultilineMatch> {
    let (start, end) = (range.start.offset, range.end.offset);
    if start > end || end > content.len() {
        return Err(SearchError::RangeOutOfBounds {
            path: path.to_string(),
            start,
            end,
            len: content.len(),
        });
    }

    let first_line_start = content[..start]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let last_line_end = content[end..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(content.len(), |i| end + i);

    Ok(MultilineMatch {
        preview: String::from_utf8_lossy(&content[first_line_start..last_line_end]).into_owned(),
        start: zero_based(&range.start),
        end: zero_based(&range.end),
    })
}

fn zero_based(p: &comby::Position) -> Location {
    Location {
        offset: p.offset,
        line: p.line.saturating_sub(1),
        column: p.column.saturating_sub(1),
    }
}
