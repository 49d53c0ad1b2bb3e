//! Structural template to plain regex.
//!
//! The produced regex is a necessary condition for a structural match: every file
//! comby can match with the template also matches the regex. Literal text is kept
//! (escaped), holes become lazy gaps and whitespace runs become `\s+`.

#[derive(Debug, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Hole,
}

const GAP: &str = "(?s:.)*?";

/// Converts a comby match template into a regex usable for prefiltering.
///
/// A template made only of holes yields an empty regex, which matches every file.
pub fn structural_pat_to_regexp_query(pattern: &str) -> String {
    let literals: Vec<String> = split_template(pattern)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Literal(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| literal_to_regex(text))
            }
            Piece::Hole => None,
        })
        .collect();

    literals.join(GAP)
}

fn literal_to_regex(text: &str) -> String {
    text.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Splits a template into literal runs and holes. Recognized holes: `:[name]`,
/// `:[[name]]`, `:[name.]`, `:[name:regex]` and `...`.
fn split_template(pattern: &str) -> Vec<Piece<'_>> {
    let bytes = pattern.as_bytes();
    let mut pieces = Vec::new();
    let mut lit_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let hole_end = if bytes[i..].starts_with(b":[") {
            hole_end(bytes, i + 2)
        } else if bytes[i..].starts_with(b"...") {
            Some(i + 3)
        } else {
            None
        };

        match hole_end {
            Some(end) => {
                if lit_start < i {
                    pieces.push(Piece::Literal(&pattern[lit_start..i]));
                }
                pieces.push(Piece::Hole);
                i = end;
                lit_start = end;
            }
            None => i += 1,
        }
    }
    if lit_start < bytes.len() {
        pieces.push(Piece::Literal(&pattern[lit_start..]));
    }
    pieces
}

/// Returns the index one past the closing `]` of a hole whose body starts at `from`,
/// balancing nested brackets. `None` for an unterminated hole.
fn hole_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (off, b) in bytes[from..].iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + off + 1);
                }
            }
            _ => {}
        }
    }
    None
}
