//! Matcher key resolution.
//!
//! Comby picks its parser from a representative file extension, so a key is
//! always something like `.go` or the catch-all `.generic`.

use std::{fmt, path::Path};

use crate::observer::SearchObserver;

/// Catch-all key understood by comby.
pub const GENERIC_MATCHER: MatcherKey = MatcherKey(".generic");

/// Normalized matcher key passed to comby's `-matcher`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatcherKey(&'static str);

impl MatcherKey {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MatcherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Key plus how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherResolution {
    pub key: MatcherKey,
    /// `false` when the caller named a language, `true` when derived from an
    /// extension or defaulted.
    pub inferred: bool,
}

impl MatcherResolution {
    /// Counter label: the bare key, or `inferred:<key>`.
    pub fn metric_label(&self) -> String {
        if self.inferred {
            format!("inferred:{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Language name (lower case) to key. First hit wins.
static LANGUAGE_MATCHERS: &[(&[&str], &str)] = &[
    (&["assembly", "asm"], ".s"),
    (&["bash"], ".sh"),
    (&["c"], ".c"),
    (&["c#", "csharp"], ".cs"),
    (&["css"], ".css"),
    (&["dart"], ".dart"),
    (&["clojure"], ".clj"),
    (&["elm"], ".elm"),
    (&["erlang"], ".erl"),
    (&["elixir"], ".ex"),
    (&["fortran"], ".f"),
    (&["f#", "fsharp"], ".fsx"),
    (&["go"], ".go"),
    (&["html"], ".html"),
    (&["haskell"], ".hs"),
    (&["java"], ".java"),
    (&["javascript"], ".js"),
    (&["json"], ".json"),
    (&["julia"], ".jl"),
    (&["kotlin"], ".kt"),
    (&["latex"], ".tex"),
    (&["lisp"], ".lisp"),
    (&["nim"], ".nim"),
    (&["ocaml"], ".ml"),
    (&["pascal"], ".pas"),
    (&["php"], ".php"),
    (&["python"], ".py"),
    (&["reason"], ".re"),
    (&["ruby"], ".rb"),
    (&["rust"], ".rs"),
    (&["scala"], ".scala"),
    (&["sql"], ".sql"),
    (&["swift"], ".swift"),
    (&["text"], ".txt"),
    (&["typescript", "ts"], ".ts"),
    (&["xml"], ".xml"),
];

/// Extensions comby has a dedicated parser for.
static KNOWN_EXTENSIONS: &[&str] = &[
    ".s", ".sh", ".bib", ".c", ".cs", ".css", ".dart", ".clj", ".elm", ".erl", ".ex", ".f",
    ".fsx", ".go", ".html", ".hs", ".java", ".js", ".json", ".jl", ".kt", ".tex", ".lisp",
    ".nim", ".md", ".ml", ".org", ".pas", ".php", ".py", ".re", ".rb", ".rs", ".rst", ".scala",
    ".sql", ".swift", ".txt", ".ts",
];

/// Maps a language name to its key, `.generic` when unknown.
pub fn lookup_language(language: &str) -> MatcherKey {
    let lang = language.trim().to_lowercase();
    LANGUAGE_MATCHERS
        .iter()
        .find(|(names, _)| names.iter().any(|n| *n == lang))
        .map_or(GENERIC_MATCHER, |(_, key)| MatcherKey(*key))
}

/// Accepts an extension (with leading dot) only if comby knows it.
pub fn extension_to_matcher(extension: &str) -> MatcherKey {
    KNOWN_EXTENSIONS
        .iter()
        .copied()
        .find(|ext| *ext == extension)
        .map_or(GENERIC_MATCHER, MatcherKey)
}

/// Pure resolution. Only the first language hint is honored.
pub fn resolve_matcher(languages: &[String], extension_hint: Option<&str>) -> MatcherResolution {
    if let Some(lang) = languages.first() {
        return MatcherResolution {
            key: lookup_language(lang),
            inferred: false,
        };
    }
    let key = extension_hint
        .filter(|e| !e.is_empty())
        .map_or(GENERIC_MATCHER, extension_to_matcher);
    MatcherResolution {
        key,
        inferred: true,
    }
}

/// Resolves and counts the resolution once on `observer`.
pub fn to_matcher(
    languages: &[String],
    extension_hint: Option<&str>,
    observer: &dyn SearchObserver,
) -> MatcherResolution {
    let res = resolve_matcher(languages, extension_hint);
    observer.matcher_resolved(&res.metric_label());
    res
}

/// `".go"` for `"pkg/a.go"`; `None` when the file name has no extension.
pub fn extension_hint(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}
