//! Invocation arguments for one comby run and their lowering into CLI flags.

use std::path::PathBuf;

use crate::errors::{CombyError, CombyResult};

/// Where comby reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A zip archive; entries are addressed by their in-archive names.
    ZipPath(PathBuf),
}

/// What comby should report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Match ranges only, no rewrite output.
    MatchOnly,
}

/// One comby invocation.
#[derive(Debug, Clone)]
pub struct Args {
    pub input: Input,
    /// Matcher key, e.g. `.go` or `.generic`.
    pub matcher: String,
    pub match_template: String,
    pub result_kind: ResultKind,
    /// File paths or suffixes to restrict the run to. Empty means every file.
    pub file_patterns: Vec<String>,
    pub rule: Option<String>,
    /// Number of parallel comby workers.
    pub num_workers: usize,
}

impl Args {
    /// Lowers the arguments into the argv passed after the `comby` binary.
    pub fn to_cli_args(&self) -> CombyResult<Vec<String>> {
        if self.match_template.is_empty() {
            return Err(CombyError::InvalidArgs("empty match template"));
        }
        if self.num_workers == 0 {
            return Err(CombyError::InvalidArgs("num_workers must be > 0"));
        }

        // Match template, then an empty rewrite template.
        let mut out = vec![self.match_template.clone(), String::new()];
        out.extend(self.file_patterns.iter().cloned());

        if let Some(rule) = self.rule.as_deref().filter(|r| !r.trim().is_empty()) {
            out.push("-rule".into());
            out.push(rule.to_string());
        }

        match self.result_kind {
            ResultKind::MatchOnly => out.push("-match-only".into()),
        }
        out.push("-json-lines".into());

        out.push("-matcher".into());
        out.push(self.matcher.clone());

        match &self.input {
            Input::ZipPath(p) => {
                out.push("-zip".into());
                out.push(p.display().to_string());
            }
        }

        out.push("-jobs".into());
        out.push(self.num_workers.to_string());

        Ok(out)
    }
}
