//! Runs the `comby` binary as a child process and decodes its JSON-lines output.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::{
    BoxFuture, StructuralMatcher,
    args::Args,
    errors::{CombyError, CombyResult},
    types::FileMatch,
};

/// Comby CLI driver. One child process per [`CombyCli::run`] call; comby itself
/// fans out to `Args::num_workers` workers.
#[derive(Debug, Clone)]
pub struct CombyCli {
    bin: PathBuf,
}

impl CombyCli {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Runs comby to completion and returns matches in comby's output order.
    ///
    /// The child is killed if the returned future is dropped before it finishes,
    /// so callers can cancel by racing this future against a cancellation signal.
    #[instrument(skip_all, fields(matcher = %args.matcher, files = args.file_patterns.len(), jobs = args.num_workers))]
    pub async fn run(&self, args: &Args) -> CombyResult<Vec<FileMatch>> {
        let argv = args.to_cli_args()?;
        debug!(bin = %self.bin.display(), "spawning comby");

        let output = Command::new(&self.bin)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(CombyError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, %stderr, "comby failed");
            return Err(CombyError::Exit {
                status: output.status.to_string(),
                stderr,
            });
        }

        let matches = decode_json_lines(&output.stdout)?;
        debug!(files = matches.len(), "comby finished");
        Ok(matches)
    }
}

impl StructuralMatcher for CombyCli {
    fn matches<'a>(&'a self, args: &'a Args) -> BoxFuture<'a, CombyResult<Vec<FileMatch>>> {
        Box::pin(self.run(args))
    }
}

/// Decodes comby's `-json-lines` stdout. Blank lines are skipped.
pub fn decode_json_lines(stdout: &[u8]) -> CombyResult<Vec<FileMatch>> {
    let mut out = Vec::new();
    for (idx, line) in stdout.split(|b| *b == b'\n').enumerate() {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let fm: FileMatch =
            serde_json::from_slice(line).map_err(|source| CombyError::Decode {
                line: idx + 1,
                source,
            })?;
        out.push(fm);
    }
    Ok(out)
}
