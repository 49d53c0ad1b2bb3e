//! Runtime configuration loaded from environment variables.

use std::{path::PathBuf, time::Duration};

use index_client::IndexClientConfig;

use crate::errors::{SearchError, SearchResult};

/// Default cap on concurrent comby workers. Each worker maps snapshot content
/// into memory, so this bounds peak memory per request.
pub const DEFAULT_NUM_WORKERS: usize = 4;

/// Config bag for the searcher. All fields have defaults via `Default`/`from_env`.
#[derive(Clone, Debug)]
pub struct SearcherConfig {
    /// Path or name of the comby binary.
    pub comby_path: PathBuf,
    /// Worker cap passed to comby (`-jobs`).
    pub num_workers: usize,
    /// Run the regex prefilter before comby on snapshot searches.
    pub prefilter: bool,
    /// Directory for materialized index snapshots; system temp dir when `None`.
    pub tmp_dir: Option<PathBuf>,
    /// Index endpoints used when a request does not name any.
    pub index_endpoints: Vec<String>,
    pub index_timeout: Duration,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            comby_path: PathBuf::from("comby"),
            num_workers: DEFAULT_NUM_WORKERS,
            prefilter: true,
            tmp_dir: None,
            index_endpoints: Vec::new(),
            index_timeout: Duration::from_secs(30),
        }
    }
}

impl SearcherConfig {
    /// Build from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        let dflt = Self::default();
        Self {
            comby_path: std::env::var("COMBY_PATH")
                .map(PathBuf::from)
                .unwrap_or(dflt.comby_path),
            num_workers: parse("SEARCHER_STRUCTURAL_WORKERS", dflt.num_workers),
            prefilter: env("SEARCHER_STRUCTURAL_PREFILTER", "true") == "true",
            tmp_dir: std::env::var("SEARCHER_TMP_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            index_endpoints: env("INDEXED_SEARCH_SERVERS", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            index_timeout: Duration::from_secs(parse("INDEXED_SEARCH_TIMEOUT_SECS", 30u64)),
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> SearchResult<()> {
        if self.comby_path.as_os_str().is_empty() {
            return Err(SearchError::Config("comby_path is empty".into()));
        }
        if self.num_workers == 0 {
            return Err(SearchError::Config("num_workers must be > 0".into()));
        }
        if self.index_timeout.is_zero() {
            return Err(SearchError::Config("index_timeout must be > 0".into()));
        }
        Ok(())
    }

    /// Settings for the remote index client.
    pub fn index_client_config(&self) -> IndexClientConfig {
        IndexClientConfig {
            default_endpoints: self.index_endpoints.clone(),
            timeout: self.index_timeout,
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k).unwrap_or_else(|_| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}
