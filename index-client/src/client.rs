//! reqwest-based client for the remote index.
//!
//! Endpoint used: `POST {endpoint}/api/search` with an [`IndexQuery`] body,
//! answering [`IndexSearchResponse`].

use std::time::Duration;

use futures::future::try_join_all;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::{
    BoxFuture, RemoteIndex,
    errors::{IndexError, IndexResult},
    types::{IndexQuery, IndexSearchResponse, IndexedFile},
};

/// Runtime configuration for [`IndexClient`].
#[derive(Debug, Clone)]
pub struct IndexClientConfig {
    /// Endpoints used when a request does not name its own.
    pub default_endpoints: Vec<String>,
    pub timeout: Duration,
}

impl Default for IndexClientConfig {
    fn default() -> Self {
        Self {
            default_endpoints: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client wrapper over one or more index endpoints.
#[derive(Debug, Clone)]
pub struct IndexClient {
    http: Client,
    default_endpoints: Vec<String>,
}

impl IndexClient {
    pub fn from_config(cfg: IndexClientConfig) -> IndexResult<Self> {
        debug!(
            endpoints = cfg.default_endpoints.len(),
            timeout_ms = cfg.timeout.as_millis() as u64,
            "initializing index client"
        );

        let http = Client::builder()
            .user_agent("structural-searcher/0.1")
            .timeout(cfg.timeout)
            .build()?;

        Ok(Self {
            http,
            default_endpoints: cfg.default_endpoints,
        })
    }

    /// Queries every endpoint concurrently and concatenates the candidates in
    /// endpoint order, truncated to `query.file_match_limit` when non-zero.
    #[instrument(skip_all, fields(repo_id = query.repo_id, branch = %query.branch))]
    pub async fn search_files(
        &self,
        endpoints: &[String],
        query: &IndexQuery,
    ) -> IndexResult<Vec<IndexedFile>> {
        let endpoints = if endpoints.is_empty() {
            &self.default_endpoints[..]
        } else {
            endpoints
        };
        if endpoints.is_empty() {
            return Err(IndexError::Config("no index endpoints configured".into()));
        }

        let per_endpoint =
            try_join_all(endpoints.iter().map(|ep| self.search_one(ep, query))).await?;

        let mut files: Vec<IndexedFile> = per_endpoint.into_iter().flatten().collect();
        if query.file_match_limit > 0 && files.len() > query.file_match_limit {
            files.truncate(query.file_match_limit);
        }

        debug!(files = files.len(), "index search finished");
        Ok(files)
    }

    async fn search_one(&self, endpoint: &str, query: &IndexQuery) -> IndexResult<Vec<IndexedFile>> {
        let url = format!("{}/api/search", endpoint.trim_end_matches('/'));
        debug!("index search: {}", url);

        let resp: IndexSearchResponse = self
            .http
            .post(url)
            .json(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.files)
    }
}

impl RemoteIndex for IndexClient {
    fn search<'a>(
        &'a self,
        endpoints: &'a [String],
        query: &'a IndexQuery,
    ) -> BoxFuture<'a, IndexResult<Vec<IndexedFile>>> {
        Box::pin(self.search_files(endpoints, query))
    }
}
