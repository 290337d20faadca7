use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::config::{AppConfig, DOC_TYPE, INDEX_NAME};
use crate::error::AppError;

/// Field every stats document is sorted on.
pub const DATE_FIELD: &str = "asOfYYYYMMDD";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Value,
}

/// Client with a request timeout. If the builder fails the default client
/// is used and the lost timeout is logged.
pub fn build_http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout_secs = timeout.as_secs(),
                "HTTP client builder failed, falling back to a client without timeout"
            );
            reqwest::Client::new()
        }
    }
}

/// Thin HTTP client for the metrics search index.
#[derive(Clone)]
pub struct IndexClient {
    client: reqwest::Client,
    port: u16,
}

impl IndexClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: build_http_client(config.index_timeout()),
            port: config.index_port,
        }
    }

    pub fn base_url(&self, host: &str) -> String {
        format!("http://{}:{}", host, self.port)
    }

    pub fn search_url(&self, host: &str) -> String {
        format!("{}/{}/{}/_search", self.base_url(host), INDEX_NAME, DOC_TYPE)
    }

    /// Succeeds when the host answers its root endpoint with a 2xx status.
    #[instrument(name = "index_ping", skip(self))]
    pub async fn ping(&self, host: &str) -> Result<(), AppError> {
        let resp = self
            .client
            .get(self.base_url(host))
            .send()
            .await
            .map_err(|e| AppError::IndexUnreachable(format!("{}: {}", host, e)))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(AppError::IndexQueryFailed(format!(
                "{} answered status {}",
                host,
                resp.status()
            )))
        }
    }

    /// Returns the `_source` of the newest `size` documents, newest first.
    #[instrument(name = "index_search_latest", skip(self))]
    pub async fn search_latest(&self, host: &str, size: usize) -> Result<Vec<Value>, AppError> {
        let query = json!({
            "size": size,
            "sort": [{ DATE_FIELD: { "order": "desc" } }],
        });

        let resp = self
            .client
            .post(self.search_url(host))
            .json(&query)
            .send()
            .await
            .map_err(|e| AppError::IndexUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::error!(status = %status, "Index search returned error status");
            return Err(AppError::IndexQueryFailed(format!(
                "error status code = {}",
                status.as_u16()
            )));
        }

        let body: SearchResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::IndexUnreachable(e.to_string())
            } else {
                AppError::IndexQueryFailed(format!("unreadable search response: {}", e))
            }
        })?;
        tracing::debug!(hits = body.hits.hits.len(), "Index search completed");

        Ok(body.hits.hits.into_iter().map(|h| h.source).collect())
    }
}
