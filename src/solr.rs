//! Solr-backed [`SearchEngine`].
//!
//! Talks to a single Solr core over its JSON request API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | search | `POST {base_url}/query` with `{"params": {...}}` |
//! | index | `POST {base_url}/update?json.command=false&commit=true` |
//!
//! A non-success status becomes [`EngineError::Status`], a request that
//! never gets a response (connection refused, timeout) becomes
//! [`EngineError::Transport`], and a body that is not a Solr response
//! becomes [`EngineError::Decode`]. Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use sinai_search_core::engine::{DocumentEnvelope, ResponseBody, SearchEngine};
use sinai_search_core::error::EngineError;
use sinai_search_core::query::SearchQuery;
use tracing::debug;

use crate::config::Config;

/// HTTP client for one Solr core, addressed by its base URL.
pub struct SolrClient {
    client: reqwest::Client,
    base_url: String,
}

impl SolrClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(&config.solr.base_url, config.solr_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, url: String, body: &Value) -> Result<reqwest::Response, EngineError> {
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(EngineError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            debug!(%url, status = status.as_u16(), body = %body_text, "solr request failed");
            return Err(EngineError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SearchEngine for SolrClient {
    async fn search(&self, query: &SearchQuery) -> Result<DocumentEnvelope, EngineError> {
        let params = query.to_params();
        debug!(q = %query.filter.to_query_string(), rows = query.rows, "solr query");

        let response = self
            .post(format!("{}/query", self.base_url), &json!({ "params": params }))
            .await?;

        let body: ResponseBody = response.json().await.map_err(|e| {
            if e.is_decode() {
                EngineError::Decode(e.to_string())
            } else {
                EngineError::transport(e)
            }
        })?;
        Ok(body.response)
    }

    async fn index(&self, documents: &Value) -> Result<(), EngineError> {
        self.post(
            format!("{}/update?json.command=false&commit=true", self.base_url),
            documents,
        )
        .await?;
        Ok(())
    }
}
