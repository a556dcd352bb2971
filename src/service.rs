//! Search entry point: normalization, caching and the search deadline.
//!
//! [`SearchService::search`] is what the CLI and the HTTP API call. It
//! normalizes the user's term, then serves the result from the
//! [`SearchCache`], running the [`SearchPipeline`] on a miss. The whole
//! lookup is bounded by the configured search timeout. On expiry the caller
//! gets [`SearchError::Timeout`] while the run itself carries on in the
//! background and is cached if it succeeds.

use std::sync::Arc;
use std::time::Duration;

use sinai_search_core::engine::SearchEngine;
use sinai_search_core::error::SearchError;
use sinai_search_core::models::SearchResult;
use sinai_search_core::query::normalize_term;
use tracing::{info, warn};

use crate::cache::SearchCache;
use crate::config::Config;
use crate::pipeline::SearchPipeline;
use crate::solr::SolrClient;

/// Cached, deadline-bounded catalog search shared by the CLI and the HTTP API.
pub struct SearchService {
    pipeline: Arc<SearchPipeline>,
    cache: SearchCache,
    timeout: Duration,
}

impl SearchService {
    pub fn new(engine: Arc<dyn SearchEngine>, max_rows: u64, timeout: Duration) -> Self {
        Self {
            pipeline: Arc::new(SearchPipeline::new(engine, max_rows)),
            cache: SearchCache::new(),
            timeout,
        }
    }

    /// Builds a service backed by the Solr core named in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let engine = SolrClient::from_config(config)?;
        Ok(Self::new(
            Arc::new(engine),
            config.solr.max_rows,
            config.search_timeout(),
        ))
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Searches the catalog for `input`. Blank input matches everything.
    pub async fn search(&self, input: &str) -> Result<Arc<SearchResult>, SearchError> {
        let term = normalize_term(input);

        let pipeline = self.pipeline.clone();
        let run_term = term.clone();
        let run = async move {
            let result = pipeline.run(&run_term).await?;
            info!(term = %run_term, manuscripts = result.len(), "search complete");
            Ok::<_, SearchError>(result)
        };

        // Expiry only stops the wait. The spawned run keeps going and a late
        // success is still cached for the next caller.
        match tokio::time::timeout(self.timeout, self.cache.get_or_run(&term, run)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(%term, timeout = ?self.timeout, "search timed out");
                Err(SearchError::Timeout(self.timeout))
            }
        }
    }
}
