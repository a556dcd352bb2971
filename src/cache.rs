//! Process-local result cache with in-flight coalescing.
//!
//! Each key (a normalized search term) is in one of three states:
//!
//! - absent: the next lookup starts a run;
//! - pending: a run is in flight, and later lookups await the same run;
//! - ready: the finished result, shared by `Arc` until process exit.
//!
//! Runs are spawned onto the runtime, so a caller that stops waiting
//! (timeout, dropped request) does not cancel the run: it still completes
//! and, on success, fills the cache. A failed run clears its slot so the
//! next lookup retries. Entries never expire.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use sinai_search_core::error::SearchError;
use sinai_search_core::models::SearchResult;
use tracing::debug;

type RunFuture = Shared<BoxFuture<'static, Result<Arc<SearchResult>, SearchError>>>;

enum Slot {
    Ready(Arc<SearchResult>),
    Pending(RunFuture),
}

/// Normalized term to finished or in-flight result. Clones share the same map.
#[derive(Clone, Default)]
pub struct SearchCache {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished result for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Arc<SearchResult>> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(result)) => Some(result.clone()),
            _ => None,
        }
    }

    /// Number of finished results held.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached result for `key`, joins the run already in flight
    /// for it, or spawns `run` and records it as in flight.
    pub async fn get_or_run<F>(&self, key: &str, run: F) -> Result<Arc<SearchResult>, SearchError>
    where
        F: Future<Output = Result<SearchResult, SearchError>> + Send + 'static,
    {
        let pending = {
            let mut slots = self.slots.lock();
            match slots.get(key) {
                Some(Slot::Ready(result)) => {
                    debug!(key, "cache hit");
                    return Ok(result.clone());
                }
                Some(Slot::Pending(inflight)) => {
                    debug!(key, "joining in-flight search");
                    inflight.clone()
                }
                None => {
                    debug!(key, "cache miss");
                    let inflight = self.spawn(key.to_string(), run);
                    slots.insert(key.to_string(), Slot::Pending(inflight.clone()));
                    inflight
                }
            }
        };
        pending.await
    }

    /// Spawns `run`. Must be called with the slot map locked so the task
    /// cannot publish its outcome before its pending slot exists.
    fn spawn<F>(&self, key: String, run: F) -> RunFuture
    where
        F: Future<Output = Result<SearchResult, SearchError>> + Send + 'static,
    {
        let slots = self.slots.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let outcome = run.await.map(Arc::new);
            let mut slots = slots.lock();
            match &outcome {
                Ok(result) => {
                    slots.insert(task_key, Slot::Ready(result.clone()));
                }
                Err(e) => {
                    debug!(key = %task_key, error = %e, "search failed, not cached");
                    slots.remove(&task_key);
                }
            }
            outcome
        });

        let slots = self.slots.clone();
        handle
            .map(move |joined| {
                joined.unwrap_or_else(|e| {
                    let mut slots = slots.lock();
                    if matches!(slots.get(&key), Some(Slot::Pending(_))) {
                        slots.remove(&key);
                    }
                    Err(SearchError::Aborted(e.to_string()))
                })
            })
            .boxed()
            .shared()
    }
}
