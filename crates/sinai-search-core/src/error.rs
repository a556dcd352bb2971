//! Error types shared by the pipeline and its collaborators.
//!
//! Every failure a search run can produce is a [`SearchError`]. The variants
//! are distinguishable so that the request layer can map an unavailable
//! search engine to a "try again later" response and bad catalog data to an
//! internal error. All errors are `Clone` because a single failed run may be
//! delivered to several coalesced waiters.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Failure talking to the external search engine.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// The engine answered with a non-success HTTP status.
    #[error("search engine returned {status} {reason}")]
    Status { status: u16, reason: String },

    /// The request never produced a response (refused, timed out, DNS...).
    #[error("search engine transport error: {0}")]
    Transport(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// The engine answered, but not with a document envelope we can read.
    #[error("malformed search engine response: {0}")]
    Decode(String),
}

impl EngineError {
    /// Wraps any transport-level error.
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::Transport(Arc::new(err))
    }
}

/// Catalog data that violates the shelf-mark conventions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("unparseable shelf mark: {0:?}")]
    UnparseableShelfMark(String),

    #[error("conflicting new-find types {left:?} and {right:?} in {language} shelf marks")]
    ConflictingNewFindTypes {
        language: String,
        left: String,
        right: String,
    },
}

/// Any failure of a search run.
#[derive(Error, Debug, Clone)]
pub enum SearchError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("search timed out after {0:?}")]
    Timeout(Duration),

    /// The task driving the run died before producing a result.
    #[error("search run aborted: {0}")]
    Aborted(String),
}
