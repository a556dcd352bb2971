//! Search engine abstraction.
//!
//! The [`SearchEngine`] trait is the only way the pipeline reaches the
//! external search index: a structured query in, a [`DocumentEnvelope`]
//! out, plus an update call for writing documents. Implementations must be
//! `Send + Sync` so a single engine can serve concurrent searches.
//!
//! | Implementation | Where |
//! |----------------|-------|
//! | HTTP (Solr JSON request API) | `sinai_search::solr::SolrClient` |
//! | In-process, for tests and local development | [`memory::InMemoryIndex`] |
//!
//! Implementations do not retry. A failed call is reported once and the
//! caller decides what to do with it.

pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::query::SearchQuery;

/// The `response` part of an engine answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    #[serde(rename = "numFound")]
    pub num_found: u64,
    #[serde(default)]
    pub docs: Vec<Value>,
}

impl DocumentEnvelope {
    /// Decodes every raw document into `T`, preserving order.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, EngineError> {
        self.docs
            .iter()
            .map(|doc| {
                T::deserialize(doc).map_err(|e| EngineError::Decode(format!("{}: {}", e, doc)))
            })
            .collect()
    }
}

/// Top-level shape of an engine answer: `{ "response": { ... } }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResponseBody {
    pub response: DocumentEnvelope,
}

/// A queryable, updatable search index.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Runs a query and returns the matching documents.
    async fn search(&self, query: &SearchQuery) -> Result<DocumentEnvelope, EngineError>;

    /// Writes a document, or an array of documents, to the index.
    async fn index(&self, documents: &Value) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Manuscript;
    use serde_json::json;

    #[test]
    fn test_response_body_parses() {
        let body: ResponseBody = serde_json::from_value(json!({
            "responseHeader": { "status": 0 },
            "response": { "numFound": 2, "start": 0, "docs": [{"a": 1}, {"a": 2}] }
        }))
        .unwrap();
        assert_eq!(body.response.num_found, 2);
        assert_eq!(body.response.docs.len(), 2);
    }

    #[test]
    fn test_decode_keeps_unmodeled_fields() {
        let envelope = DocumentEnvelope {
            num_found: 1,
            docs: vec![json!({
                "manuscript_id_i": 4,
                "shelf_mark_s": "Syriac 30",
                "folio_count_i": 210,
                "binding_status_s": "rebound"
            })],
        };
        let manuscripts: Vec<Manuscript> = envelope.decode().unwrap();
        assert_eq!(manuscripts[0].id, 4);
        assert_eq!(manuscripts[0].folio_count, Some(210));
        assert_eq!(manuscripts[0].extra["binding_status_s"], "rebound");
    }

    #[test]
    fn test_decode_reports_bad_document() {
        let envelope = DocumentEnvelope {
            num_found: 1,
            docs: vec![json!({ "shelf_mark_s": "Syriac 30" })],
        };
        let err = envelope.decode::<Manuscript>().unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }
}
