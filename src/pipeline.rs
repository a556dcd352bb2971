//! The query orchestrator: one uncached search run.
//!
//! A run issues up to six engine queries, strictly one after another:
//!
//! ```text
//! candidates ─▶ manuscripts ─▶ undertext objects ─▶ components
//!            ─▶ overtext layers ─▶ undertext layers ─▶ assemble
//! ```
//!
//! The candidate query finds which manuscripts have any record matching the
//! term. Every later query fetches one record type for that manuscript id
//! set. The first failure ends the run and is returned unchanged. Caching
//! and deadlines are layered on top by [`crate::service`].

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sinai_search_core::assemble::{assemble, FetchedRecords};
use sinai_search_core::engine::SearchEngine;
use sinai_search_core::error::SearchError;
use sinai_search_core::models::{
    Manuscript, ManuscriptComponent, OvertextLayer, SearchResult, UndertextLayer, UndertextObject,
};
use sinai_search_core::ordering::{compare_undertext_objects, sort_by_shelf_mark};
use sinai_search_core::query::{RecordType, SearchQuery};
use tracing::debug;

/// Shape of a candidate document: only the manuscript id is requested.
#[derive(Deserialize)]
struct CandidateDoc {
    #[serde(rename = "manuscript_id_i")]
    manuscript_id: i64,
}

/// Issues the six engine queries of one search and assembles the answer.
///
/// Holds no state between runs; caching belongs to [`crate::cache`].
pub struct SearchPipeline {
    engine: Arc<dyn SearchEngine>,
    max_rows: u64,
}

impl SearchPipeline {
    pub fn new(engine: Arc<dyn SearchEngine>, max_rows: u64) -> Self {
        Self { engine, max_rows }
    }

    /// Runs the full pipeline for an already normalized term.
    pub async fn run(&self, term: &str) -> Result<SearchResult, SearchError> {
        let candidates = self
            .engine
            .search(&SearchQuery::candidates(term, self.max_rows))
            .await?;

        let mut seen = HashSet::new();
        let ids: Vec<i64> = candidates
            .decode::<CandidateDoc>()?
            .into_iter()
            .map(|doc| doc.manuscript_id)
            .filter(|id| seen.insert(*id))
            .collect();
        debug!(term, num_found = candidates.num_found, manuscripts = ids.len(), "candidates");

        if candidates.num_found == 0 || ids.is_empty() {
            return Ok(assemble(FetchedRecords::default()));
        }

        let mut manuscripts: Vec<Manuscript> = self.fetch(RecordType::Manuscript, &ids).await?;
        sort_by_shelf_mark(&mut manuscripts, |m| m.shelf_mark.as_str())?;

        let mut undertext_objects: Vec<UndertextObject> =
            self.fetch(RecordType::UndertextObject, &ids).await?;
        undertext_objects.sort_by(compare_undertext_objects);

        let manuscript_components: Vec<ManuscriptComponent> =
            self.fetch(RecordType::ManuscriptComponent, &ids).await?;
        let overtext_layers: Vec<OvertextLayer> =
            self.fetch(RecordType::OvertextLayer, &ids).await?;
        let undertext_layers: Vec<UndertextLayer> =
            self.fetch(RecordType::UndertextLayer, &ids).await?;

        Ok(assemble(FetchedRecords {
            manuscripts,
            undertext_objects,
            manuscript_components,
            overtext_layers,
            undertext_layers,
        }))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        record_type: RecordType,
        manuscript_ids: &[i64],
    ) -> Result<Vec<T>, SearchError> {
        let envelope = self
            .engine
            .search(&SearchQuery::records(record_type, manuscript_ids, self.max_rows))
            .await?;
        debug!(
            record_type = record_type.as_str(),
            num_found = envelope.num_found,
            "fetched"
        );
        Ok(envelope.decode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sinai_search_core::engine::memory::InMemoryIndex;
    use sinai_search_core::error::{DataIntegrityError, EngineError};
    use sinai_search_core::query::{normalize_term, Filter};

    fn catalog() -> Vec<serde_json::Value> {
        vec![
            json!({"record_type_s": "manuscript", "manuscript_id_i": 1, "publish_b": true,
                   "shelf_mark_s": "Arabic 588", "support_material_s": "parchment",
                   "keyword_t": "Arabic 588 homilies"}),
            json!({"record_type_s": "manuscript", "manuscript_id_i": 2, "publish_b": true,
                   "shelf_mark_s": "Arabic 518", "support_material_s": "paper",
                   "keyword_t": "Arabic 518 gospels"}),
            json!({"record_type_s": "manuscript", "manuscript_id_i": 3, "publish_b": false,
                   "shelf_mark_s": "Arabic 1", "keyword_t": "unpublished gospels"}),
            json!({"record_type_s": "undertext_object", "manuscript_id_i": 1,
                   "undertext_object_id_i": 11, "primary_language_s": "Syriac",
                   "work_s": "Gospels", "folios_ss": ["3r"]}),
            json!({"record_type_s": "undertext_object", "manuscript_id_i": 1,
                   "undertext_object_id_i": 12, "primary_language_s": "Greek",
                   "author_s": "Basil", "work_s": "Homilies"}),
            json!({"record_type_s": "manuscript_component", "manuscript_id_i": 1,
                   "manuscript_component_id_i": 101, "position_i": 2}),
            json!({"record_type_s": "manuscript_component", "manuscript_id_i": 1,
                   "manuscript_component_id_i": 100, "position_i": 1, "decoration_s": "red ink"}),
            json!({"record_type_s": "manuscript_component", "manuscript_id_i": 2,
                   "manuscript_component_id_i": 200, "position_i": 1}),
            json!({"record_type_s": "overtext_layer", "manuscript_id_i": 1,
                   "manuscript_component_id_i": 100, "id": "ot-100"}),
            json!({"record_type_s": "undertext_layer", "manuscript_id_i": 1,
                   "manuscript_component_id_i": 100, "id": "ut-100-a",
                   "undertext_object_id_i": 11}),
        ]
    }

    fn pipeline(index: Arc<InMemoryIndex>) -> SearchPipeline {
        SearchPipeline::new(index, 1_000)
    }

    #[tokio::test]
    async fn test_wildcard_run() {
        let index = Arc::new(InMemoryIndex::with_documents(catalog()));
        let result = pipeline(index.clone()).run("*").await.unwrap();

        // Unpublished manuscript 3 is a candidate but never fetched.
        let marks: Vec<&str> = result.iter().map(|e| e.manuscript.shelf_mark.as_str()).collect();
        assert_eq!(marks, vec!["Arabic 518", "Arabic 588"]);

        let ms1 = &result[1];
        let languages: Vec<_> = ms1
            .undertext_objects
            .iter()
            .map(|u| u.primary_language.as_deref().unwrap())
            .collect();
        assert_eq!(languages, vec!["Greek", "Syriac"]);

        let positions: Vec<_> = ms1
            .manuscript_components
            .iter()
            .map(|c| c.component.position)
            .collect();
        assert_eq!(positions, vec![Some(1), Some(2)]);
        let first = &ms1.manuscript_components[0];
        assert_eq!(first.component.shelf_mark.as_deref(), Some("Arabic 588"));
        assert_eq!(first.component.support_material.as_deref(), Some("parchment"));
        assert_eq!(
            first.overtext_layer.as_ref().unwrap().decoration.as_deref(),
            Some("red ink")
        );
        assert_eq!(first.undertext_layers[0].work.as_deref(), Some("Gospels"));

        assert_eq!(index.queries().len(), 6);
    }

    #[tokio::test]
    async fn test_query_sequence() {
        let index = Arc::new(InMemoryIndex::with_documents(catalog()));
        pipeline(index.clone()).run(&normalize_term("gospels")).await.unwrap();

        let queries = index.queries();
        assert!(matches!(queries[0].filter, Filter::Keyword { .. }));
        let fetched: Vec<RecordType> = queries[1..]
            .iter()
            .map(|q| match &q.filter {
                Filter::Records {
                    record_type,
                    manuscript_ids,
                    ..
                } => {
                    assert_eq!(manuscript_ids, &vec![2, 3, 1]);
                    *record_type
                }
                other => panic!("unexpected filter {:?}", other),
            })
            .collect();
        assert_eq!(
            fetched,
            vec![
                RecordType::Manuscript,
                RecordType::UndertextObject,
                RecordType::ManuscriptComponent,
                RecordType::OvertextLayer,
                RecordType::UndertextLayer,
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_hits_is_empty_result() {
        let index = Arc::new(InMemoryIndex::with_documents(catalog()));
        let result = pipeline(index.clone())
            .run(&normalize_term("no such phrase"))
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(index.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_at_third_dependent_fetch() {
        let index = Arc::new(InMemoryIndex::with_documents(catalog()));
        index.fail_on_call(4);
        let err = pipeline(index.clone()).run("*").await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::Engine(EngineError::Status { status: 503, .. })
        ));
        assert_eq!(index.queries().len(), 4);
    }

    #[tokio::test]
    async fn test_bad_shelf_mark_is_integrity_error() {
        let index = Arc::new(InMemoryIndex::with_documents(vec![
            json!({"record_type_s": "manuscript", "manuscript_id_i": 1, "publish_b": true,
                   "shelf_mark_s": "Arabic 5"}),
            json!({"record_type_s": "manuscript", "manuscript_id_i": 2, "publish_b": true,
                   "shelf_mark_s": "lost label"}),
        ]));
        let err = pipeline(index.clone()).run("*").await.unwrap_err();
        assert!(matches!(
            err,
            SearchError::DataIntegrity(DataIntegrityError::UnparseableShelfMark(_))
        ));
        assert_eq!(index.queries().len(), 2);
    }
}
