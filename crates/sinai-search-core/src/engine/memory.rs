//! In-memory [`SearchEngine`] implementation for tests and local development.
//!
//! Holds raw JSON documents behind a `Mutex` and evaluates [`SearchQuery`]
//! values directly instead of parsing query strings. Every query it sees is
//! recorded, and a failure can be injected at a chosen call so pipeline
//! error handling can be exercised without a network.
//!
//! Matching rules:
//! - `Keyword`: the wildcard matches every document with a manuscript id; a
//!   phrase matches when any string field (or string list entry) contains it,
//!   ignoring case.
//! - `Records`: exact record type, `publish_b == true` when required, and
//!   manuscript id in the given set.
//! - Sorting compares numbers numerically and strings lexicographically;
//!   documents missing the field sort last.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::models::fields;
use crate::query::{phrase_of, Filter, SearchQuery, SortOrder};

use super::{DocumentEnvelope, SearchEngine};

/// In-memory search index.
pub struct InMemoryIndex {
    docs: Mutex<Vec<Value>>,
    log: Mutex<Vec<SearchQuery>>,
    fail_on_call: Mutex<Option<usize>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            docs: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
            fail_on_call: Mutex::new(None),
        }
    }

    /// Creates an index pre-loaded with `docs`.
    pub fn with_documents(docs: Vec<Value>) -> Self {
        let index = Self::new();
        *index.docs.lock().unwrap_or_else(PoisonError::into_inner) = docs;
        index
    }

    /// Makes the `call`-th search (1-based, counted from now on) fail with
    /// a `503 Service Unavailable` status.
    pub fn fail_on_call(&self, call: usize) {
        let issued = self.log.lock().unwrap_or_else(PoisonError::into_inner).len();
        *self
            .fail_on_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(issued + call);
    }

    /// Every query issued so far, in order.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn string_values(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches(filter: &Filter, doc: &Map<String, Value>) -> bool {
    let manuscript_id = doc.get(fields::MANUSCRIPT_ID).and_then(Value::as_i64);
    match filter {
        Filter::Keyword { term } => {
            if manuscript_id.is_none() {
                return false;
            }
            let Some(phrase) = phrase_of(term) else {
                return true;
            };
            let phrase = phrase.to_lowercase();
            doc.values()
                .flat_map(string_values)
                .any(|s| s.to_lowercase().contains(&phrase))
        }
        Filter::Records {
            record_type,
            published_only,
            manuscript_ids,
        } => {
            doc.get(fields::RECORD_TYPE).and_then(Value::as_str) == Some(record_type.as_str())
                && (!published_only || doc.get(fields::PUBLISH) == Some(&Value::Bool(true)))
                && manuscript_id.is_some_and(|id| manuscript_ids.contains(&id))
        }
    }
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl SearchEngine for InMemoryIndex {
    async fn search(&self, query: &SearchQuery) -> Result<DocumentEnvelope, EngineError> {
        let call = {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            log.push(query.clone());
            log.len()
        };
        if *self
            .fail_on_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            == Some(call)
        {
            return Err(EngineError::Status {
                status: 503,
                reason: "Service Unavailable".to_string(),
            });
        }

        let docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        let mut hits: Vec<&Map<String, Value>> = docs
            .iter()
            .filter_map(Value::as_object)
            .filter(|doc| matches(&query.filter, doc))
            .collect();
        let num_found = hits.len() as u64;

        if let Some(group) = &query.group {
            let mut seen = HashSet::new();
            hits.retain(|doc| seen.insert(doc.get(&group.field).map(Value::to_string)));
        }

        hits.sort_by(|a, b| {
            query
                .sort
                .iter()
                .map(|clause| {
                    let ord = compare_field(a.get(&clause.field), b.get(&clause.field));
                    match clause.order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let docs = hits
            .into_iter()
            .take(query.rows as usize)
            .map(|doc| match &query.fields {
                Some(wanted) => Value::Object(
                    doc.iter()
                        .filter(|(k, _)| wanted.contains(k))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                ),
                None => Value::Object(doc.clone()),
            })
            .collect();

        Ok(DocumentEnvelope { num_found, docs })
    }

    async fn index(&self, documents: &Value) -> Result<(), EngineError> {
        let mut docs = self.docs.lock().unwrap_or_else(PoisonError::into_inner);
        match documents {
            Value::Array(items) => docs.extend(items.iter().cloned()),
            Value::Object(_) => docs.push(documents.clone()),
            other => {
                return Err(EngineError::Status {
                    status: 400,
                    reason: format!("cannot index {}", other),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{normalize_term, RecordType};
    use serde_json::json;

    fn sample() -> InMemoryIndex {
        InMemoryIndex::with_documents(vec![
            json!({"record_type_s": "manuscript", "manuscript_id_i": 2, "publish_b": true,
                   "shelf_mark_s": "Arabic 10", "title_s": "Homilies of Ephrem"}),
            json!({"record_type_s": "manuscript", "manuscript_id_i": 1, "publish_b": true,
                   "shelf_mark_s": "Arabic 9"}),
            json!({"record_type_s": "manuscript", "manuscript_id_i": 3, "publish_b": false,
                   "shelf_mark_s": "Arabic 11"}),
            json!({"record_type_s": "undertext_object", "manuscript_id_i": 1,
                   "undertext_object_id_i": 7, "author_s": "Ephrem the Syrian"}),
            json!({"record_type_s": "undertext_object", "manuscript_id_i": 1,
                   "undertext_object_id_i": 8, "scholar_name_ss": ["EPHREM scholar"]}),
        ])
    }

    #[tokio::test]
    async fn test_keyword_phrase_case_insensitive_and_grouped() {
        let index = sample();
        let found = index
            .search(&SearchQuery::candidates(&normalize_term("ephrem"), 100))
            .await
            .unwrap();
        assert_eq!(found.num_found, 3);
        let ids: Vec<i64> = found
            .docs
            .iter()
            .map(|d| d["manuscript_id_i"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(found.docs[0].as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wildcard_matches_everything_with_manuscript_id() {
        let index = sample();
        index.index(&json!({"record_type_s": "orphan"})).await.unwrap();
        let found = index
            .search(&SearchQuery::candidates("*", 100))
            .await
            .unwrap();
        assert_eq!(found.num_found, 5);
        assert_eq!(found.docs.len(), 3);
    }

    #[tokio::test]
    async fn test_records_filter_publish_and_sort() {
        let index = sample();
        let found = index
            .search(&SearchQuery::records(RecordType::Manuscript, &[1, 2, 3], 100))
            .await
            .unwrap();
        let marks: Vec<&str> = found
            .docs
            .iter()
            .map(|d| d["shelf_mark_s"].as_str().unwrap())
            .collect();
        // Engine sort is plain lexicographic.
        assert_eq!(marks, vec!["Arabic 10", "Arabic 9"]);
    }

    #[tokio::test]
    async fn test_fail_on_call() {
        let index = sample();
        index.fail_on_call(2);
        let query = SearchQuery::candidates("*", 1);
        assert!(index.search(&query).await.is_ok());
        assert!(matches!(
            index.search(&query).await,
            Err(EngineError::Status { status: 503, .. })
        ));
        assert!(index.search(&query).await.is_ok());
        assert_eq!(index.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_index_array_and_reject_scalar() {
        let index = InMemoryIndex::new();
        index
            .index(&json!([{"manuscript_id_i": 1}, {"manuscript_id_i": 2}]))
            .await
            .unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.index(&json!(42)).await.is_err());
    }
}
