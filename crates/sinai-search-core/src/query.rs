//! Structured search queries.
//!
//! The pipeline never builds query strings by hand. It builds a
//! [`SearchQuery`] which the HTTP client renders into request parameters
//! with [`SearchQuery::to_params`] and which the in-memory index evaluates
//! directly.
//!
//! # Example
//!
//! ```rust
//! use sinai_search_core::query::{RecordType, SearchQuery};
//!
//! let query = SearchQuery::records(RecordType::Manuscript, &[3, 7], 100);
//! assert_eq!(
//!     query.filter.to_query_string(),
//!     "record_type_s:manuscript AND publish_b:true AND manuscript_id_i:(3 7)"
//! );
//! assert_eq!(query.to_params()["sort"], "shelf_mark_s asc");
//! ```

use serde_json::{Map, Value};

use crate::models::fields;

/// Row cap used when the caller wants "everything".
pub const DEFAULT_MAX_ROWS: u64 = 10_000_000;

/// Wildcard term matching every record.
pub const MATCH_ALL: &str = "*";

/// The five kinds of record the pipeline fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Manuscript,
    UndertextObject,
    ManuscriptComponent,
    OvertextLayer,
    UndertextLayer,
}

impl RecordType {
    /// Value of the `record_type_s` field.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordType::Manuscript => "manuscript",
            RecordType::UndertextObject => "undertext_object",
            RecordType::ManuscriptComponent => "manuscript_component",
            RecordType::OvertextLayer => "overtext_layer",
            RecordType::UndertextLayer => "undertext_layer",
        }
    }

    /// Sort requested from the engine when fetching this record type.
    fn sort(self) -> Vec<SortClause> {
        match self {
            RecordType::Manuscript => vec![SortClause::asc(fields::SHELF_MARK)],
            RecordType::UndertextObject => vec![
                SortClause::asc(fields::PRIMARY_LANGUAGE),
                SortClause::asc(fields::AUTHOR),
                SortClause::asc(fields::WORK),
            ],
            RecordType::ManuscriptComponent => vec![SortClause::asc(fields::POSITION)],
            RecordType::OvertextLayer | RecordType::UndertextLayer => Vec::new(),
        }
    }
}

/// Which documents a query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Documents whose keyword field matches `term` (an already normalized
    /// term: [`MATCH_ALL`] or a quoted phrase) and that carry a manuscript id.
    Keyword { term: String },
    /// Documents of one record type belonging to any of `manuscript_ids`.
    Records {
        record_type: RecordType,
        published_only: bool,
        manuscript_ids: Vec<i64>,
    },
}

impl Filter {
    /// Renders the filter in the engine's query syntax.
    pub fn to_query_string(&self) -> String {
        match self {
            Filter::Keyword { term } => format!(
                "{}:{} AND {}:[* TO *]",
                fields::KEYWORD,
                term,
                fields::MANUSCRIPT_ID
            ),
            Filter::Records {
                record_type,
                published_only,
                manuscript_ids,
            } => {
                let ids = manuscript_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                let mut q = format!("{}:{}", fields::RECORD_TYPE, record_type.as_str());
                if *published_only {
                    q.push_str(&format!(" AND {}:true", fields::PUBLISH));
                }
                q.push_str(&format!(" AND {}:({})", fields::MANUSCRIPT_ID, ids));
                q
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortClause {
    pub field: String,
    pub order: SortOrder,
}

impl SortClause {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            order: SortOrder::Asc,
        }
    }

    fn render(&self) -> String {
        let order = match self.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        format!("{} {}", self.field, order)
    }
}

/// Collapse results to one representative document per value of `field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub field: String,
    /// Return the representatives as a flat document list.
    pub main: bool,
}

/// A complete query against the search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: Filter,
    pub sort: Vec<SortClause>,
    pub group: Option<Grouping>,
    /// Restrict returned documents to these fields (all fields when `None`).
    pub fields: Option<Vec<String>>,
    pub rows: u64,
}

impl SearchQuery {
    /// The candidate lookup: one document per manuscript matching `term`.
    pub fn candidates(term: &str, rows: u64) -> Self {
        Self {
            filter: Filter::Keyword {
                term: term.to_string(),
            },
            sort: Vec::new(),
            group: Some(Grouping {
                field: fields::MANUSCRIPT_ID.to_string(),
                main: true,
            }),
            fields: Some(vec![fields::MANUSCRIPT_ID.to_string()]),
            rows,
        }
    }

    /// A dependent fetch of one record type for a set of manuscripts.
    pub fn records(record_type: RecordType, manuscript_ids: &[i64], rows: u64) -> Self {
        Self {
            filter: Filter::Records {
                record_type,
                published_only: record_type == RecordType::Manuscript,
                manuscript_ids: manuscript_ids.to_vec(),
            },
            sort: record_type.sort(),
            group: None,
            fields: None,
            rows,
        }
    }

    /// Request parameters in the engine's JSON request format.
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("q".into(), Value::String(self.filter.to_query_string()));
        if !self.sort.is_empty() {
            let sort = self
                .sort
                .iter()
                .map(SortClause::render)
                .collect::<Vec<_>>()
                .join(",");
            params.insert("sort".into(), Value::String(sort));
        }
        if let Some(fields) = &self.fields {
            params.insert("fl".into(), Value::String(fields.join(",")));
        }
        if let Some(group) = &self.group {
            params.insert("group".into(), Value::String("true".into()));
            params.insert("group.main".into(), Value::String(group.main.to_string()));
            params.insert("group.field".into(), Value::String(group.field.clone()));
        }
        params.insert("rows".into(), Value::from(self.rows));
        params
    }
}

/// Turns user input into the term used for matching and as the cache key.
///
/// Blank input becomes [`MATCH_ALL`]; anything else becomes an exact phrase,
/// with embedded quotes and backslashes escaped.
pub fn normalize_term(input: &str) -> String {
    if input.trim().is_empty() {
        return MATCH_ALL.to_string();
    }
    let escaped = input.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Inverse of the phrase quoting done by [`normalize_term`].
///
/// Returns `None` for [`MATCH_ALL`].
pub fn phrase_of(term: &str) -> Option<String> {
    if term == MATCH_ALL {
        return None;
    }
    let inner = term
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(term);
    Some(inner.replace("\\\"", "\"").replace("\\\\", "\\"))
}
