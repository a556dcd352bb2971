//! CLI command implementations for `sinai search` and `sinai index`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sinai_search_core::engine::SearchEngine;

use crate::config::Config;
use crate::service::SearchService;
use crate::solr::SolrClient;

/// Runs one search and prints the result as pretty JSON.
pub async fn run_search(config: &Config, term: &str) -> Result<()> {
    let service = SearchService::from_config(config)?;
    let result = service
        .search(term)
        .await
        .with_context(|| format!("search for '{}' failed", term))?;
    println!("{}", serde_json::to_string_pretty(result.as_ref())?);
    Ok(())
}

/// Posts the documents in `path` to the Solr update endpoint.
pub async fn run_index(config: &Config, path: &Path) -> Result<()> {
    let documents = load_documents(path)?;
    let count = document_count(&documents);

    let client = SolrClient::from_config(config)?;
    client
        .index(&documents)
        .await
        .with_context(|| format!("failed to index {}", path.display()))?;

    println!(
        "Indexed {} document{} into {}",
        count,
        if count == 1 { "" } else { "s" },
        client.base_url()
    );
    Ok(())
}

/// Reads a JSON document or array of documents.
pub fn load_documents(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents file: {}", path.display()))?;
    let documents: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;

    match &documents {
        Value::Object(_) => {}
        Value::Array(items) => {
            if let Some(pos) = items.iter().position(|item| !item.is_object()) {
                bail!("element {} of {} is not a JSON object", pos, path.display());
            }
        }
        _ => bail!(
            "{} must contain a JSON object or an array of objects",
            path.display()
        ),
    }
    Ok(documents)
}

fn document_count(documents: &Value) -> usize {
    match documents {
        Value::Array(items) => items.len(),
        _ => 1,
    }
}
