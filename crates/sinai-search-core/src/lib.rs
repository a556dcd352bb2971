//! # Sinai Search Core
//!
//! Runtime-independent logic for Sinai Search: catalog data models, the
//! structured query model, the two catalog ordering rules, result assembly,
//! and the [`SearchEngine`](engine::SearchEngine) trait that the pipeline
//! talks to.
//!
//! This crate contains no tokio, HTTP client, or filesystem dependencies.
//! The HTTP client, cache and orchestrator live in the `sinai-search` crate.

pub mod assemble;
pub mod engine;
pub mod error;
pub mod models;
pub mod ordering;
pub mod query;
