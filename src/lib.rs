//! # Sinai Search
//!
//! Keyword search over the Sinai palimpsests catalog.
//!
//! The catalog lives in a Solr core as flat documents of five record types:
//! manuscripts, undertext objects, manuscript components, overtext layers and
//! undertext layers. A search finds every manuscript with any record matching
//! the term, fetches all five record types for those manuscripts, and
//! assembles one nested entry per manuscript, ordered by shelf mark.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌───────────┐   ┌────────┐
//! │ CLI/HTTP │──▶│ SearchService │──▶│  Pipeline  │──▶│  Solr  │
//! │ (sinai)  │   │ cache+timeout │   │ 6 queries  │   │        │
//! └──────────┘   └──────────────┘   └─────┬─────┘   └────────┘
//!                                         ▼
//!                                   ┌───────────┐
//!                                   │ assemble  │
//!                                   └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sinai index catalog.json          # load documents into Solr
//! sinai search "Ephrem"             # print results as JSON
//! sinai serve                       # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`solr`] | Solr HTTP client |
//! | [`pipeline`] | One uncached search run |
//! | [`cache`] | Result cache with in-flight coalescing |
//! | [`service`] | Search entry point (normalize, cache, deadline) |
//! | [`commands`] | CLI command implementations |
//! | [`server`] | HTTP API |
//!
//! Models, query construction, ordering rules and result assembly live in
//! the `sinai-search-core` crate.

pub mod cache;
pub mod commands;
pub mod config;
pub mod pipeline;
pub mod server;
pub mod service;
pub mod solr;
