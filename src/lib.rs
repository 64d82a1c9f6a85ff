// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # ixbrl-ingest
//!
//! Ingests XBRL/iXBRL disclosure archives into a remote store over HTTP,
//! exactly once per document and safely re-runnable over the same tree.
//!
//! ## Architecture
//!
//! - **Identity** (`identity`): content-addressed UUIDv5 keys for every record
//! - **Archives** (`archive`): unpack into scratch space, classify by report category
//! - **Extraction** (`extract`): iXBRL facts and header, linkbases, schemas, narrative text
//! - **Aggregation** (`document`): one ordered item list per archive
//! - **Ingestion** (`pipeline`, `api`): skip-if-active, ordered push, activation
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use ixbrl_ingest::api::HttpIngestApi;
//! use ixbrl_ingest::config::IngestConfig;
//! use ixbrl_ingest::pipeline::Pipeline;
//!
//! ixbrl_ingest::logging::init_tracing("info");
//! let config = IngestConfig::load(Path::new("ingest.toml")).unwrap();
//! let api = Arc::new(HttpIngestApi::new(&config));
//! let report = Pipeline::new(config, api).run(Path::new("/data/tdnet")).unwrap();
//! println!("{} archives activated", report.activated());
//! ```

pub mod api;
pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod identity;
pub mod logging;
pub mod markup;
pub mod model;
pub mod pipeline;
