//! The remote ingestion API.
//!
//! The pipeline only talks to the store through [`IngestApi`], so runs can be
//! driven against [`HttpIngestApi`] or any in-process implementation.

pub mod endpoints;
pub mod error;
pub mod http;

pub use error::{ApiError, ApiResult};
pub use http::HttpIngestApi;

use crate::model::{DocumentKey, Item};

/// Operations the ingestion pipeline needs from the remote store.
pub trait IngestApi: Send + Sync {
    /// Whether the document has already been ingested and activated.
    fn is_active(&self, key: DocumentKey) -> ApiResult<bool>;

    /// Insert one item batch at the endpoint for its kind.
    fn push(&self, item: &Item) -> ApiResult<()>;

    /// Mark a fully pushed document as active.
    fn activate(&self, key: DocumentKey) -> ApiResult<()>;

    /// Ask the store to generate derived tables for the document.
    fn generate(&self, key: DocumentKey) -> ApiResult<()>;

    /// Trigger the title summary for the document.
    fn request_summary(&self, key: DocumentKey) -> ApiResult<()>;
}
