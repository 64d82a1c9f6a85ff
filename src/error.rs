//! Rich diagnostic error types for the ingestion pipeline.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so an operator can tell a damaged
//! archive from an unreachable store at a glance.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::api::ApiError;
pub use crate::archive::ArchiveError;
pub use crate::config::ConfigError;
pub use crate::extract::ExtractError;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("no archive was ingested: {attempted} found, {skipped} already active, {failed} failed")]
    #[diagnostic(
        code(ixbrl::pipeline::no_progress),
        help(
            "The run made no forward progress. If every archive was skipped, there is \
             nothing new to ingest; otherwise check the per-archive failures logged above."
        )
    )]
    NoProgress {
        attempted: usize,
        skipped: usize,
        failed: usize,
    },

    #[error("cannot scan \"{path}\"")]
    #[diagnostic(
        code(ixbrl::pipeline::scan),
        help("The archive root must be an existing, readable directory.")
    )]
    Scan {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Convenience alias used across the crate's public entry points.
pub type IngestResult<T> = std::result::Result<T, IngestError>;
