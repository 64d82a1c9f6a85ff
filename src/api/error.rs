//! Errors talking to the remote ingestion API.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ApiError {
    #[error("{endpoint} answered with status {status}")]
    #[diagnostic(
        code(ixbrl::api::rejected),
        help(
            "The remote store refused the request. Check the server log for the \
             validation error; the document is left inactive."
        )
    )]
    Rejected { endpoint: String, status: u16 },

    #[error("request to {endpoint} failed: {message}")]
    #[diagnostic(
        code(ixbrl::api::transport),
        help("Is the ingestion API running and reachable at the configured `api_base_url`?")
    )]
    Transport { endpoint: String, message: String },

    #[error("failed to serialise {kind} payload: {source}")]
    #[diagnostic(code(ixbrl::api::serialize))]
    Serialize {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether a retry may succeed: transport failures and server errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Serialize { .. } => false,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
