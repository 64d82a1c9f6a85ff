//! Rich diagnostic error types for record extraction.

use miette::Diagnostic;
use thiserror::Error;

use crate::identity::Identity;

/// Errors from the fact, linkbase, schema and qualitative extractors.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("no {manager} records in this document")]
    #[diagnostic(
        code(ixbrl::extract::not_applicable),
        help(
            "The package has no files for this extractor, or they hold no records. \
             The extractor is left out of the document; this alone is not a failure."
        )
    )]
    NotApplicable { manager: String },

    #[error("no extractor produced records for \"{archive}\"")]
    #[diagnostic(
        code(ixbrl::extract::no_managers),
        help(
            "Every extractor either found nothing or failed. The archive is probably \
             not a disclosure package or is damaged."
        )
    )]
    NoApplicableManagers { archive: String },

    #[error("two extractors report manager {manager}")]
    #[diagnostic(
        code(ixbrl::extract::duplicate_manager),
        help("Each manager kind may appear once in a document builder's extractor set.")
    )]
    DuplicateManager { manager: String },

    #[error("document name tag not found in \"{archive}\"")]
    #[diagnostic(
        code(ixbrl::extract::document_name_not_found),
        help(
            "None of the iXBRL files carries a `DocumentName` fact, so no header can \
             be synthesised. Check that the summary file is complete."
        )
    )]
    DocumentNameNotFound { archive: String },

    #[error("{kind} record references source file {source_file_id}, which the document does not declare")]
    #[diagnostic(
        code(ixbrl::extract::orphaned_source_file),
        help(
            "Every record must point at a source file emitted by some extractor of \
             the same document. This indicates an extractor bug."
        )
    )]
    OrphanedSourceFile {
        kind: String,
        source_file_id: Identity,
    },

    #[error("malformed markup in \"{path}\"")]
    #[diagnostic(
        code(ixbrl::extract::xml),
        help("The file is not well-formed XML/XHTML. Re-download the archive.")
    )]
    Xml {
        path: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("I/O error reading \"{path}\": {source}")]
    #[diagnostic(
        code(ixbrl::extract::io),
        help("The unpacked file could not be read. Check free space and permissions.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    /// The "nothing to extract here" signal, as opposed to a real failure.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable { .. })
    }
}

/// Convenience alias for extraction results.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
