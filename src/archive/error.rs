//! Rich diagnostic error types for archive loading.

use miette::Diagnostic;
use thiserror::Error;

/// Why an unpacked archive is not an ingestible disclosure package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotXbrlReason {
    /// No file ends with the disclosure-summary suffix.
    NoSummaryFile,
    /// Financial-statement category with only the summary file.
    MissingStatementFiles,
    /// Revision category with more than one summary file.
    MultipleRevisionFiles,
    /// Summary files present but no known category marker.
    NoFinancialStatement,
}

impl std::fmt::Display for NotXbrlReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoSummaryFile => "no ixbrl summary file",
            Self::MissingStatementFiles => "missing statement files",
            Self::MultipleRevisionFiles => "multiple revision files",
            Self::NoFinancialStatement => "summary present, but no financial statement",
        })
    }
}

/// Errors from unpacking and classifying an archive.
#[derive(Debug, Error, Diagnostic)]
pub enum ArchiveError {
    #[error("not an XBRL package \"{archive}\": {reason}")]
    #[diagnostic(
        code(ixbrl::archive::not_xbrl),
        help(
            "The archive must contain a disclosure summary (`*ixbrl.htm`) whose name \
             carries a known report category. Earnings summaries also need at least \
             one statement file; revision notices must contain exactly one."
        )
    )]
    NotXbrlDirectory {
        archive: String,
        reason: NotXbrlReason,
    },

    #[error("archive path has no file name: \"{archive}\"")]
    #[diagnostic(
        code(ixbrl::archive::no_file_name),
        help("Pass the path of a `.zip` file, not a directory or root path.")
    )]
    NoFileName { archive: String },

    #[error("failed to read zip archive \"{archive}\"")]
    #[diagnostic(
        code(ixbrl::archive::zip),
        help("The file may be truncated or not a zip archive. Re-download it.")
    )]
    Zip {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("I/O error on \"{path}\": {source}")]
    #[diagnostic(
        code(ixbrl::archive::io),
        help("A filesystem operation failed. Check paths, permissions and free space.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Whether this is the structural "not a disclosure package" failure.
    pub fn is_not_xbrl(&self) -> bool {
        matches!(self, Self::NotXbrlDirectory { .. })
    }
}

/// Convenience alias for archive results.
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;
