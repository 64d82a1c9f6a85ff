//! Record extractors, one per manager.
//!
//! Each extractor reads its own files from the unpacked archive and returns
//! an ordered item list. Extractors share nothing but the archive (read
//! only) and the document key, so the aggregator may run them in parallel.
//! An extractor with nothing to read reports [`ExtractError::NotApplicable`].

pub mod error;
pub mod facts;
pub mod header;
pub mod linkbase;
pub mod qualitative;
pub mod schema;

use std::fmt;
use std::path::Path;

pub use error::{ExtractError, ExtractResult};
pub use facts::{FactExtractor, IxDocumentSet};
pub use linkbase::{LinkbaseClass, LinkbaseExtractor};
pub use qualitative::QualitativeExtractor;
pub use schema::SchemaExtractor;

use crate::archive::XbrlArchive;
use crate::markup::{self, Element};
use crate::model::{DocumentKey, Item, ItemKind, Payload, SourceFile};

/// The extractors of one document, in aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManagerKind {
    Ix,
    Lab,
    Cal,
    Def,
    Pre,
    Qualitative,
    Schema,
}

impl ManagerKind {
    /// Declaration order; schema is last.
    pub const ALL: [ManagerKind; 7] = [
        Self::Ix,
        Self::Lab,
        Self::Cal,
        Self::Def,
        Self::Pre,
        Self::Qualitative,
        Self::Schema,
    ];

    /// Short tag, also used as the source-file `type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ix => "ix",
            Self::Lab => "lab",
            Self::Cal => "cal",
            Self::Def => "def",
            Self::Pre => "pre",
            Self::Qualitative => "qualitative",
            Self::Schema => "schema",
        }
    }

    /// Item kind of this manager's source-file batch.
    pub fn source_file_kind(&self) -> ItemKind {
        match self {
            Self::Ix => ItemKind::IxSourceFile,
            Self::Lab => ItemKind::LabSourceFile,
            Self::Cal => ItemKind::CalSourceFile,
            Self::Def => ItemKind::DefSourceFile,
            Self::Pre => ItemKind::PreSourceFile,
            Self::Qualitative => ItemKind::QualitativeSourceFile,
            Self::Schema => ItemKind::SchemaSourceFile,
        }
    }

    pub(crate) fn not_applicable(&self) -> ExtractError {
        ExtractError::NotApplicable {
            manager: self.as_str().to_string(),
        }
    }
}

impl fmt::Display for ManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record extractor.
pub trait Extractor: Send + Sync {
    fn kind(&self) -> ManagerKind;

    /// Build this manager's items for `archive`, sorted by sort key.
    fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>>;
}

/// Accumulates a manager's items, handing out sort keys in push order.
///
/// Sort key 0 is reserved for the document header.
#[derive(Debug)]
pub struct ItemList {
    items: Vec<Item>,
    next: u32,
}

impl ItemList {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next: 1,
        }
    }

    /// Append an item; empty payloads are not recorded.
    pub fn push(&mut self, kind: ItemKind, payload: Payload) {
        if payload.is_empty() {
            return;
        }
        self.items.push(Item::new(kind, self.next, payload));
        self.next += 1;
    }

    pub fn push_header(&mut self, payload: Payload) {
        self.items.push(Item::new(ItemKind::HeadTitle, 0, payload));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items ordered by sort key.
    pub fn into_sorted(mut self) -> Vec<Item> {
        self.items.sort_by_key(|i| i.sort_key);
        self.items
    }
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new()
    }
}

/// Final path component as a string.
pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Source-file record for an unpacked file.
pub(crate) fn source_file(path: &Path, manager: ManagerKind, key: DocumentKey) -> SourceFile {
    SourceFile::packaged(file_name(path), manager.as_str(), key)
}

pub(crate) fn read_text(path: &Path) -> ExtractResult<String> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read and parse an XML/XHTML file.
pub(crate) fn read_markup(path: &Path) -> ExtractResult<Element> {
    let text = read_text(path)?;
    markup::parse(&text).map_err(|source| ExtractError::Xml {
        path: path.display().to_string(),
        source,
    })
}

/// Role of an iXBRL file within its package.
///
/// Statement files are named `<seq>-<role>-...-ixbrl.htm` (e.g.
/// `0101010-acbs01-tse-acedjpfr-...`); anything else is the summary.
pub fn document_role(file_name: &str) -> String {
    let mut parts = file_name.split('-');
    match (parts.next(), parts.next()) {
        (Some(seq), Some(role))
            if !seq.is_empty() && seq.bytes().all(|b| b.is_ascii_digit()) && !role.is_empty() =>
        {
            role.to_string()
        }
        _ => "summary".to_string(),
    }
}
