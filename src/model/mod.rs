//! Typed records produced from one disclosure archive.
//!
//! Records are built once per document pass, carry a content-addressed
//! identity (see [`crate::identity`]) and are never mutated afterwards.
//! A record whose identity-determining fields are incomplete keeps
//! `item_key == None` and is dropped before anything is pushed.

pub mod facts;
pub mod item;
pub mod link;
pub mod qualitative;
pub mod schema;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKind, Identity, derive_identity, identify};

pub use facts::{IxContext, IxHeader, IxNonFraction, IxNonNumeric, ScenarioMember};
pub use item::{Item, ItemKind, Payload};
pub use link::{LabelValue, LinkArc, LinkLoc};
pub use qualitative::QualitativeDocument;
pub use schema::{SchemaElement, SchemaImport, SchemaLinkBaseRef};

/// Access to a record's identity and the source file it was read from.
pub trait Identified {
    /// Content identity, `None` while the record is not yet identifiable.
    fn identity(&self) -> Option<Identity>;

    /// Identity of the source file this record references, if any.
    fn source_file_ref(&self) -> Option<Identity> {
        None
    }
}

/// Stable key of one ingested archive, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentKey(Identity);

impl DocumentKey {
    /// Key for an archive file name such as `81220241106512345.zip`.
    pub fn from_file_name(file_name: &str) -> Self {
        Self(derive_identity(EntityKind::DocumentKey, &[Some(file_name)]))
    }

    /// Key for an archive path (its final component). `None` for paths without one.
    pub fn from_archive_path(path: &Path) -> Option<Self> {
        path.file_name()
            .map(|name| Self::from_file_name(&name.to_string_lossy()))
    }

    pub fn identity(&self) -> Identity {
        self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One file inside an archive, attributed to the extractor that read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub item_key: Option<Identity>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub head_item_key: Option<DocumentKey>,
    pub url: Option<String>,
}

impl SourceFile {
    /// A file read from the unpacked archive of `key`.
    pub fn packaged(name: impl Into<String>, kind: impl Into<String>, key: DocumentKey) -> Self {
        let name = name.into();
        let item_key = Some(Self::identity_for(&name, key));
        Self {
            item_key,
            name,
            kind: kind.into(),
            head_item_key: Some(key),
            url: None,
        }
    }

    /// A file referenced by URL outside any archive.
    pub fn remote(name: impl Into<String>, kind: impl Into<String>, url: impl Into<String>) -> Self {
        let name = name.into();
        let url = url.into();
        let item_key = identify(
            EntityKind::SourceFile,
            &[Some(&name), Some(&url)],
            &[Some(&name), Some(&url)],
        );
        Self {
            item_key,
            name,
            kind: kind.into(),
            head_item_key: None,
            url: Some(url),
        }
    }

    /// Identity a packaged file named `name` has within document `key`.
    ///
    /// Lets extractors reference files they did not read themselves.
    pub fn identity_for(name: &str, key: DocumentKey) -> Identity {
        let key = key.to_string();
        derive_identity(EntityKind::SourceFile, &[Some(name), Some(&key)])
    }
}

impl Identified for SourceFile {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }
}

/// On-disk path of the archive a document was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePath {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub path: String,
}

impl FilePath {
    pub fn new(key: DocumentKey, path: impl Into<String>) -> Self {
        let path = path.into();
        let head = key.to_string();
        let item_key = identify(
            EntityKind::FilePath,
            &[Some(&head), Some(&path)],
            &[Some(&head), Some(&path)],
        );
        Self {
            item_key,
            head_item_key: key,
            path,
        }
    }
}

impl Identified for FilePath {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }
}

/// Treat an empty string as absent.
pub(crate) fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}
