//! The ordered, typed item list handed from the aggregator to the pipeline.
//!
//! [`ItemKind`] is a routing discriminator only: it selects the remote
//! endpoint and nothing else looks at it.

use std::fmt;

use serde::Serialize;
use serde_json::{Value, json};

use crate::identity::Identity;
use crate::model::{
    FilePath, Identified, IxContext, IxHeader, IxNonFraction, IxNonNumeric, LabelValue, LinkArc,
    LinkLoc, QualitativeDocument, SchemaElement, SchemaImport, SchemaLinkBaseRef, SourceFile,
};

/// Type tag of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    FilePath,
    HeadTitle,
    IxSourceFile,
    NonFraction,
    NonNumeric,
    Context,
    LabSourceFile,
    LabLocs,
    LabArcs,
    LabValues,
    CalSourceFile,
    CalLocs,
    CalArcs,
    DefSourceFile,
    DefLocs,
    DefArcs,
    PreSourceFile,
    PreLocs,
    PreArcs,
    QualitativeSourceFile,
    Qualitative,
    SchemaSourceFile,
    SchemaLinkBaseRefs,
    SchemaImports,
    SchemaElements,
}

impl ItemKind {
    /// Wire tag, e.g. `ix_non_fraction` or `lab_link_arcs`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FilePath => "ix_file_path",
            Self::HeadTitle => "ix_head_title",
            Self::IxSourceFile => "ix_source_file",
            Self::NonFraction => "ix_non_fraction",
            Self::NonNumeric => "ix_non_numeric",
            Self::Context => "ix_context",
            Self::LabSourceFile => "lab_source_file",
            Self::LabLocs => "lab_link_locs",
            Self::LabArcs => "lab_link_arcs",
            Self::LabValues => "lab_link_values",
            Self::CalSourceFile => "cal_source_file",
            Self::CalLocs => "cal_link_locs",
            Self::CalArcs => "cal_link_arcs",
            Self::DefSourceFile => "def_source_file",
            Self::DefLocs => "def_link_locs",
            Self::DefArcs => "def_link_arcs",
            Self::PreSourceFile => "pre_source_file",
            Self::PreLocs => "pre_link_locs",
            Self::PreArcs => "pre_link_arcs",
            Self::QualitativeSourceFile => "qualitative_source_file",
            Self::Qualitative => "qualitative_info",
            Self::SchemaSourceFile => "sc_source_file",
            Self::SchemaLinkBaseRefs => "sc_linkbase_ref",
            Self::SchemaImports => "schema_imports",
            Self::SchemaElements => "schema_elements",
        }
    }

    /// Source-file batches are pushed before anything that references them.
    pub fn is_source_file(&self) -> bool {
        matches!(
            self,
            Self::IxSourceFile
                | Self::LabSourceFile
                | Self::CalSourceFile
                | Self::DefSourceFile
                | Self::PreSourceFile
                | Self::QualitativeSourceFile
                | Self::SchemaSourceFile
        )
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The records carried by one item.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    FilePath(FilePath),
    Header(Box<IxHeader>),
    SourceFiles(Vec<SourceFile>),
    NonFraction(Vec<IxNonFraction>),
    NonNumeric(Vec<IxNonNumeric>),
    Contexts(Vec<IxContext>),
    Locs(Vec<LinkLoc>),
    Arcs(Vec<LinkArc>),
    LabelValues(Vec<LabelValue>),
    LinkBaseRefs(Vec<SchemaLinkBaseRef>),
    SchemaImports(Vec<SchemaImport>),
    SchemaElements(Vec<SchemaElement>),
    Qualitative(Vec<QualitativeDocument>),
}

fn refs<T: Identified>(records: &[T]) -> Vec<Identity> {
    records.iter().filter_map(Identified::source_file_ref).collect()
}

fn ids<T: Identified>(records: &[T]) -> Vec<Identity> {
    records.iter().filter_map(Identified::identity).collect()
}

fn retain_identified<T: Identified>(records: &mut Vec<T>) -> bool {
    records.retain(|r| r.identity().is_some());
    !records.is_empty()
}

impl Payload {
    /// Number of records carried.
    pub fn len(&self) -> usize {
        match self {
            Self::FilePath(_) | Self::Header(_) => 1,
            Self::SourceFiles(v) => v.len(),
            Self::NonFraction(v) => v.len(),
            Self::NonNumeric(v) => v.len(),
            Self::Contexts(v) => v.len(),
            Self::Locs(v) => v.len(),
            Self::Arcs(v) => v.len(),
            Self::LabelValues(v) => v.len(),
            Self::LinkBaseRefs(v) => v.len(),
            Self::SchemaImports(v) => v.len(),
            Self::SchemaElements(v) => v.len(),
            Self::Qualitative(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop records that are not yet identifiable.
    ///
    /// Returns whether any record is left. A single-record payload is kept
    /// only when its record is identified.
    pub fn retain_identified(&mut self) -> bool {
        match self {
            Self::FilePath(path) => path.identity().is_some(),
            Self::Header(header) => header.identity().is_some(),
            Self::SourceFiles(v) => retain_identified(v),
            Self::NonFraction(v) => retain_identified(v),
            Self::NonNumeric(v) => retain_identified(v),
            Self::Contexts(v) => retain_identified(v),
            Self::Locs(v) => retain_identified(v),
            Self::Arcs(v) => retain_identified(v),
            Self::LabelValues(v) => retain_identified(v),
            Self::LinkBaseRefs(v) => retain_identified(v),
            Self::SchemaImports(v) => retain_identified(v),
            Self::SchemaElements(v) => retain_identified(v),
            Self::Qualitative(v) => retain_identified(v),
        }
    }

    /// Identities of the source files referenced by the records.
    ///
    /// Includes the linkbase files that schema references point at.
    pub fn source_file_refs(&self) -> Vec<Identity> {
        match self {
            Self::FilePath(_) | Self::Header(_) | Self::SourceFiles(_) => Vec::new(),
            Self::NonFraction(v) => refs(v),
            Self::NonNumeric(v) => refs(v),
            Self::Contexts(v) => refs(v),
            Self::Locs(v) => refs(v),
            Self::Arcs(v) => refs(v),
            Self::LabelValues(v) => refs(v),
            Self::LinkBaseRefs(v) => refs(v)
                .into_iter()
                .chain(v.iter().filter_map(|r| r.href_source_file_id))
                .collect(),
            Self::SchemaImports(v) => refs(v),
            Self::SchemaElements(v) => refs(v),
            Self::Qualitative(v) => refs(v),
        }
    }

    /// Identities of the source files this payload declares.
    pub fn declared_source_files(&self) -> Vec<Identity> {
        match self {
            Self::SourceFiles(v) => ids(v),
            _ => Vec::new(),
        }
    }
}

/// One unit of work for the remote store.
#[derive(Debug, Clone)]
pub struct Item {
    pub kind: ItemKind,
    /// Position within the owning extractor's output; the header is always 0.
    pub sort_key: u32,
    pub payload: Payload,
}

impl Item {
    pub fn new(kind: ItemKind, sort_key: u32, payload: Payload) -> Self {
        Self {
            kind,
            sort_key,
            payload,
        }
    }

    /// Request body: list endpoints take `{"data": [...]}`, the file path is sent bare.
    pub fn body(&self) -> serde_json::Result<Value> {
        match &self.payload {
            Payload::FilePath(path) => serde_json::to_value(path),
            Payload::Header(header) => Ok(json!({ "data": [serde_json::to_value(header)?] })),
            other => Ok(json!({ "data": serde_json::to_value(other)? })),
        }
    }
}
