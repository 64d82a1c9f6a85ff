//! Taxonomy schema records: imports, linkbase references and element definitions.

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKind, Identity, identify};
use crate::model::{DocumentKey, Identified};

/// An `xsd:import` of another schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaImport {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub schema_location: Option<String>,
    pub name_space: Option<String>,
    pub xbrl_type: Option<String>,
    pub source_file_id: Identity,
}

impl SchemaImport {
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        self.item_key = identify(
            EntityKind::SchemaImport,
            &[self.schema_location.as_deref(), self.name_space.as_deref()],
            &[
                self.schema_location.as_deref(),
                self.name_space.as_deref(),
                self.xbrl_type.as_deref(),
                Some(&head),
            ],
        );
        self
    }
}

impl Identified for SchemaImport {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// A `link:linkbaseRef` from a schema to one of its linkbase files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaLinkBaseRef {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub xlink_type: Option<String>,
    pub xlink_href: Option<String>,
    pub xlink_role: Option<String>,
    pub xlink_arcrole: Option<String>,
    pub xbrl_type: Option<String>,
    pub source_file_id: Identity,
    /// Identity of the referenced linkbase file when it is part of the archive.
    pub href_source_file_id: Option<Identity>,
}

impl SchemaLinkBaseRef {
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        self.item_key = identify(
            EntityKind::SchemaLinkBaseRef,
            &[self.xlink_href.as_deref(), self.xlink_role.as_deref()],
            &[
                self.xlink_href.as_deref(),
                self.xlink_role.as_deref(),
                self.xbrl_type.as_deref(),
                Some(&head),
            ],
        );
        self
    }
}

impl Identified for SchemaLinkBaseRef {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// An `xsd:element` definition.
///
/// Identity covers the defining schema file, so two schemas of one package
/// that declare the same element name yield two records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaElement {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    #[serde(rename = "id")]
    pub element_id: Option<String>,
    pub xbrli_balance: Option<String>,
    pub xbrli_period_type: Option<String>,
    pub name: Option<String>,
    pub nillable: Option<String>,
    pub substitution_group: Option<String>,
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    #[serde(rename = "abstract")]
    pub is_abstract: Option<String>,
    pub xbrl_type: Option<String>,
    pub source_file_id: Identity,
}

impl SchemaElement {
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let source = self.source_file_id.to_string();
        self.item_key = identify(
            EntityKind::SchemaElement,
            &[self.name.as_deref()],
            &[self.name.as_deref(), Some(&source), Some(&head)],
        );
        self
    }
}

impl Identified for SchemaElement {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}
