//! Linkbase graph records: locators, arcs and label values.

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKind, Identity, identify, number_field};
use crate::model::{DocumentKey, Identified};

/// A locator: reference to a taxonomy element, scoped to one linkbase file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkLoc {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    /// Role of the enclosing extended link.
    pub attr_value: Option<String>,
    pub xlink_type: Option<String>,
    /// Schema file part of the href.
    pub xlink_schema: Option<String>,
    /// Fragment part of the href (the element id).
    pub xlink_href: Option<String>,
    pub xlink_label: Option<String>,
    pub source_file_id: Identity,
}

impl LinkLoc {
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let source = self.source_file_id.to_string();
        self.item_key = identify(
            EntityKind::LinkLoc,
            &[self.xlink_label.as_deref(), self.xlink_schema.as_deref()],
            &[
                self.xlink_label.as_deref(),
                self.xlink_schema.as_deref(),
                self.xlink_type.as_deref(),
                self.xlink_href.as_deref(),
                Some(&source),
                Some(&head),
                self.attr_value.as_deref(),
            ],
        );
        self
    }
}

impl Identified for LinkLoc {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// A directed edge between two locator labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkArc {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub attr_value: Option<String>,
    pub xlink_type: Option<String>,
    pub xlink_from: Option<String>,
    pub xlink_to: Option<String>,
    pub xlink_arcrole: Option<String>,
    pub xlink_order: Option<f64>,
    /// Signed weight; calculation arcs only.
    pub xlink_weight: Option<f64>,
    pub source_file_id: Identity,
}

impl LinkArc {
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let source = self.source_file_id.to_string();
        let order = number_field(self.xlink_order);
        let weight = number_field(self.xlink_weight);
        self.item_key = identify(
            EntityKind::LinkArc,
            &[self.xlink_from.as_deref(), self.xlink_to.as_deref()],
            &[
                self.xlink_from.as_deref(),
                self.xlink_to.as_deref(),
                self.xlink_type.as_deref(),
                self.xlink_arcrole.as_deref(),
                Some(&source),
                self.attr_value.as_deref(),
                order.as_deref(),
                weight.as_deref(),
                Some(&head),
            ],
        );
        self
    }
}

impl Identified for LinkArc {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// Human-readable text bound to a label resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelValue {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub xlink_type: Option<String>,
    pub xlink_label: Option<String>,
    pub xlink_role: Option<String>,
    pub xml_lang: Option<String>,
    pub label: Option<String>,
    pub source_file_id: Identity,
}

impl LabelValue {
    pub fn identified(mut self) -> Self {
        let source = self.source_file_id.to_string();
        self.item_key = identify(
            EntityKind::LabelValue,
            &[self.xlink_label.as_deref(), self.xlink_role.as_deref()],
            &[
                self.xlink_label.as_deref(),
                self.xlink_role.as_deref(),
                Some(&source),
                self.xlink_type.as_deref(),
                self.xml_lang.as_deref(),
            ],
        );
        self
    }
}

impl Identified for LabelValue {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}
