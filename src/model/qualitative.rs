//! Narrative blocks with a position in the document tree.

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKind, Identity, derive_identity, identify};
use crate::model::{DocumentKey, Identified};

/// One heading or text block of a qualitative document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeDocument {
    pub item_key: Option<Identity>,
    #[serde(rename = "currentId")]
    pub current_id: Identity,
    #[serde(rename = "parentId")]
    pub parent_id: Option<Identity>,
    #[serde(rename = "type")]
    pub block_type: String,
    pub order: u32,
    pub head_item_key: DocumentKey,
    pub source_file_id: Identity,
    pub content: String,
}

impl QualitativeDocument {
    /// Instance id of the block at `ordinal` within a source file.
    pub fn instance_id(source_file_id: Identity, ordinal: usize) -> Identity {
        let source = source_file_id.to_string();
        let ordinal = ordinal.to_string();
        derive_identity(
            EntityKind::QualitativeInstance,
            &[Some(&source), Some(&ordinal)],
        )
    }

    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let source = self.source_file_id.to_string();
        let current = self.current_id.to_string();
        let content = Some(self.content.as_str());
        self.item_key = identify(
            EntityKind::Qualitative,
            &[content],
            &[content, Some(&head), Some(&source), Some(&current)],
        );
        self
    }
}

impl Identified for QualitativeDocument {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}
