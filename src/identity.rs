//! Content-addressed identities.
//!
//! Every persisted record carries an identity computed purely from its
//! semantic fields: a version-5 UUID over the fields joined by `_`, in the
//! namespace [`IDENTITY_NAMESPACE`]. The hashed field order for each
//! [`EntityKind`] is part of the wire contract; reordering it changes every
//! identity already stored remotely.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace all identities are derived in.
pub const IDENTITY_NAMESPACE: Uuid = Uuid::NAMESPACE_DNS;

/// Rendering of an absent optional field inside the hashed tuple.
const ABSENT: &str = "None";

/// A stable identity derived from record content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Record kinds with a content-addressed identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    DocumentKey,
    SourceFile,
    FilePath,
    NonNumeric,
    NonFraction,
    Context,
    Header,
    LinkLoc,
    LinkArc,
    LabelValue,
    SchemaImport,
    SchemaLinkBaseRef,
    SchemaElement,
    QualitativeInstance,
    Qualitative,
}

impl EntityKind {
    /// The hashed tuple for this kind, in order.
    pub fn hashed_fields(&self) -> &'static [&'static str] {
        match self {
            Self::DocumentKey => &["file_name"],
            Self::SourceFile => &["name", "head_item_key_or_url"],
            Self::FilePath => &["head_item_key", "path"],
            Self::NonNumeric => &[
                "name",
                "context",
                "head_item_key",
                "value",
                "ixbrl_role",
                "source_file_id",
            ],
            Self::NonFraction => &[
                "name",
                "context",
                "head_item_key",
                "numeric",
                "ixbrl_role",
                "source_file_id",
            ],
            Self::Context => &["context_id", "head_item_key"],
            Self::Header => &[
                "company_name",
                "securities_code",
                "document_name",
                "head_item_key",
            ],
            Self::LinkLoc => &[
                "xlink_label",
                "xlink_schema",
                "xlink_type",
                "xlink_href",
                "source_file_id",
                "head_item_key",
                "attr_value",
            ],
            Self::LinkArc => &[
                "xlink_from",
                "xlink_to",
                "xlink_type",
                "xlink_arcrole",
                "source_file_id",
                "attr_value",
                "xlink_order",
                "xlink_weight",
                "head_item_key",
            ],
            Self::LabelValue => &[
                "xlink_label",
                "xlink_role",
                "source_file_id",
                "xlink_type",
                "xml_lang",
            ],
            Self::SchemaImport => &[
                "schema_location",
                "name_space",
                "xbrl_type",
                "head_item_key",
            ],
            Self::SchemaLinkBaseRef => &[
                "xlink_href",
                "xlink_role",
                "xbrl_type",
                "head_item_key",
            ],
            Self::SchemaElement => &["name", "source_file_id", "head_item_key"],
            Self::QualitativeInstance => &["source_file_id", "ordinal"],
            Self::Qualitative => &[
                "content",
                "head_item_key",
                "source_file_id",
                "current_id",
            ],
        }
    }
}

/// Derive the identity of a record from its hashed tuple.
///
/// Total and pure: the same `(kind, fields)` always yields the same identity.
/// `fields` must follow [`EntityKind::hashed_fields`] for `kind`.
pub fn derive_identity(kind: EntityKind, fields: &[Option<&str>]) -> Identity {
    debug_assert_eq!(
        fields.len(),
        kind.hashed_fields().len(),
        "hashed tuple arity for {kind:?}"
    );
    let joined = fields
        .iter()
        .map(|f| f.unwrap_or(ABSENT))
        .collect::<Vec<_>>()
        .join("_");
    Identity(Uuid::new_v5(&IDENTITY_NAMESPACE, joined.as_bytes()))
}

/// Derive an identity only when every required field is present and non-empty.
///
/// Records whose required fields are incomplete stay unidentified and must
/// not be persisted.
pub fn identify(
    kind: EntityKind,
    required: &[Option<&str>],
    fields: &[Option<&str>],
) -> Option<Identity> {
    if required.iter().any(|f| f.is_none_or(str::is_empty)) {
        return None;
    }
    Some(derive_identity(kind, fields))
}

/// Render a number the way it appears in a hashed tuple (`1.0`, `-1.0`, `0.5`).
pub fn number_field(value: Option<f64>) -> Option<String> {
    value.map(|v| format!("{v:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_identity(EntityKind::Context, &[Some("CurrentYearInstant"), Some("k")]);
        let b = derive_identity(EntityKind::Context, &[Some("CurrentYearInstant"), Some("k")]);
        assert_eq!(a, b);
    }

    #[test]
    fn derivation_matches_uuid_v5_over_joined_fields() {
        let id = derive_identity(EntityKind::DocumentKey, &[Some("81220241106512345.zip")]);
        let expected = Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"81220241106512345.zip");
        assert_eq!(id.as_uuid(), &expected);
    }

    #[test]
    fn field_order_is_significant() {
        let a = derive_identity(EntityKind::FilePath, &[Some("x"), Some("y")]);
        let b = derive_identity(EntityKind::FilePath, &[Some("y"), Some("x")]);
        assert_ne!(a, b);
    }

    #[test]
    fn absent_optional_field_renders_as_none() {
        let a = derive_identity(EntityKind::FilePath, &[Some("x"), None]);
        let b = derive_identity(EntityKind::FilePath, &[Some("x"), Some("None")]);
        assert_eq!(a, b);
    }

    #[test]
    fn missing_required_field_leaves_identity_unset() {
        assert!(identify(EntityKind::Context, &[Some("c"), None], &[Some("c"), None]).is_none());
        assert!(identify(EntityKind::Context, &[Some(""), Some("k")], &[Some(""), Some("k")]).is_none());
        assert!(identify(EntityKind::Context, &[Some("c"), Some("k")], &[Some("c"), Some("k")]).is_some());
    }

    #[test]
    fn numbers_render_in_shortest_form() {
        assert_eq!(number_field(Some(1.0)).as_deref(), Some("1.0"));
        assert_eq!(number_field(Some(-1.0)).as_deref(), Some("-1.0"));
        assert_eq!(number_field(Some(2.5)).as_deref(), Some("2.5"));
        assert_eq!(number_field(None), None);
    }

    #[test]
    fn identity_serializes_as_hyphenated_string() {
        let id = derive_identity(EntityKind::DocumentKey, &[Some("a.zip")]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
