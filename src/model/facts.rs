//! Fact, context and header records read from iXBRL documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::{EntityKind, Identity, identify};
use crate::model::{DocumentKey, Identified, non_empty};

/// A tagged non-numeric disclosure value (`ix:nonNumeric`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IxNonNumeric {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub context: String,
    pub name: String,
    pub xsi_nil: bool,
    pub escape: bool,
    pub format: Option<String>,
    pub value: Option<String>,
    pub report_type: Option<String>,
    pub ixbrl_role: Option<String>,
    pub source_file_id: Identity,
}

impl IxNonNumeric {
    /// Compute `item_key` from the semantic fields.
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let source = self.source_file_id.to_string();
        let name = non_empty(&self.name);
        let context = non_empty(&self.context);
        self.item_key = identify(
            EntityKind::NonNumeric,
            &[name, context],
            &[
                name,
                context,
                Some(&head),
                self.value.as_deref(),
                self.ixbrl_role.as_deref(),
                Some(&source),
            ],
        );
        self
    }

    /// Whether the fact carries a true boolean, by format or by value.
    pub fn is_true(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.ends_with("booleantrue"))
            || self.value.as_deref() == Some("true")
    }
}

impl Identified for IxNonNumeric {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// A tagged numeric disclosure value (`ix:nonFraction`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IxNonFraction {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub context: String,
    pub name: String,
    pub unit_ref: Option<String>,
    pub xsi_nil: bool,
    pub decimals: Option<String>,
    pub format: Option<String>,
    pub scale: Option<String>,
    pub sign: Option<String>,
    /// Normalised value: separators removed, sign applied.
    pub numeric: Option<String>,
    /// The value as displayed in the document.
    pub display_numeric: Option<String>,
    pub report_type: Option<String>,
    pub ixbrl_role: Option<String>,
    pub source_file_id: Identity,
}

impl IxNonFraction {
    /// Compute `item_key` from the semantic fields.
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let source = self.source_file_id.to_string();
        let name = non_empty(&self.name);
        let context = non_empty(&self.context);
        self.item_key = identify(
            EntityKind::NonFraction,
            &[name, context],
            &[
                name,
                context,
                Some(&head),
                self.numeric.as_deref(),
                self.ixbrl_role.as_deref(),
                Some(&source),
            ],
        );
        self
    }

    /// The normalised value as a number, `None` when nil or unparsable.
    pub fn value(&self) -> Option<f64> {
        if self.xsi_nil {
            return None;
        }
        self.numeric.as_deref()?.parse().ok()
    }
}

impl Identified for IxNonFraction {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// One explicit dimension member of a context scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMember {
    pub dimension: String,
    pub member: String,
}

/// A reporting context (`xbrli:context`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IxContext {
    pub item_key: Option<Identity>,
    pub head_item_key: DocumentKey,
    pub context_id: String,
    /// `startDate` / `endDate` / `instant` by local name.
    pub period: BTreeMap<String, String>,
    pub scenario: Vec<ScenarioMember>,
    pub source_file_id: Identity,
}

impl IxContext {
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.to_string();
        let id = non_empty(&self.context_id);
        self.item_key = identify(EntityKind::Context, &[id], &[id, Some(&head)]);
        self
    }
}

impl Identified for IxContext {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }

    fn source_file_ref(&self) -> Option<Identity> {
        Some(self.source_file_id)
    }
}

/// Per-document summary synthesised from the non-numeric facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IxHeader {
    pub item_key: Option<Identity>,
    pub head_item_key: Option<DocumentKey>,
    pub company_name: Option<String>,
    pub securities_code: Option<String>,
    pub document_name: Option<String>,
    pub reporting_date: Option<String>,
    pub current_period: Option<String>,
    pub report_type: Option<String>,
    pub listed_market: Option<String>,
    pub market_section: Option<String>,
    pub url: Option<String>,
    pub is_bs: bool,
    pub is_pl: bool,
    pub is_cf: bool,
    pub is_ci: bool,
    pub is_sce: bool,
    pub is_sfp: bool,
    pub fy_year_end: Option<String>,
    pub tel: Option<String>,
    pub specific_business: Option<bool>,
    pub dividend_revision: Option<bool>,
    pub forecast_revision: Option<bool>,
    pub dividend_increase_rate: Option<String>,
    pub forecast_ordinary_income_growth_rate: Option<String>,
}

impl IxHeader {
    /// Compute `item_key`; requires the document key and document name.
    pub fn identified(mut self) -> Self {
        let head = self.head_item_key.map(|k| k.to_string());
        self.item_key = identify(
            EntityKind::Header,
            &[head.as_deref(), self.document_name.as_deref()],
            &[
                self.company_name.as_deref(),
                self.securities_code.as_deref(),
                self.document_name.as_deref(),
                head.as_deref(),
            ],
        );
        self
    }
}

impl Identified for IxHeader {
    fn identity(&self) -> Option<Identity> {
        self.item_key
    }
}
