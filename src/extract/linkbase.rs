//! Label, calculation, definition and presentation linkbase extractors.
//!
//! The four linkbase classes share one shape: extended links holding
//! locators and arcs, plus label resources in the label linkbase. One
//! generic extractor is parameterised by [`LinkbaseClass`].

use std::path::Path;

use crate::archive::XbrlArchive;
use crate::extract::error::ExtractResult;
use crate::extract::{Extractor, ItemList, ManagerKind, read_markup, source_file};
use crate::identity::Identity;
use crate::markup::Element;
use crate::model::{
    DocumentKey, Item, ItemKind, LabelValue, LinkArc, LinkLoc, Payload, SourceFile,
};

/// Linkbase flavours with their markup names and item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkbaseClass {
    Label,
    Calculation,
    Definition,
    Presentation,
}

impl LinkbaseClass {
    pub fn manager(&self) -> ManagerKind {
        match self {
            Self::Label => ManagerKind::Lab,
            Self::Calculation => ManagerKind::Cal,
            Self::Definition => ManagerKind::Def,
            Self::Presentation => ManagerKind::Pre,
        }
    }

    /// Local name of the extended link element.
    pub fn link_name(&self) -> &'static str {
        match self {
            Self::Label => "labelLink",
            Self::Calculation => "calculationLink",
            Self::Definition => "definitionLink",
            Self::Presentation => "presentationLink",
        }
    }

    /// Local name of the arc element.
    pub fn arc_name(&self) -> &'static str {
        match self {
            Self::Label => "labelArc",
            Self::Calculation => "calculationArc",
            Self::Definition => "definitionArc",
            Self::Presentation => "presentationArc",
        }
    }

    fn loc_kind(&self) -> ItemKind {
        match self {
            Self::Label => ItemKind::LabLocs,
            Self::Calculation => ItemKind::CalLocs,
            Self::Definition => ItemKind::DefLocs,
            Self::Presentation => ItemKind::PreLocs,
        }
    }

    fn arc_kind(&self) -> ItemKind {
        match self {
            Self::Label => ItemKind::LabArcs,
            Self::Calculation => ItemKind::CalArcs,
            Self::Definition => ItemKind::DefArcs,
            Self::Presentation => ItemKind::PreArcs,
        }
    }

    /// Whether a file name belongs to this class (`*_cal.xml`, `*-lab-en.xml`, ...).
    pub fn matches_file(&self, file_name: &str) -> bool {
        let Some(stem) = file_name.strip_suffix(".xml") else {
            return false;
        };
        let tag = self.manager().as_str();
        let stem = match self {
            Self::Label => stem.strip_suffix("-en").unwrap_or(stem),
            _ => stem,
        };
        stem.strip_suffix(tag)
            .is_some_and(|rest| rest.ends_with('_') || rest.ends_with('-'))
    }
}

/// Split `schema.xsd#fragment` into its schema and fragment parts.
pub fn split_href(href: &str) -> (Option<String>, Option<String>) {
    match href.split_once('#') {
        Some((schema, fragment)) => (
            (!schema.is_empty()).then(|| schema.to_string()),
            (!fragment.is_empty()).then(|| fragment.to_string()),
        ),
        None => ((!href.is_empty()).then(|| href.to_string()), None),
    }
}

fn attr(e: &Element, local: &str) -> Option<String> {
    e.attr_local(local).map(str::to_string)
}

fn number(e: &Element, local: &str) -> Option<f64> {
    e.attr_local(local).and_then(|v| v.trim().parse().ok())
}

/// Records of one linkbase file.
#[derive(Debug, Default)]
pub struct LinkbaseRecords {
    pub locs: Vec<LinkLoc>,
    pub arcs: Vec<LinkArc>,
    pub values: Vec<LabelValue>,
}

impl LinkbaseRecords {
    pub fn is_empty(&self) -> bool {
        self.locs.is_empty() && self.arcs.is_empty() && self.values.is_empty()
    }
}

/// Read every extended link of `class` in a parsed linkbase.
pub fn read_linkbase(
    class: LinkbaseClass,
    root: &Element,
    key: DocumentKey,
    source_file_id: Identity,
) -> LinkbaseRecords {
    let mut records = LinkbaseRecords::default();
    for link in root.find_all(class.link_name()) {
        let role = attr(link, "role");
        for loc in link.find_all("loc") {
            let (schema, href) = loc
                .attr_local("href")
                .map(split_href)
                .unwrap_or((None, None));
            records.locs.push(
                LinkLoc {
                    item_key: None,
                    head_item_key: key,
                    attr_value: role.clone(),
                    xlink_type: attr(loc, "type"),
                    xlink_schema: schema,
                    xlink_href: href,
                    xlink_label: attr(loc, "label"),
                    source_file_id,
                }
                .identified(),
            );
        }
        for arc in link.find_all(class.arc_name()) {
            records.arcs.push(
                LinkArc {
                    item_key: None,
                    head_item_key: key,
                    attr_value: role.clone(),
                    xlink_type: attr(arc, "type"),
                    xlink_from: attr(arc, "from"),
                    xlink_to: attr(arc, "to"),
                    xlink_arcrole: attr(arc, "arcrole"),
                    xlink_order: number(arc, "order"),
                    xlink_weight: match class {
                        LinkbaseClass::Calculation => number(arc, "weight"),
                        _ => None,
                    },
                    source_file_id,
                }
                .identified(),
            );
        }
        if class == LinkbaseClass::Label {
            for label in link.find_all("label") {
                records.values.push(
                    LabelValue {
                        item_key: None,
                        head_item_key: key,
                        xlink_type: attr(label, "type"),
                        xlink_label: attr(label, "label"),
                        xlink_role: attr(label, "role"),
                        xml_lang: attr(label, "lang"),
                        label: Some(label.text().trim().to_string()),
                        source_file_id,
                    }
                    .identified(),
                );
            }
        }
    }
    records
}

/// Extractor for one linkbase class.
#[derive(Debug, Clone, Copy)]
pub struct LinkbaseExtractor {
    class: LinkbaseClass,
}

impl LinkbaseExtractor {
    pub fn new(class: LinkbaseClass) -> Self {
        Self { class }
    }

    fn read_file(
        &self,
        path: &Path,
        key: DocumentKey,
    ) -> ExtractResult<(SourceFile, LinkbaseRecords)> {
        let root = read_markup(path)?;
        let source = source_file(path, self.class.manager(), key);
        let source_id = SourceFile::identity_for(&source.name, key);
        Ok((source, read_linkbase(self.class, &root, key, source_id)))
    }
}

impl Extractor for LinkbaseExtractor {
    fn kind(&self) -> ManagerKind {
        self.class.manager()
    }

    fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>> {
        let paths = archive.files_matching(|name| self.class.matches_file(name));
        if paths.is_empty() {
            return Err(self.kind().not_applicable());
        }
        let key = archive.key();
        let files = paths
            .iter()
            .map(|path| self.read_file(path, key))
            .collect::<ExtractResult<Vec<_>>>()?;
        if files.iter().all(|(_, records)| records.is_empty()) {
            return Err(self.kind().not_applicable());
        }

        let mut items = ItemList::new();
        let sources = files.iter().map(|(source, _)| source.clone()).collect();
        items.push(self.kind().source_file_kind(), Payload::SourceFiles(sources));
        for (_, records) in files {
            items.push(self.class.loc_kind(), Payload::Locs(records.locs));
            items.push(self.class.arc_kind(), Payload::Arcs(records.arcs));
            items.push(ItemKind::LabValues, Payload::LabelValues(records.values));
        }
        tracing::debug!(manager = %self.kind(), files = paths.len(), "linkbase extracted");
        Ok(items.into_sorted())
    }
}
