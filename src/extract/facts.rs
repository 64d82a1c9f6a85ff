//! Fact extraction from the iXBRL documents of a package.
//!
//! Every disclosure file is parsed once; the walker is then asked for each
//! fact kind per file. Non-numeric facts are computed at most once per
//! document because both the item list and the header read them.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::archive::{ReportCategory, XbrlArchive};
use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{
    Extractor, ItemList, ManagerKind, document_role, file_name, header, read_markup,
};
use crate::identity::Identity;
use crate::markup::{Element, FactKind, TagWalker, XmlTagWalker};
use crate::model::{
    DocumentKey, IxContext, IxHeader, IxNonFraction, IxNonNumeric, Item, ItemKind, Payload,
    ScenarioMember, SourceFile,
};

/// One parsed iXBRL file.
#[derive(Debug, Clone)]
pub struct IxFile {
    pub source: SourceFile,
    pub source_id: Identity,
    /// `summary`, or the statement role from the file name.
    pub role: String,
    pub root: Element,
}

impl IxFile {
    pub fn new(file_name: &str, root: Element, key: DocumentKey) -> Self {
        let source = SourceFile::packaged(file_name, ManagerKind::Ix.as_str(), key);
        Self {
            source_id: SourceFile::identity_for(file_name, key),
            role: document_role(file_name),
            source,
            root,
        }
    }

    pub fn load(path: &Path, key: DocumentKey) -> ExtractResult<Self> {
        let root = read_markup(path)?;
        Ok(Self::new(&file_name(path), root, key))
    }
}

fn flag(value: Option<&str>) -> bool {
    matches!(value, Some("true") | Some("1"))
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

/// Normalise a displayed number: drop separators, apply the sign.
///
/// `None` when the text is not a number under its format.
pub fn normalize_numeric(
    display: &str,
    format: Option<&str>,
    sign: Option<&str>,
) -> Option<String> {
    let format = format.unwrap_or_default();
    let format = format.rsplit_once(':').map_or(format, |(_, local)| local);
    let text = display.trim();
    let separators = |c: &char| matches!(c, ' ' | '\u{a0}');

    let mut digits: String = if format.contains("zerodash") || format.contains("fixed-zero") {
        "0".to_string()
    } else if format.contains("numcommadecimal") || format.contains("num-comma-decimal") {
        text.chars()
            .filter(|c| *c != '.' && !separators(c))
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        text.chars().filter(|c| *c != ',' && !separators(c)).collect()
    };

    if !digits.parse::<f64>().is_ok_and(f64::is_finite) {
        return None;
    }
    if sign == Some("-") && digits != "0" {
        digits.insert(0, '-');
    }
    Some(digits)
}

/// The iXBRL files of one document and the facts read from them.
pub struct IxDocumentSet<'w> {
    archive: String,
    key: DocumentKey,
    report_type: ReportCategory,
    files: Vec<IxFile>,
    walker: &'w dyn TagWalker,
    non_numerics: OnceLock<Vec<Vec<IxNonNumeric>>>,
}

impl<'w> IxDocumentSet<'w> {
    pub fn new(
        archive: impl Into<String>,
        key: DocumentKey,
        report_type: ReportCategory,
        files: Vec<IxFile>,
        walker: &'w dyn TagWalker,
    ) -> Self {
        Self {
            archive: archive.into(),
            key,
            report_type,
            files,
            walker,
            non_numerics: OnceLock::new(),
        }
    }

    /// Parse the disclosure files of `archive`.
    pub fn load(archive: &XbrlArchive, walker: &'w dyn TagWalker) -> ExtractResult<Self> {
        if archive.summary_files().is_empty() {
            return Err(ManagerKind::Ix.not_applicable());
        }
        let key = archive.key();
        let files = archive
            .summary_files()
            .iter()
            .map(|path| IxFile::load(path, key))
            .collect::<ExtractResult<Vec<_>>>()?;
        Ok(Self::new(
            archive.archive_path().display().to_string(),
            key,
            archive.category(),
            files,
            walker,
        ))
    }

    pub fn files(&self) -> &[IxFile] {
        &self.files
    }

    pub fn source_files(&self) -> Vec<SourceFile> {
        self.files.iter().map(|f| f.source.clone()).collect()
    }

    /// Non-numeric facts grouped per file, computed on first use.
    pub fn non_numerics_by_file(&self) -> &[Vec<IxNonNumeric>] {
        self.non_numerics.get_or_init(|| {
            self.files
                .iter()
                .map(|file| {
                    self.walker
                        .walk(&file.root, FactKind::NonNumeric)
                        .into_iter()
                        .map(|e| self.non_numeric(file, e))
                        .collect()
                })
                .collect()
        })
    }

    /// All non-numeric facts in emission order.
    pub fn non_numerics(&self) -> impl Iterator<Item = &IxNonNumeric> {
        self.non_numerics_by_file().iter().flatten()
    }

    pub fn non_fractions_by_file(&self) -> Vec<Vec<IxNonFraction>> {
        self.files
            .iter()
            .map(|file| {
                self.walker
                    .walk(&file.root, FactKind::NonFraction)
                    .into_iter()
                    .map(|e| self.non_fraction(file, e))
                    .collect()
            })
            .collect()
    }

    pub fn contexts_by_file(&self) -> Vec<Vec<IxContext>> {
        self.files
            .iter()
            .map(|file| {
                self.walker
                    .walk(&file.root, FactKind::Context)
                    .into_iter()
                    .map(|e| self.context(file, e))
                    .collect()
            })
            .collect()
    }

    /// Synthesise the header; fails when no document name is disclosed.
    pub fn header(&self, non_fractions: &[IxNonFraction]) -> ExtractResult<IxHeader> {
        let header = header::synthesize(self.key, self.non_numerics(), non_fractions);
        if header.document_name.as_deref().is_none_or(str::is_empty) {
            return Err(ExtractError::DocumentNameNotFound {
                archive: self.archive.clone(),
            });
        }
        Ok(header)
    }

    fn non_numeric(&self, file: &IxFile, e: &Element) -> IxNonNumeric {
        let xsi_nil = flag(e.attr_local("nil"));
        IxNonNumeric {
            item_key: None,
            head_item_key: self.key,
            context: e.attr("contextRef").unwrap_or_default().to_string(),
            name: e.attr("name").unwrap_or_default().to_string(),
            xsi_nil,
            escape: flag(e.attr("escape")),
            format: owned(e.attr("format")),
            value: (!xsi_nil).then(|| e.text().trim().to_string()),
            report_type: Some(self.report_type.as_str().to_string()),
            ixbrl_role: Some(file.role.clone()),
            source_file_id: file.source_id,
        }
        .identified()
    }

    fn non_fraction(&self, file: &IxFile, e: &Element) -> IxNonFraction {
        let xsi_nil = flag(e.attr_local("nil"));
        let display = e.text().trim().to_string();
        let numeric = if xsi_nil {
            None
        } else {
            normalize_numeric(&display, e.attr("format"), e.attr("sign"))
        };
        IxNonFraction {
            item_key: None,
            head_item_key: self.key,
            context: e.attr("contextRef").unwrap_or_default().to_string(),
            name: e.attr("name").unwrap_or_default().to_string(),
            unit_ref: owned(e.attr("unitRef")),
            xsi_nil,
            decimals: owned(e.attr("decimals")),
            format: owned(e.attr("format")),
            scale: owned(e.attr("scale")),
            sign: owned(e.attr("sign")),
            numeric,
            display_numeric: (!display.is_empty()).then_some(display),
            report_type: Some(self.report_type.as_str().to_string()),
            ixbrl_role: Some(file.role.clone()),
            source_file_id: file.source_id,
        }
        .identified()
    }

    fn context(&self, file: &IxFile, e: &Element) -> IxContext {
        let period: BTreeMap<String, String> = e
            .find_all("period")
            .first()
            .map(|p| {
                p.child_elements()
                    .map(|c| (c.local_name().to_string(), c.text().trim().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        let scenario: Vec<ScenarioMember> = e
            .find_all("explicitMember")
            .into_iter()
            .map(|m| ScenarioMember {
                dimension: m.attr("dimension").unwrap_or_default().to_string(),
                member: m.text().trim().to_string(),
            })
            .collect();
        IxContext {
            item_key: None,
            head_item_key: self.key,
            context_id: e.attr("id").unwrap_or_default().to_string(),
            period,
            scenario,
            source_file_id: file.source_id,
        }
        .identified()
    }
}

/// Extracts facts, contexts and the header from the disclosure files.
pub struct FactExtractor {
    walker: Arc<dyn TagWalker>,
}

impl FactExtractor {
    pub fn new(walker: Arc<dyn TagWalker>) -> Self {
        Self { walker }
    }
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new(Arc::new(XmlTagWalker))
    }
}

impl Extractor for FactExtractor {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Ix
    }

    fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>> {
        let set = IxDocumentSet::load(archive, self.walker.as_ref())?;
        items_for(&set)
    }
}

/// Item list of a loaded document set: header, source files, numeric
/// facts, non-numeric facts, contexts.
pub fn items_for(set: &IxDocumentSet<'_>) -> ExtractResult<Vec<Item>> {
    let non_fractions = set.non_fractions_by_file();
    let header = set.header(&non_fractions.concat())?;

    let mut items = ItemList::new();
    items.push_header(Payload::Header(Box::new(header)));
    items.push(ItemKind::IxSourceFile, Payload::SourceFiles(set.source_files()));
    for facts in non_fractions {
        items.push(ItemKind::NonFraction, Payload::NonFraction(facts));
    }
    for facts in set.non_numerics_by_file() {
        items.push(ItemKind::NonNumeric, Payload::NonNumeric(facts.clone()));
    }
    for contexts in set.contexts_by_file() {
        items.push(ItemKind::Context, Payload::Contexts(contexts));
    }

    tracing::debug!(files = set.files().len(), "ix facts extracted");
    Ok(items.into_sorted())
}
