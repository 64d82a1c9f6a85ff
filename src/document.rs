//! Document aggregation: all extractors of one archive, composed into one
//! ordered, typed item list.
//!
//! The document owns the unpacked archive, so the scratch directory lives
//! exactly as long as the document. Extractors only ever see the archive by
//! shared reference and keep nothing after they return.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use rayon::prelude::*;

use crate::archive::XbrlArchive;
use crate::extract::{
    ExtractError, ExtractResult, Extractor, FactExtractor, LinkbaseClass, LinkbaseExtractor,
    ManagerKind, QualitativeExtractor, SchemaExtractor,
};
use crate::identity::Identity;
use crate::markup::{TagWalker, XmlTagWalker};
use crate::model::{DocumentKey, FilePath, IxHeader, Item, ItemKind, Payload};

/// Builds [`Document`]s with a fixed set of extractors.
pub struct DocumentBuilder {
    extractors: Vec<Box<dyn Extractor>>,
}

impl DocumentBuilder {
    /// The standard extractor set, using `walker` for iXBRL facts.
    pub fn new(walker: Arc<dyn TagWalker>) -> Self {
        Self::with_extractors(vec![
            Box::new(FactExtractor::new(walker)),
            Box::new(LinkbaseExtractor::new(LinkbaseClass::Label)),
            Box::new(LinkbaseExtractor::new(LinkbaseClass::Calculation)),
            Box::new(LinkbaseExtractor::new(LinkbaseClass::Definition)),
            Box::new(LinkbaseExtractor::new(LinkbaseClass::Presentation)),
            Box::new(QualitativeExtractor),
            Box::new(SchemaExtractor),
        ])
    }

    pub fn with_extractors(extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors }
    }

    /// Run every extractor over `archive` and aggregate the results.
    ///
    /// Extractors run in parallel; aggregation waits for all of them.
    /// Managers with nothing to extract are left out. Any other extractor
    /// failure fails the document.
    pub fn build(&self, archive: XbrlArchive) -> ExtractResult<Document> {
        let mut results: Vec<(ManagerKind, ExtractResult<Vec<Item>>)> = self
            .extractors
            .par_iter()
            .map(|extractor| (extractor.kind(), extractor.extract(&archive)))
            .collect();
        results.sort_by_key(|(kind, _)| *kind);

        let mut managers = IndexMap::new();
        for (kind, result) in results {
            match result {
                Ok(mut items) => {
                    items.retain_mut(|item| item.payload.retain_identified());
                    items.sort_by_key(|item| item.sort_key);
                    match managers.entry(kind) {
                        Entry::Occupied(_) => {
                            return Err(ExtractError::DuplicateManager {
                                manager: kind.to_string(),
                            });
                        }
                        Entry::Vacant(slot) => {
                            slot.insert(items);
                        }
                    }
                }
                Err(e) if e.is_not_applicable() => {
                    tracing::debug!(manager = %kind, "manager not applicable");
                }
                Err(e) => return Err(e),
            }
        }
        if managers.is_empty() {
            return Err(ExtractError::NoApplicableManagers {
                archive: archive.archive_path().display().to_string(),
            });
        }
        detach_undeclared_linkbases(&mut managers);
        check_source_files(&managers)?;

        let file_path = Item::new(
            ItemKind::FilePath,
            0,
            Payload::FilePath(FilePath::new(
                archive.key(),
                archive.archive_path().display().to_string(),
            )),
        );
        Ok(Document {
            archive,
            file_path,
            managers,
        })
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(Arc::new(XmlTagWalker))
    }
}

fn declared_source_files(managers: &IndexMap<ManagerKind, Vec<Item>>) -> HashSet<Identity> {
    managers
        .values()
        .flatten()
        .flat_map(|item| item.payload.declared_source_files())
        .collect()
}

/// Clear schema references to packaged linkbases that produced no records.
///
/// Such a linkbase has no extractor output, so no source file is declared
/// for it. The reference keeps its href text.
fn detach_undeclared_linkbases(managers: &mut IndexMap<ManagerKind, Vec<Item>>) {
    let declared = declared_source_files(managers);
    for item in managers.values_mut().flatten() {
        let Payload::LinkBaseRefs(refs) = &mut item.payload else {
            continue;
        };
        for link in refs.iter_mut() {
            if link.href_source_file_id.is_some_and(|id| !declared.contains(&id)) {
                tracing::debug!(
                    href = link.xlink_href.as_deref().unwrap_or_default(),
                    "linkbase reference has no declared source file"
                );
                link.href_source_file_id = None;
            }
        }
    }
}

/// Every record's source file must be declared by some manager.
fn check_source_files(managers: &IndexMap<ManagerKind, Vec<Item>>) -> ExtractResult<()> {
    let declared = declared_source_files(managers);
    for item in managers.values().flatten() {
        if let Some(orphan) = item
            .payload
            .source_file_refs()
            .into_iter()
            .find(|id| !declared.contains(id))
        {
            return Err(ExtractError::OrphanedSourceFile {
                kind: item.kind.to_string(),
                source_file_id: orphan,
            });
        }
    }
    Ok(())
}

/// One aggregated disclosure document.
#[derive(Debug)]
pub struct Document {
    archive: XbrlArchive,
    file_path: Item,
    managers: IndexMap<ManagerKind, Vec<Item>>,
}

impl Document {
    pub fn key(&self) -> DocumentKey {
        self.archive.key()
    }

    pub fn archive(&self) -> &XbrlArchive {
        &self.archive
    }

    /// Managers that produced records, in declaration order.
    pub fn managers(&self) -> impl Iterator<Item = (ManagerKind, &[Item])> {
        self.managers.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn header(&self) -> Option<&IxHeader> {
        self.managers.values().flatten().find_map(|item| match &item.payload {
            Payload::Header(header) => Some(header.as_ref()),
            _ => None,
        })
    }

    /// The file-path record followed by every manager's items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        std::iter::once(&self.file_path).chain(self.managers.values().flatten())
    }

    /// Take the item list, releasing the unpacked archive.
    pub fn into_items(self) -> Vec<Item> {
        let Self {
            archive,
            file_path,
            managers,
        } = self;
        drop(archive);
        std::iter::once(file_path)
            .chain(managers.into_values().flatten())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::write_test_zip;
    use crate::identity::{EntityKind, derive_identity};
    use crate::model::{IxNonNumeric, SourceFile};

    const SUMMARY: &str = r#"<html><body>
<ix:nonNumeric name="tse-ed-t:DocumentName" contextRef="CurrentYearInstant">決算短信</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:CompanyName" contextRef="CurrentYearInstant">Acme</ix:nonNumeric>
</body></html>"#;

    const CAL: &str = r#"<link:linkbase>
  <link:calculationLink xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:type="locator" xlink:href="a.xsd#a_X" xlink:label="X"/>
  </link:calculationLink>
</link:linkbase>"#;

    const XSD: &str = r#"<xsd:schema><xsd:element name="X" id="a_X" type="xbrli:monetaryItemType"/></xsd:schema>"#;

    fn open(dir: &tempfile::TempDir, entries: &[(&str, &str)]) -> XbrlArchive {
        let path = dir.path().join("81220241106500001.zip");
        write_test_zip(&path, entries);
        XbrlArchive::open(&path, Some(&dir.path().join("scratch"))).unwrap()
    }

    fn full_entries() -> Vec<(&'static str, &'static str)> {
        vec![
            ("XBRLData/Summary/tse-acedjpsm-72030-ixbrl.htm", SUMMARY),
            ("XBRLData/Attachment/0101010-acbs01-tse-acedjpfr-72030-ixbrl.htm", "<html/>"),
            ("XBRLData/Attachment/tse-acedjpfr-72030_cal.xml", CAL),
            ("XBRLData/Attachment/tse-acedjpfr-72030.xsd", XSD),
        ]
    }

    #[test]
    fn managers_follow_declaration_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let doc = DocumentBuilder::default().build(open(&dir, &full_entries())).unwrap();
        let kinds: Vec<ManagerKind> = doc.managers().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![ManagerKind::Ix, ManagerKind::Cal, ManagerKind::Schema]);

        let items: Vec<&Item> = doc.items().collect();
        assert_eq!(items[0].kind, ItemKind::FilePath);
        assert_eq!(items[1].kind, ItemKind::HeadTitle);
        assert_eq!(items.last().map(|i| i.kind), Some(ItemKind::SchemaElements));
        assert_eq!(
            doc.header().and_then(|h| h.company_name.as_deref()),
            Some("Acme")
        );
    }

    #[test]
    fn scratch_directory_released_with_items() {
        let dir = tempfile::TempDir::new().unwrap();
        let doc = DocumentBuilder::default().build(open(&dir, &full_entries())).unwrap();
        let working_dir = doc.archive().working_dir().to_path_buf();
        let items = doc.into_items();
        assert!(!items.is_empty());
        assert!(!working_dir.exists());
    }

    #[test]
    fn failed_build_still_cleans_up() {
        let dir = tempfile::TempDir::new().unwrap();
        let archive = open(
            &dir,
            &[
                ("tse-acedjpsm-72030-ixbrl.htm", "<html/>"),
                ("0101010-acbs01-tse-acedjpfr-72030-ixbrl.htm", "<html/>"),
            ],
        );
        let working_dir = archive.working_dir().to_path_buf();
        let err = DocumentBuilder::default().build(archive).unwrap_err();
        assert!(matches!(err, ExtractError::DocumentNameNotFound { .. }));
        assert!(!working_dir.exists());
    }

    struct Orphaned;

    impl Extractor for Orphaned {
        fn kind(&self) -> ManagerKind {
            ManagerKind::Qualitative
        }

        fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>> {
            let stray = derive_identity(EntityKind::SourceFile, &[Some("nowhere"), None]);
            let fact = IxNonNumeric {
                item_key: None,
                head_item_key: archive.key(),
                context: "c".into(),
                name: "n".into(),
                xsi_nil: false,
                escape: false,
                format: None,
                value: Some("v".into()),
                report_type: None,
                ixbrl_role: None,
                source_file_id: stray,
            }
            .identified();
            Ok(vec![Item::new(
                ItemKind::NonNumeric,
                1,
                Payload::NonNumeric(vec![fact]),
            )])
        }
    }

    #[test]
    fn orphaned_source_reference_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let builder = DocumentBuilder::with_extractors(vec![Box::new(Orphaned)]);
        let err = builder.build(open(&dir, &full_entries())).unwrap_err();
        assert!(matches!(err, ExtractError::OrphanedSourceFile { .. }));
    }

    const SUMMARY_WITH_STRAY: &str = r#"<html><body>
<ix:nonNumeric name="tse-ed-t:DocumentName" contextRef="CurrentYearInstant">決算短信</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:Remark">no context</ix:nonNumeric>
<ix:nonNumeric name="tse-ed-t:CompanyName" contextRef="CurrentYearInstant">Acme</ix:nonNumeric>
</body></html>"#;

    const CAL_WITH_STRAY: &str = r##"<link:linkbase>
  <link:calculationLink xlink:role="http://www.xbrl.org/2003/role/link">
    <link:loc xlink:type="locator" xlink:href="a.xsd#a_X" xlink:label="X"/>
    <link:loc xlink:type="locator" xlink:href="#a_Dangling" xlink:label="Dangling"/>
    <link:loc xlink:type="locator" xlink:href="a.xsd#a_Y" xlink:label="Y"/>
  </link:calculationLink>
</link:linkbase>"##;

    #[test]
    fn unidentified_records_are_dropped_in_place() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut entries = full_entries();
        entries[0].1 = SUMMARY_WITH_STRAY;
        entries[2].1 = CAL_WITH_STRAY;
        let items = DocumentBuilder::default()
            .build(open(&dir, &entries))
            .unwrap()
            .into_items();

        let facts: Vec<&str> = items
            .iter()
            .filter_map(|item| match &item.payload {
                Payload::NonNumeric(v) => Some(v),
                _ => None,
            })
            .flatten()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(facts, vec!["tse-ed-t:DocumentName", "tse-ed-t:CompanyName"]);

        let labels: Vec<&str> = items
            .iter()
            .filter_map(|item| match &item.payload {
                Payload::Locs(v) => Some(v),
                _ => None,
            })
            .flatten()
            .filter_map(|loc| loc.xlink_label.as_deref())
            .collect();
        assert_eq!(labels, vec!["X", "Y"]);
    }

    const XSD_WITH_REFS: &str = r#"<xsd:schema>
  <xsd:annotation><xsd:appinfo>
    <link:linkbaseRef xlink:type="simple" xlink:href="tse-acedjpfr-72030_cal.xml" xlink:role="http://www.xbrl.org/2003/role/calculationLinkbaseRef"/>
    <link:linkbaseRef xlink:type="simple" xlink:href="tse-acedjpfr-72030_def.xml" xlink:role="http://www.xbrl.org/2003/role/definitionLinkbaseRef"/>
  </xsd:appinfo></xsd:annotation>
  <xsd:element name="X" id="a_X" type="xbrli:monetaryItemType"/>
</xsd:schema>"#;

    #[test]
    fn reference_to_empty_linkbase_is_detached() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut entries = full_entries();
        entries[3].1 = XSD_WITH_REFS;
        entries.push(("XBRLData/Attachment/tse-acedjpfr-72030_def.xml", "<link:linkbase/>"));
        let doc = DocumentBuilder::default().build(open(&dir, &entries)).unwrap();
        let key = doc.key();

        let kinds: Vec<ManagerKind> = doc.managers().map(|(k, _)| k).collect();
        assert!(!kinds.contains(&ManagerKind::Def));

        let declared: HashSet<Identity> = doc
            .items()
            .flat_map(|item| item.payload.declared_source_files())
            .collect();
        let refs: Vec<_> = doc
            .items()
            .filter_map(|item| match &item.payload {
                Payload::LinkBaseRefs(v) => Some(v),
                _ => None,
            })
            .flatten()
            .map(|r| (r.xlink_href.clone(), r.href_source_file_id))
            .collect();
        assert_eq!(
            refs,
            vec![
                (
                    Some("tse-acedjpfr-72030_cal.xml".to_string()),
                    Some(SourceFile::identity_for("tse-acedjpfr-72030_cal.xml", key))
                ),
                (Some("tse-acedjpfr-72030_def.xml".to_string()), None),
            ]
        );
        for item in doc.items() {
            assert!(
                item.payload
                    .source_file_refs()
                    .iter()
                    .all(|id| declared.contains(id)),
                "{} references an undeclared source file",
                item.kind
            );
        }
    }

    struct Stub(ManagerKind);

    impl Extractor for Stub {
        fn kind(&self) -> ManagerKind {
            self.0
        }

        fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>> {
            let files = vec![SourceFile::packaged("stub.htm", "qualitative", archive.key())];
            Ok(vec![Item::new(
                ItemKind::QualitativeSourceFile,
                1,
                Payload::SourceFiles(files),
            )])
        }
    }

    #[test]
    fn duplicate_manager_kind_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let builder = DocumentBuilder::with_extractors(vec![
            Box::new(Stub(ManagerKind::Qualitative)),
            Box::new(Stub(ManagerKind::Qualitative)),
        ]);
        let err = builder.build(open(&dir, &full_entries())).unwrap_err();
        assert!(matches!(err, ExtractError::DuplicateManager { .. }));
    }

    struct Nothing(ManagerKind);

    impl Extractor for Nothing {
        fn kind(&self) -> ManagerKind {
            self.0
        }

        fn extract(&self, _: &XbrlArchive) -> ExtractResult<Vec<Item>> {
            Err(self.0.not_applicable())
        }
    }

    #[test]
    fn all_managers_empty_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let builder = DocumentBuilder::with_extractors(vec![
            Box::new(Nothing(ManagerKind::Lab)),
            Box::new(Nothing(ManagerKind::Schema)),
        ]);
        let err = builder.build(open(&dir, &full_entries())).unwrap_err();
        assert!(matches!(err, ExtractError::NoApplicableManagers { .. }));
    }
}
