//! Taxonomy schema extractor: imports, linkbase references, element definitions.

use std::collections::BTreeSet;
use std::path::Path;

use crate::archive::XbrlArchive;
use crate::extract::error::ExtractResult;
use crate::extract::{Extractor, ItemList, ManagerKind, file_name, read_markup, source_file};
use crate::identity::Identity;
use crate::markup::Element;
use crate::model::{
    DocumentKey, Item, ItemKind, Payload, SchemaElement, SchemaImport, SchemaLinkBaseRef,
    SourceFile,
};

/// Records of one schema file.
#[derive(Debug, Default)]
pub struct SchemaRecords {
    pub imports: Vec<SchemaImport>,
    pub linkbase_refs: Vec<SchemaLinkBaseRef>,
    pub elements: Vec<SchemaElement>,
}

impl SchemaRecords {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.linkbase_refs.is_empty() && self.elements.is_empty()
    }
}

fn attr(e: &Element, local: &str) -> Option<String> {
    e.attr_local(local).map(str::to_string)
}

/// Last path segment of an href, without any fragment.
fn href_file_name(href: &str) -> &str {
    let path = href.split('#').next().unwrap_or(href);
    path.rsplit('/').next().unwrap_or(path)
}

/// Context shared by the records of one schema file.
pub struct SchemaContext<'a> {
    pub key: DocumentKey,
    pub source_file_id: Identity,
    /// Report category, recorded as `xbrl_type`.
    pub xbrl_type: &'a str,
    /// Names of all files unpacked from the archive.
    pub packaged: &'a BTreeSet<String>,
}

/// Read the imports, linkbase references and elements of a parsed schema.
pub fn read_schema(root: &Element, cx: &SchemaContext<'_>) -> SchemaRecords {
    let xbrl_type = Some(cx.xbrl_type.to_string());
    let imports = root
        .find_all("import")
        .into_iter()
        .map(|e| {
            SchemaImport {
                item_key: None,
                head_item_key: cx.key,
                schema_location: attr(e, "schemaLocation"),
                name_space: attr(e, "namespace"),
                xbrl_type: xbrl_type.clone(),
                source_file_id: cx.source_file_id,
            }
            .identified()
        })
        .collect();

    let linkbase_refs = root
        .find_all("linkbaseRef")
        .into_iter()
        .map(|e| {
            let href = attr(e, "href");
            let href_source_file_id = href
                .as_deref()
                .map(href_file_name)
                .filter(|name| cx.packaged.contains(*name))
                .map(|name| SourceFile::identity_for(name, cx.key));
            SchemaLinkBaseRef {
                item_key: None,
                head_item_key: cx.key,
                xlink_type: attr(e, "type"),
                xlink_href: href,
                xlink_role: attr(e, "role"),
                xlink_arcrole: attr(e, "arcrole"),
                xbrl_type: xbrl_type.clone(),
                source_file_id: cx.source_file_id,
                href_source_file_id,
            }
            .identified()
        })
        .collect();

    let elements = root
        .find_all("element")
        .into_iter()
        .filter(|e| e.attr("name").is_some())
        .map(|e| {
            SchemaElement {
                item_key: None,
                head_item_key: cx.key,
                element_id: attr(e, "id"),
                xbrli_balance: attr(e, "balance"),
                xbrli_period_type: attr(e, "periodType"),
                name: attr(e, "name"),
                nillable: attr(e, "nillable"),
                substitution_group: attr(e, "substitutionGroup"),
                element_type: attr(e, "type"),
                is_abstract: attr(e, "abstract"),
                xbrl_type: xbrl_type.clone(),
                source_file_id: cx.source_file_id,
            }
            .identified()
        })
        .collect();

    SchemaRecords {
        imports,
        linkbase_refs,
        elements,
    }
}

/// Extractor for the `*.xsd` files of a package.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaExtractor;

impl SchemaExtractor {
    fn read_file(
        &self,
        path: &Path,
        archive: &XbrlArchive,
        packaged: &BTreeSet<String>,
    ) -> ExtractResult<(SourceFile, SchemaRecords)> {
        let key = archive.key();
        let root = read_markup(path)?;
        let source = source_file(path, ManagerKind::Schema, key);
        let cx = SchemaContext {
            key,
            source_file_id: SourceFile::identity_for(&source.name, key),
            xbrl_type: archive.category().as_str(),
            packaged,
        };
        Ok((source, read_schema(&root, &cx)))
    }
}

impl Extractor for SchemaExtractor {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Schema
    }

    fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>> {
        let paths = archive.files_matching(|name| name.ends_with(".xsd"));
        if paths.is_empty() {
            return Err(self.kind().not_applicable());
        }
        let packaged: BTreeSet<String> = archive
            .files_matching(|_| true)
            .iter()
            .map(|p| file_name(p))
            .collect();
        let files = paths
            .iter()
            .map(|path| self.read_file(path, archive, &packaged))
            .collect::<ExtractResult<Vec<_>>>()?;
        if files.iter().all(|(_, records)| records.is_empty()) {
            return Err(self.kind().not_applicable());
        }

        let mut items = ItemList::new();
        let sources = files.iter().map(|(source, _)| source.clone()).collect();
        items.push(ItemKind::SchemaSourceFile, Payload::SourceFiles(sources));
        for (_, records) in files {
            items.push(
                ItemKind::SchemaLinkBaseRefs,
                Payload::LinkBaseRefs(records.linkbase_refs),
            );
            items.push(ItemKind::SchemaImports, Payload::SchemaImports(records.imports));
            items.push(ItemKind::SchemaElements, Payload::SchemaElements(records.elements));
        }
        tracing::debug!(files = paths.len(), "schema extracted");
        Ok(items.into_sorted())
    }
}
