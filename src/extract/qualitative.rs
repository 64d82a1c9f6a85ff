//! Narrative (qualitative) documents split into a heading/text tree.

use scraper::{ElementRef, Html, Selector};

use crate::archive::XbrlArchive;
use crate::extract::error::ExtractResult;
use crate::extract::{Extractor, ItemList, ManagerKind, read_text, source_file};
use crate::identity::Identity;
use crate::model::{DocumentKey, Item, ItemKind, Payload, QualitativeDocument, SourceFile};

/// File name of the narrative document inside a package.
pub const QUALITATIVE_FILE: &str = "qualitative.htm";

pub const HEADING: &str = "heading";
pub const TEXT: &str = "text";

/// Heading level of an element: `<hN>` or a `smt_headN` class.
fn heading_level(el: &ElementRef<'_>) -> Option<usize> {
    let name = el.value().name();
    if let Some(level) = name.strip_prefix('h').and_then(|n| n.parse().ok()) {
        return Some(level);
    }
    el.value()
        .classes()
        .find_map(|c| c.strip_prefix("smt_head").and_then(|n| n.parse().ok()))
}

fn block_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join("")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a narrative document into blocks.
///
/// Headings nest by level; text blocks hang under the nearest preceding
/// heading. `order` counts siblings under the same parent, from 1.
pub fn read_blocks(
    html: &str,
    key: DocumentKey,
    source_file_id: Identity,
) -> Vec<QualitativeDocument> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6, p") else {
        return Vec::new();
    };

    // Open headings as (level, id); children counted per parent.
    let mut open: Vec<(usize, Identity)> = Vec::new();
    let mut sibling_counts: Vec<(Option<Identity>, u32)> = Vec::new();
    let mut blocks = Vec::new();

    for el in document.select(&selector) {
        let content = block_text(&el);
        if content.is_empty() {
            continue;
        }
        let level = heading_level(&el);
        if let Some(level) = level {
            while open.last().is_some_and(|(l, _)| *l >= level) {
                open.pop();
            }
        }
        let parent_id = open.last().map(|(_, id)| *id);
        let order = match sibling_counts.iter_mut().find(|(p, _)| *p == parent_id) {
            Some((_, n)) => {
                *n += 1;
                *n
            }
            None => {
                sibling_counts.push((parent_id, 1));
                1
            }
        };
        let current_id = QualitativeDocument::instance_id(source_file_id, blocks.len());
        if let Some(level) = level {
            open.push((level, current_id));
        }
        blocks.push(
            QualitativeDocument {
                item_key: None,
                current_id,
                parent_id,
                block_type: (if level.is_some() { HEADING } else { TEXT }).to_string(),
                order,
                head_item_key: key,
                source_file_id,
                content,
            }
            .identified(),
        );
    }
    blocks
}

/// Extractor for `qualitative.htm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualitativeExtractor;

impl Extractor for QualitativeExtractor {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Qualitative
    }

    fn extract(&self, archive: &XbrlArchive) -> ExtractResult<Vec<Item>> {
        let paths = archive.files_matching(|name| name == QUALITATIVE_FILE);
        if paths.is_empty() {
            return Err(self.kind().not_applicable());
        }
        let key = archive.key();
        let mut sources = Vec::new();
        let mut per_file = Vec::new();
        for path in &paths {
            let source = source_file(path, self.kind(), key);
            let source_id = SourceFile::identity_for(&source.name, key);
            let html = read_text(path)?;
            per_file.push(read_blocks(&html, key, source_id));
            sources.push(source);
        }
        if per_file.iter().all(Vec::is_empty) {
            return Err(self.kind().not_applicable());
        }

        let mut items = ItemList::new();
        items.push(ItemKind::QualitativeSourceFile, Payload::SourceFiles(sources));
        for blocks in per_file {
            items.push(ItemKind::Qualitative, Payload::Qualitative(blocks));
        }
        Ok(items.into_sorted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><body>
<h1>1. 経営成績等の概況</h1>
<h2>(1) 当期の経営成績の概況</h2>
<p>当連結会計年度の売上高は増加しました。</p>
<p>   </p>
<p>営業利益も増加しました。</p>
<h2>(2) 当期の財政状態の概況</h2>
<p>総資産は減少しました。</p>
<p class="smt_head1">2. 会計基準の選択</p>
<p>日本基準を採用しています。</p>
</body></html>"#;

    fn blocks() -> Vec<QualitativeDocument> {
        let key = DocumentKey::from_file_name("x.zip");
        read_blocks(HTML, key, SourceFile::identity_for(QUALITATIVE_FILE, key))
    }

    #[test]
    fn builds_heading_tree() {
        let blocks = blocks();
        assert_eq!(blocks.len(), 8);

        let h1 = &blocks[0];
        assert_eq!(h1.block_type, HEADING);
        assert_eq!(h1.parent_id, None);
        assert_eq!(h1.order, 1);

        let sub = &blocks[1];
        assert_eq!(sub.parent_id, Some(h1.current_id));

        assert_eq!(blocks[2].block_type, TEXT);
        assert_eq!(blocks[2].parent_id, Some(sub.current_id));
        assert_eq!(blocks[3].order, 2);

        let second_sub = &blocks[4];
        assert_eq!(second_sub.parent_id, Some(h1.current_id));
        assert_eq!(second_sub.order, 2);

        let classed = &blocks[6];
        assert_eq!(classed.block_type, HEADING);
        assert_eq!(classed.parent_id, None);
        assert_eq!(classed.order, 2);
        assert_eq!(blocks[7].parent_id, Some(classed.current_id));
    }

    #[test]
    fn identities_are_stable_across_runs() {
        let a = blocks();
        let b = blocks();
        assert!(a.iter().all(|d| d.item_key.is_some()));
        assert_eq!(
            a.iter().map(|d| d.item_key).collect::<Vec<_>>(),
            b.iter().map(|d| d.item_key).collect::<Vec<_>>()
        );
    }
}
