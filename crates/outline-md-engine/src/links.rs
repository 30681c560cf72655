//! Translation of in-document heading links between slug conventions.

use std::collections::HashMap;

use crate::models::{Block, Document, Inline, ListItem};
use crate::slug::{outline_slug, regular_slug};
use crate::text::inline_text;

/// Per-document mapping from a GitHub-style fragment (`#getting-started-`) to
/// the Outline fragment for the same heading (`#h-getting-started`).
///
/// Only top-level headings are catalogued. When two headings share a regular
/// slug, the later one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugCatalog {
    fragments: HashMap<String, String>,
}

impl SlugCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue every top-level heading of `document`.
    pub fn from_document(document: &Document) -> Self {
        let mut catalog = Self::new();
        for block in &document.blocks {
            if let Block::Heading { inlines, .. } = block {
                catalog.insert_heading(&inline_text(inlines));
            }
        }
        log::debug!("catalogued {} heading fragment(s)", catalog.len());
        catalog
    }

    /// Add the fragment pair for a heading with the given flattened text.
    pub fn insert_heading(&mut self, text: &str) {
        self.fragments.insert(
            format!("#{}", regular_slug(text)),
            format!("#{}", outline_slug(text)),
        );
    }

    /// Outline fragment for a regular fragment, if catalogued.
    pub fn get(&self, fragment: &str) -> Option<&str> {
        self.fragments.get(fragment).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Retarget every catalogued link reachable from `document`, in place.
    ///
    /// Returns the number of links rewritten. An empty catalog skips the walk.
    pub fn rewrite(&self, document: &mut Document) -> usize {
        if self.is_empty() {
            return 0;
        }
        let rewritten = self.rewrite_blocks(&mut document.blocks);
        log::debug!("rewrote {rewritten} heading link(s)");
        rewritten
    }

    fn rewrite_blocks(&self, blocks: &mut [Block]) -> usize {
        blocks.iter_mut().map(|block| self.rewrite_block(block)).sum()
    }

    fn rewrite_block(&self, block: &mut Block) -> usize {
        match block {
            Block::List(list) => list
                .items
                .iter_mut()
                .map(|item| self.rewrite_item(item))
                .sum(),
            Block::Quote(blocks) => self.rewrite_blocks(blocks),
            Block::Paragraph(inlines) | Block::Text(inlines) => self.rewrite_inlines(inlines),
            Block::Heading { .. } | Block::CodeBlock { .. } | Block::Html(_) | Block::Rule => 0,
        }
    }

    fn rewrite_item(&self, item: &mut ListItem) -> usize {
        self.rewrite_blocks(&mut item.blocks)
    }

    fn rewrite_inlines(&self, inlines: &mut [Inline]) -> usize {
        let mut rewritten = 0;
        for inline in inlines {
            match inline {
                Inline::Strong(children) | Inline::Emphasis(children) => {
                    rewritten += self.rewrite_inlines(children);
                }
                Inline::Link { target, .. } => {
                    if let Some(fragment) = self.get(target) {
                        *target = fragment.to_string();
                        rewritten += 1;
                    }
                }
                _ => {}
            }
        }
        rewritten
    }
}

/// Rewrite heading links in `document` from GitHub-style fragments to Outline
/// fragments. Returns the number of links changed.
pub fn rewrite_heading_links(document: &mut Document) -> usize {
    SlugCatalog::from_document(document).rewrite(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::List;
    use pretty_assertions::assert_eq;

    fn heading(level: u8, text: &str) -> Block {
        Block::heading(level, vec![Inline::plain(text)])
    }

    fn link(target: &str, text: &str) -> Inline {
        Inline::link(target, vec![Inline::plain(text)])
    }

    fn link_target(inline: &Inline) -> &str {
        match inline {
            Inline::Link { target, .. } => target,
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn test_catalog_maps_regular_to_outline_fragment() {
        let doc = Document::new(vec![heading(2, "Getting Started!")]);
        let catalog = SlugCatalog::from_document(&doc);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("#getting-started-"), Some("#h-getting-started"));
    }

    #[test]
    fn test_catalog_uses_flattened_heading_text() {
        let doc = Document::new(vec![Block::heading(
            2,
            vec![
                Inline::plain("The "),
                Inline::Strong(vec![Inline::Emphasis(vec![Inline::plain("Big")])]),
                Inline::plain(" Picture"),
            ],
        )]);
        let catalog = SlugCatalog::from_document(&doc);
        assert_eq!(catalog.get("#the-big-picture"), Some("#h-the-big-picture"));
    }

    #[test]
    fn test_duplicate_headings_last_one_wins() {
        let doc = Document::new(vec![heading(2, "Intro"), heading(3, "Intro")]);
        let catalog = SlugCatalog::from_document(&doc);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("#intro"), Some("#h-intro"));

        // Different outline slugs for the same regular slug: the later heading wins.
        let doc = Document::new(vec![heading(2, "a.b"), heading(2, "a b")]);
        let catalog = SlugCatalog::from_document(&doc);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("#a-b"), Some("#h-a-b"));
    }

    #[test]
    fn test_nested_headings_are_not_catalogued() {
        let doc = Document::new(vec![Block::Quote(vec![heading(2, "Hidden")])]);
        assert!(SlugCatalog::from_document(&doc).is_empty());
    }

    #[test]
    fn test_rewrites_paragraph_link_and_leaves_external_link() {
        let mut doc = Document::new(vec![
            heading(2, "Intro"),
            Block::Paragraph(vec![
                link("#intro", "see above"),
                Inline::plain(" or "),
                link("https://example.com", "elsewhere"),
            ]),
        ]);

        let rewritten = rewrite_heading_links(&mut doc);

        assert_eq!(rewritten, 1);
        let Block::Paragraph(inlines) = &doc.blocks[1] else {
            panic!("expected paragraph");
        };
        assert_eq!(link_target(&inlines[0]), "#h-intro");
        assert_eq!(link_target(&inlines[2]), "https://example.com");
    }

    #[test]
    fn test_rewrites_links_in_nested_containers() {
        let mut doc = Document::new(vec![
            heading(2, "Setup"),
            Block::List(List::bullet(vec![ListItem::new(vec![
                Block::Text(vec![Inline::Strong(vec![Inline::Emphasis(vec![
                    link("#setup", "deep"),
                ])])]),
                Block::Quote(vec![Block::Paragraph(vec![link("#setup", "quoted")])]),
                Block::List(List::ordered(
                    1,
                    vec![ListItem::new(vec![Block::Text(vec![link("#setup", "nested")])])],
                )),
            ])])),
        ]);

        assert_eq!(rewrite_heading_links(&mut doc), 3);

        let Block::List(list) = &doc.blocks[1] else {
            panic!("expected list");
        };
        let item = &list.items[0];
        let Block::Text(text) = &item.blocks[0] else {
            panic!("expected text block");
        };
        let Inline::Strong(strong) = &text[0] else {
            panic!("expected strong");
        };
        let Inline::Emphasis(emphasis) = &strong[0] else {
            panic!("expected emphasis");
        };
        assert_eq!(link_target(&emphasis[0]), "#h-setup");
    }

    #[test]
    fn test_links_inside_other_spans_are_untouched() {
        let mut doc = Document::new(vec![
            heading(2, "Intro"),
            Block::Paragraph(vec![Inline::Strikethrough(vec![link("#intro", "old")])]),
        ]);
        let before = doc.clone();

        assert_eq!(rewrite_heading_links(&mut doc), 0);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let mut doc = Document::new(vec![
            heading(2, "Intro"),
            Block::Paragraph(vec![link("#intro", "see above")]),
        ]);
        let catalog = SlugCatalog::from_document(&doc);

        assert_eq!(catalog.rewrite(&mut doc), 1);
        let once = doc.clone();
        assert_eq!(catalog.rewrite(&mut doc), 0);
        assert_eq!(doc, once);
    }

    #[test]
    fn test_empty_catalog_changes_nothing() {
        let mut doc = Document::new(vec![Block::Paragraph(vec![
            link("#intro", "a"),
            link("#", "b"),
        ])]);
        let before = doc.clone();

        assert_eq!(rewrite_heading_links(&mut doc), 0);
        assert_eq!(doc, before);
    }
}
