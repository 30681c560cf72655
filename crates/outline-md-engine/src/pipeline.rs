//! End-to-end conversions used by the `get` and `update` commands.

use crate::formatting::format_markdown;
use crate::links::SlugCatalog;
use crate::parsing::{ParseOptions, parse_markdown_with};

/// A local markdown file converted for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDocument {
    /// Text of the first top-level heading, empty when there is none.
    pub title: String,
    /// Document body with the title heading removed and heading links retargeted.
    pub text: String,
    /// Number of links that were rewritten.
    pub rewritten_links: usize,
}

/// Convert local markdown into the title and body sent to Outline.
///
/// The title is taken before a leading level 1 heading is dropped, so a file
/// starting with `# Title` uploads as title "Title" without repeating it in
/// the body.
pub fn prepare_upload(source: &str, options: ParseOptions) -> PreparedDocument {
    let mut document = parse_markdown_with(source, options);

    let title = document.title();
    if document.drop_leading_h1() {
        log::debug!("dropped leading title heading {title:?}");
    }

    let catalog = SlugCatalog::from_document(&document);
    let rewritten_links = catalog.rewrite(&mut document);

    PreparedDocument {
        title,
        text: format_markdown(&document),
        rewritten_links,
    }
}

/// Render a fetched document for saving locally: a level 1 title heading
/// followed by the body exactly as Outline returned it.
pub fn render_fetched(title: &str, text: &str) -> String {
    format!("# {title}\n\n{text}\n")
}
