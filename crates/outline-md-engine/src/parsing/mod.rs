//! Markdown parsing module that converts markdown text into a [`Document`] tree.
//!
//! Parsing is built on `pulldown-cmark` events and never fails: anything the
//! tree does not model is dropped or flattened into its parent.

mod builder;

use pulldown_cmark::{Options, Parser};

use crate::models::Document;
use builder::TreeBuilder;

/// Optional syntax extensions. Everything is off by default (plain CommonMark).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// `~~struck~~` spans.
    pub strikethrough: bool,
    /// `:shortcode:` emoji inside plain text.
    pub emoji: bool,
}

impl ParseOptions {
    fn to_pulldown(self) -> Options {
        let mut options = Options::empty();
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        options
    }
}

/// Parse markdown content with the default options.
pub fn parse_markdown(source: &str) -> Document {
    parse_markdown_with(source, ParseOptions::default())
}

/// Parse markdown content into a complete [`Document`].
pub fn parse_markdown_with(source: &str, options: ParseOptions) -> Document {
    let parser = Parser::new_ext(source, options.to_pulldown()).into_offset_iter();
    let mut builder = TreeBuilder::new(source, options);

    for (event, range) in parser {
        builder.process_event(event, range);
    }

    Document::new(builder.finalize())
}
