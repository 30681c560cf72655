//! In-memory Markdown document tree.
//!
//! The tree is produced by [`crate::parsing::parse_markdown`], mutated in place by
//! the normalisation and link rewriting passes, and turned back into text by
//! [`crate::formatting::format_markdown`]. Every node exclusively owns its children.

/// A parsed markdown document: an ordered sequence of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// ATX or setext heading. `level` is 1-based.
    Heading { level: u8, inlines: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List(List),
    Quote(Vec<Block>),
    /// Bare inline content of a tight list item (no paragraph wrapper).
    Text(Vec<Inline>),
    CodeBlock {
        /// Info string of a fenced block; `None` for indented code.
        info: Option<String>,
        literal: String,
    },
    Html(String),
    Rule,
}

impl Block {
    pub fn heading(level: u8, inlines: Vec<Inline>) -> Self {
        Block::Heading { level, inlines }
    }
}

/// A bullet or ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    /// Start number for ordered lists, `None` for bullet lists.
    pub start: Option<u64>,
    /// Loose lists separate their items (and the blocks inside them) with blank lines.
    pub loose: bool,
    pub items: Vec<ListItem>,
}

impl List {
    pub fn bullet(items: Vec<ListItem>) -> Self {
        Self {
            start: None,
            loose: false,
            items,
        }
    }

    pub fn ordered(start: u64, items: Vec<ListItem>) -> Self {
        Self {
            start: Some(start),
            loose: false,
            items,
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.start.is_some()
    }
}

/// A single list item holding nested blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

impl ListItem {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

/// How a link was written in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkKind {
    /// `[text](target)`, including resolved reference links.
    #[default]
    Inline,
    /// `<https://example.com>`
    Autolink,
    /// `<someone@example.com>`
    Email,
}

/// Inline-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    /// A backslash-escaped punctuation character, stored without the backslash.
    Escaped(String),
    /// Entity or numeric character reference: `raw` as written (`&amp;`) and
    /// `text` decoded (`&`).
    Entity { raw: String, text: String },
    /// Emoji shortcode such as `:tada:`.
    Emoji(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link {
        target: String,
        title: String,
        kind: LinkKind,
        children: Vec<Inline>,
    },
    Image {
        source: String,
        title: String,
        alt: Vec<Inline>,
    },
    Code(String),
    Html(String),
    SoftBreak,
    HardBreak,
}

impl Inline {
    pub fn plain(text: impl Into<String>) -> Self {
        Inline::Plain(text.into())
    }

    /// Inline link with no title.
    pub fn link(target: impl Into<String>, children: Vec<Inline>) -> Self {
        Inline::Link {
            target: target.into(),
            title: String::new(),
            kind: LinkKind::Inline,
            children,
        }
    }
}
