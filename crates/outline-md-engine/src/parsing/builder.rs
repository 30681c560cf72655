use std::ops::Range;
use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

use super::ParseOptions;
use crate::models::{Block, Inline, LinkKind, List, ListItem};

/// Folds the flat `pulldown-cmark` event stream into a nested tree.
///
/// # Event flow
///
/// Every container arrives as `Start(tag)` ... `End(tag)` with its content in
/// between, so the builder keeps a stack of open [`Frame`]s and attaches each
/// finished node to whatever frame is below it.
///
/// Lists need one extra step. A tight list item has no paragraph wrapper:
///
/// ```markdown
/// - Parent
///   - Child
/// ```
/// Events:
/// 1. `Start(List)`
/// 2. `Start(Item)`
/// 3. `Text("Parent")` - inline content directly inside the item
/// 4. `Start(List)` - nested list, still INSIDE the parent item
/// 5. `Start(Item)`, `Text("Child")`, `End(Item)`
/// 6. `End(List)`
/// 7. `End(Item)`
/// 8. `End(List)`
///
/// Inline events that land on a frame without inline content open an implicit
/// [`Frame::TextBlock`], which is closed again by the next block-level event
/// (step 4 above) or by the end of the item.
pub(super) struct TreeBuilder<'s> {
    source: &'s str,
    options: ParseOptions,
    blocks: Vec<Block>,
    stack: Vec<Frame>,
}

/// A container that is still receiving content.
#[derive(Debug)]
enum Frame {
    Paragraph(Vec<Inline>),
    Heading {
        level: u8,
        inlines: Vec<Inline>,
    },
    TextBlock(Vec<Inline>),
    Quote(Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(Vec<Block>),
    CodeBlock {
        info: Option<String>,
        literal: String,
    },
    HtmlBlock(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
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
}

/// What a closed frame turns into.
enum Node {
    Block(Block),
    Item(ListItem),
    Inline(Inline),
}

impl<'s> TreeBuilder<'s> {
    pub(super) fn new(source: &'s str, options: ParseOptions) -> Self {
        Self {
            source,
            options,
            blocks: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Process a single markdown event
    pub(super) fn process_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(text, range),
            Event::Code(code) => self.push_inline(Inline::Code(code.to_string())),
            Event::InlineHtml(html) => self.push_inline(Inline::Html(html.to_string())),
            Event::Html(html) => {
                if let Some(Frame::HtmlBlock(literal)) = self.stack.last_mut() {
                    literal.push_str(&html);
                } else {
                    self.push_inline(Inline::Html(html.to_string()));
                }
            }
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => {
                self.close_text_block();
                self.push_block(Block::Rule);
            }
            // Footnotes, math and task markers are not enabled.
            _ => {}
        }
    }

    /// Close any open frames and return the top-level blocks.
    pub(super) fn finalize(mut self) -> Vec<Block> {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.blocks
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph(Vec::new()),
            Tag::Heading { level, .. } => Frame::Heading {
                level: level as u8,
                inlines: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::Quote(Vec::new()),
            Tag::List(start) => Frame::List {
                start,
                items: Vec::new(),
            },
            Tag::Item => Frame::Item(Vec::new()),
            Tag::CodeBlock(kind) => Frame::CodeBlock {
                info: match kind {
                    CodeBlockKind::Fenced(info) if !info.is_empty() => Some(info.to_string()),
                    _ => None,
                },
                literal: String::new(),
            },
            Tag::HtmlBlock => Frame::HtmlBlock(String::new()),
            Tag::Emphasis => Frame::Emphasis(Vec::new()),
            Tag::Strong => Frame::Strong(Vec::new()),
            Tag::Strikethrough => Frame::Strikethrough(Vec::new()),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => Frame::Link {
                target: dest_url.to_string(),
                title: title.to_string(),
                kind: match link_type {
                    LinkType::Autolink => LinkKind::Autolink,
                    LinkType::Email => LinkKind::Email,
                    _ => LinkKind::Inline,
                },
                children: Vec::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                source: dest_url.to_string(),
                title: title.to_string(),
                alt: Vec::new(),
            },
            // Tables, footnotes and the like are not enabled; their content
            // flows into the enclosing frame.
            _ => return,
        };

        if frame.is_block() {
            self.close_text_block();
        }
        self.stack.push(frame);
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Item => {
                self.close_text_block();
                self.close_top();
            }
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::CodeBlock
            | TagEnd::HtmlBlock
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => self.close_top(),
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>, range: Range<usize>) {
        if let Some(Frame::CodeBlock { literal, .. } | Frame::HtmlBlock(literal)) =
            self.stack.last_mut()
        {
            literal.push_str(&text);
            return;
        }

        // Character references arrive as their own event, already decoded.
        let source = self.source;
        let raw = &source[range.clone()];
        if raw != &*text && raw.starts_with('&') && raw.ends_with(';') {
            self.push_inline(Inline::Entity {
                raw: raw.to_string(),
                text: text.to_string(),
            });
            return;
        }

        // pulldown-cmark starts a new text run right after a backslash escape,
        // so an escaped character is always the first character of its event.
        if let Some(first) = text.chars().next()
            && first.is_ascii_punctuation()
            && self.escaped_at(range.start)
        {
            self.push_inline(Inline::Escaped(first.to_string()));
            let rest = &text[first.len_utf8()..];
            if !rest.is_empty() {
                self.push_inline(Inline::Plain(rest.to_string()));
            }
            return;
        }

        self.push_inline(Inline::Plain(text.to_string()));
    }

    /// Whether the byte at `offset` is preceded by an unescaped backslash.
    fn escaped_at(&self, offset: usize) -> bool {
        let preceding = self.source.as_bytes()[..offset]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        preceding % 2 == 1
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(
                Frame::Paragraph(inlines)
                | Frame::Heading { inlines, .. }
                | Frame::TextBlock(inlines)
                | Frame::Emphasis(inlines)
                | Frame::Strong(inlines)
                | Frame::Strikethrough(inlines)
                | Frame::Link {
                    children: inlines, ..
                }
                | Frame::Image { alt: inlines, .. },
            ) => append_inline(inlines, inline),
            _ => self.stack.push(Frame::TextBlock(vec![inline])),
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.stack.last_mut() {
            Some(Frame::Quote(blocks) | Frame::Item(blocks)) => blocks.push(block),
            _ => self.blocks.push(block),
        }
    }

    fn close_text_block(&mut self) {
        if matches!(self.stack.last(), Some(Frame::TextBlock(_))) {
            self.close_top();
        }
    }

    fn close_top(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.finish(self.options) {
            Node::Block(block) => self.push_block(block),
            Node::Inline(inline) => self.push_inline(inline),
            Node::Item(item) => {
                if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                    items.push(item);
                }
            }
        }
    }
}

impl Frame {
    fn is_block(&self) -> bool {
        matches!(
            self,
            Frame::Paragraph(_)
                | Frame::Heading { .. }
                | Frame::TextBlock(_)
                | Frame::Quote(_)
                | Frame::List { .. }
                | Frame::Item(_)
                | Frame::CodeBlock { .. }
                | Frame::HtmlBlock(_)
        )
    }

    fn finish(self, options: ParseOptions) -> Node {
        let inlines = |inlines: Vec<Inline>| {
            if options.emoji {
                split_emoji(inlines)
            } else {
                inlines
            }
        };

        match self {
            Frame::Paragraph(content) => Node::Block(Block::Paragraph(inlines(content))),
            Frame::Heading { level, inlines: content } => Node::Block(Block::Heading {
                level,
                inlines: inlines(content),
            }),
            Frame::TextBlock(content) => Node::Block(Block::Text(inlines(content))),
            Frame::Quote(blocks) => Node::Block(Block::Quote(blocks)),
            Frame::List { start, items } => {
                let loose = items.iter().any(|item| {
                    item.blocks
                        .iter()
                        .any(|block| matches!(block, Block::Paragraph(_)))
                });
                Node::Block(Block::List(List {
                    start,
                    loose,
                    items,
                }))
            }
            Frame::Item(blocks) => Node::Item(ListItem::new(blocks)),
            Frame::CodeBlock { info, literal } => Node::Block(Block::CodeBlock { info, literal }),
            Frame::HtmlBlock(html) => Node::Block(Block::Html(html)),
            Frame::Emphasis(content) => Node::Inline(Inline::Emphasis(inlines(content))),
            Frame::Strong(content) => Node::Inline(Inline::Strong(inlines(content))),
            Frame::Strikethrough(content) => {
                Node::Inline(Inline::Strikethrough(inlines(content)))
            }
            Frame::Link {
                target,
                title,
                kind,
                children,
            } => Node::Inline(Inline::Link {
                target,
                title,
                kind,
                children: inlines(children),
            }),
            Frame::Image { source, title, alt } => Node::Inline(Inline::Image {
                source,
                title,
                alt: inlines(alt),
            }),
        }
    }
}

/// Append an inline, merging adjacent plain text runs.
fn append_inline(inlines: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Plain(text) = &inline
        && let Some(Inline::Plain(previous)) = inlines.last_mut()
    {
        previous.push_str(text);
        return;
    }
    inlines.push(inline);
}

fn emoji_regex() -> &'static Regex {
    static EMOJI_REGEX: OnceLock<Regex> = OnceLock::new();
    EMOJI_REGEX.get_or_init(|| {
        Regex::new(r":(?:\+1|-1|[a-z][a-z0-9_+-]*):").expect("Invalid emoji regex")
    })
}

/// Split `:shortcode:` runs out of plain text into emoji nodes.
fn split_emoji(inlines: Vec<Inline>) -> Vec<Inline> {
    let regex = emoji_regex();
    let mut result = Vec::with_capacity(inlines.len());

    for inline in inlines {
        let Inline::Plain(text) = inline else {
            result.push(inline);
            continue;
        };

        let mut current_pos = 0;
        for found in regex.find_iter(&text) {
            if found.start() > current_pos {
                result.push(Inline::Plain(text[current_pos..found.start()].to_string()));
            }
            result.push(Inline::Emoji(found.as_str().to_string()));
            current_pos = found.end();
        }
        if current_pos < text.len() {
            result.push(Inline::Plain(text[current_pos..].to_string()));
        }
    }

    result
}
