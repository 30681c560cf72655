//! Canonical markdown output for a [`Document`].
//!
//! The output re-parses to the same tree for anything produced by
//! [`crate::parsing::parse_markdown`]. Source layout is not preserved: headings
//! are always ATX, bullets use `-`, code blocks are fenced and block spacing is
//! normalised to a single blank line.

mod inline;

use crate::models::{Block, Document, Inline, List, ListItem};
use inline::format_inlines;

/// Render a document back to markdown text.
///
/// Non-empty output always ends with exactly one newline.
pub fn format_markdown(document: &Document) -> String {
    let body = format_blocks(&document.blocks, "\n\n");
    if body.is_empty() {
        body
    } else {
        body + "\n"
    }
}

fn format_blocks(blocks: &[Block], separator: &str) -> String {
    let mut out = String::new();
    let mut previous: Option<&Block> = None;
    // Alternate markers so that consecutive lists of the same kind are not
    // merged into one on re-parse.
    let mut alternate_marker = false;

    for block in blocks {
        if let Some(previous) = previous {
            out.push_str(separator);
            alternate_marker = match (previous, block) {
                (Block::List(a), Block::List(b)) if a.is_ordered() == b.is_ordered() => {
                    !alternate_marker
                }
                _ => false,
            };
        }
        out.push_str(&format_block(block, alternate_marker));
        previous = Some(block);
    }

    out
}

fn format_block(block: &Block, alternate_marker: bool) -> String {
    match block {
        Block::Heading { level, inlines } => {
            // A heading is a single line; breaks from setext headings collapse.
            let text = format_inlines(&without_breaks(inlines)).replace('\n', " ");
            let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
            if text.is_empty() {
                hashes
            } else {
                format!("{hashes} {text}")
            }
        }
        Block::Paragraph(inlines) | Block::Text(inlines) => format_inlines(inlines),
        Block::List(list) => format_list(list, alternate_marker),
        Block::Quote(blocks) => prefix_lines(&format_blocks(blocks, "\n\n"), "> ", "> "),
        Block::CodeBlock { info, literal } => format_code_block(info.as_deref(), literal),
        Block::Html(html) => html.trim_end_matches('\n').to_string(),
        Block::Rule => "***".to_string(),
    }
}

/// Copy of `inlines` with soft and hard breaks turned into spaces.
fn without_breaks(inlines: &[Inline]) -> Vec<Inline> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::SoftBreak | Inline::HardBreak => Inline::plain(" "),
            Inline::Strong(children) => Inline::Strong(without_breaks(children)),
            Inline::Emphasis(children) => Inline::Emphasis(without_breaks(children)),
            Inline::Strikethrough(children) => Inline::Strikethrough(without_breaks(children)),
            Inline::Link {
                target,
                title,
                kind,
                children,
            } => Inline::Link {
                target: target.clone(),
                title: title.clone(),
                kind: *kind,
                children: without_breaks(children),
            },
            Inline::Image { source, title, alt } => Inline::Image {
                source: source.clone(),
                title: title.clone(),
                alt: without_breaks(alt),
            },
            other => other.clone(),
        })
        .collect()
}

fn format_list(list: &List, alternate_marker: bool) -> String {
    let separator = if list.loose { "\n\n" } else { "\n" };
    let mut items = Vec::with_capacity(list.items.len());

    for (index, item) in list.items.iter().enumerate() {
        let marker = match list.start {
            Some(start) => {
                let delimiter = if alternate_marker { ')' } else { '.' };
                format!("{}{delimiter}", start + index as u64)
            }
            None => (if alternate_marker { "*" } else { "-" }).to_string(),
        };
        items.push(format_item(item, &marker, separator));
    }

    items.join(separator)
}

fn format_item(item: &ListItem, marker: &str, separator: &str) -> String {
    let content = format_blocks(&item.blocks, separator);
    if content.is_empty() {
        return marker.to_string();
    }
    let indent = " ".repeat(marker.len() + 1);
    prefix_lines(&content, &format!("{marker} "), &indent)
}

fn format_code_block(info: Option<&str>, literal: &str) -> String {
    let longest_run = longest_backtick_run(literal);
    let fence = "`".repeat(longest_run.max(2) + 1);
    let body = literal.strip_suffix('\n').unwrap_or(literal);

    let mut out = format!("{fence}{}\n", info.unwrap_or_default());
    if !literal.is_empty() {
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(&fence);
    out
}

pub(crate) fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Prefix the first line with `first` and the rest with `rest`.
///
/// Blank lines get the prefix with trailing whitespace removed, so list
/// indentation leaves them empty and quotes leave a bare `>`.
fn prefix_lines(text: &str, first: &str, rest: &str) -> String {
    let mut out = String::with_capacity(text.len() + first.len());
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let prefix = if index == 0 { first } else { rest };
        if line.is_empty() {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
            out.push_str(line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn plain(s: &str) -> Inline {
        Inline::plain(s)
    }

    fn item(s: &str) -> ListItem {
        ListItem::new(vec![Block::Text(vec![plain(s)])])
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(format_markdown(&Document::default()), "");
    }

    #[test]
    fn test_blocks_are_separated_by_blank_lines() {
        let doc = Document::new(vec![
            Block::heading(2, vec![plain("Sub")]),
            Block::Paragraph(vec![plain("one"), Inline::SoftBreak, plain("two")]),
            Block::Rule,
        ]);
        insta::assert_snapshot!(format_markdown(&doc), @r"
        ## Sub

        one
        two

        ***
        ");
    }

    #[test]
    fn test_nested_lists_and_quotes() {
        let mut parent = item("parent");
        parent
            .blocks
            .push(Block::List(List::ordered(1, vec![item("one"), item("two")])));
        let doc = Document::new(vec![
            Block::List(List::bullet(vec![parent, item("sibling")])),
            Block::Quote(vec![
                Block::Paragraph(vec![plain("quoted")]),
                Block::Quote(vec![Block::Paragraph(vec![plain("deeper")])]),
            ]),
        ]);
        insta::assert_snapshot!(format_markdown(&doc), @r"
        - parent
          1. one
          2. two
        - sibling

        > quoted
        >
        > > deeper
        ");
        assert_eq!(parse_markdown(&format_markdown(&doc)), doc);
    }

    #[test]
    fn test_loose_list_items() {
        let list = List {
            start: None,
            loose: true,
            items: vec![
                ListItem::new(vec![
                    Block::Paragraph(vec![plain("first")]),
                    Block::Paragraph(vec![plain("more")]),
                ]),
                ListItem::new(vec![Block::Paragraph(vec![plain("second")])]),
            ],
        };
        assert_eq!(
            format_markdown(&Document::new(vec![Block::List(list)])),
            "- first\n\n  more\n\n- second\n"
        );
    }

    #[test]
    fn test_adjacent_lists_alternate_markers() {
        let doc = Document::new(vec![
            Block::List(List::bullet(vec![item("a")])),
            Block::List(List::bullet(vec![item("b")])),
            Block::List(List::bullet(vec![item("c")])),
        ]);
        assert_eq!(format_markdown(&doc), "- a\n\n* b\n\n- c\n");
        assert_eq!(parse_markdown(&format_markdown(&doc)), doc);
    }

    #[test]
    fn test_code_block_fences() {
        let doc = Document::new(vec![
            Block::CodeBlock {
                info: Some("rust".to_string()),
                literal: "let x = 1;\n".to_string(),
            },
            Block::CodeBlock {
                info: None,
                literal: "```\nnested\n```\n".to_string(),
            },
        ]);
        assert_eq!(
            format_markdown(&doc),
            "```rust\nlet x = 1;\n```\n\n````\n```\nnested\n```\n````\n"
        );
    }

    #[test]
    fn test_code_block_inside_list_item() {
        let doc = Document::new(vec![Block::List(List::bullet(vec![ListItem::new(vec![
            Block::Text(vec![plain("run")]),
            Block::CodeBlock {
                info: Some("sh".to_string()),
                literal: "make\n\nmake test\n".to_string(),
            },
        ])]))]);
        assert_eq!(
            format_markdown(&doc),
            "- run\n  ```sh\n  make\n\n  make test\n  ```\n"
        );
    }

    #[test]
    fn test_heading_levels_and_empty_heading() {
        let doc = Document::new(vec![
            Block::heading(6, vec![plain("Deep")]),
            Block::heading(1, vec![]),
        ]);
        assert_eq!(format_markdown(&doc), "###### Deep\n\n#\n");
    }

    #[test]
    fn test_setext_heading_breaks_become_spaces() {
        let doc = parse_markdown("foo\\\nbar\nbaz\n===\n");
        assert_eq!(format_markdown(&doc), "# foo bar baz\n");
        let reparsed = parse_markdown(&format_markdown(&doc));
        assert_eq!(
            reparsed.blocks,
            vec![Block::heading(1, vec![plain("foo bar baz")])]
        );
    }

    #[rstest]
    #[case("&#35; not heading\n")]
    #[case("&#42;not em&#42;\n")]
    #[case("&#43; item\n")]
    #[case("&#91;not a link&#93;(x)\n")]
    #[case("AT&amp;T &lt;div&gt; &copy; 2024\n")]
    fn test_character_references_survive_formatting(#[case] source: &str) {
        let doc = parse_markdown(source);
        assert_eq!(format_markdown(&doc), source);
        assert_eq!(parse_markdown(&format_markdown(&doc)), doc);
    }
}
