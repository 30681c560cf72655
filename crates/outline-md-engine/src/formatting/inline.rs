use std::sync::OnceLock;

use regex::Regex;

use super::longest_backtick_run;
use crate::models::{Inline, LinkKind};

pub(super) fn format_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        format_inline(&mut out, inline);
    }
    out
}

fn format_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Plain(text) => out.push_str(&escape_plain(text)),
        Inline::Escaped(text) => {
            out.push('\\');
            out.push_str(text);
        }
        Inline::Emoji(text) | Inline::Html(text) | Inline::Entity { raw: text, .. } => {
            out.push_str(text)
        }
        Inline::Strong(children) => {
            // `***a***` reads as emphasis around strong, so a strong span that
            // starts or ends with emphasis uses underscores instead.
            let delimiter = if starts_or_ends_with_emphasis(children) {
                "__"
            } else {
                "**"
            };
            wrap(out, delimiter, children);
        }
        Inline::Emphasis(children) => wrap(out, "*", children),
        Inline::Strikethrough(children) => wrap(out, "~~", children),
        Inline::Link {
            target,
            title,
            kind,
            children,
        } => match kind {
            LinkKind::Autolink | LinkKind::Email => {
                out.push('<');
                out.push_str(target);
                out.push('>');
            }
            LinkKind::Inline => {
                out.push('[');
                out.push_str(&format_inlines(children));
                out.push_str("](");
                push_destination(out, target, title);
                out.push(')');
            }
        },
        Inline::Image { source, title, alt } => {
            out.push_str("![");
            out.push_str(&format_inlines(alt));
            out.push_str("](");
            push_destination(out, source, title);
            out.push(')');
        }
        Inline::Code(code) => push_code_span(out, code),
        Inline::SoftBreak => out.push('\n'),
        Inline::HardBreak => out.push_str("\\\n"),
    }
}

fn wrap(out: &mut String, delimiter: &str, children: &[Inline]) {
    out.push_str(delimiter);
    out.push_str(&format_inlines(children));
    out.push_str(delimiter);
}

fn starts_or_ends_with_emphasis(children: &[Inline]) -> bool {
    matches!(children.first(), Some(Inline::Emphasis(_)))
        || matches!(children.last(), Some(Inline::Emphasis(_)))
}

fn push_destination(out: &mut String, target: &str, title: &str) {
    let needs_brackets = target.is_empty()
        || target
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '<' | '>'));
    if needs_brackets {
        out.push('<');
        out.push_str(&target.replace('<', "\\<").replace('>', "\\>"));
        out.push('>');
    } else {
        out.push_str(target);
    }

    if !title.is_empty() {
        out.push_str(" \"");
        out.push_str(&title.replace('\\', "\\\\").replace('"', "\\\""));
        out.push('"');
    }
}

fn push_code_span(out: &mut String, code: &str) {
    let ticks = "`".repeat(longest_backtick_run(code) + 1);
    let pad = code.starts_with('`')
        || code.ends_with('`')
        || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
    out.push_str(&ticks);
    if pad {
        out.push(' ');
    }
    out.push_str(code);
    if pad {
        out.push(' ');
    }
    out.push_str(&ticks);
}

fn markup_regex() -> &'static Regex {
    static MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();
    MARKUP_REGEX.get_or_init(|| {
        Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);|<[A-Za-z/!?]")
            .expect("Invalid markup regex")
    })
}

/// Escape the characters of decoded text that would otherwise re-parse as an
/// entity reference or as HTML.
fn escape_plain(text: &str) -> String {
    let regex = markup_regex();
    let mut out = String::with_capacity(text.len());
    let mut current_pos = 0;
    for found in regex.find_iter(text) {
        out.push_str(&text[current_pos..found.start()]);
        out.push('\\');
        out.push_str(found.as_str());
        current_pos = found.end();
    }
    out.push_str(&text[current_pos..]);
    out
}
