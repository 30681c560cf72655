use crate::models::Inline;

/// Flatten inline content into its visible plain text.
///
/// Plain, escaped and emoji nodes contribute their literal text, entities
/// their decoded text; strong and
/// emphasis spans are flattened recursively in document order. Everything else
/// (links, code, images, breaks) is skipped.
pub fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_inline_text(&mut out, inlines);
    out
}

fn push_inline_text(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Plain(text)
            | Inline::Escaped(text)
            | Inline::Emoji(text)
            | Inline::Entity { text, .. } => out.push_str(text),
            Inline::Strong(children) | Inline::Emphasis(children) => {
                push_inline_text(out, children)
            }
            _ => {}
        }
    }
}
