pub mod formatting;
pub mod io;
pub mod links;
pub mod models;
pub mod normalize;
pub mod parsing;
pub mod pipeline;
pub mod slug;
pub mod text;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use formatting::format_markdown;
pub use io::{IoError, Output};
pub use links::{SlugCatalog, rewrite_heading_links};
pub use models::*;
pub use parsing::{ParseOptions, parse_markdown, parse_markdown_with};
pub use pipeline::{PreparedDocument, prepare_upload, render_fetched};
pub use slug::{outline_slug, regular_slug};
pub use text::inline_text;
