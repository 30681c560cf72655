pub mod document;

pub use document::{Block, Document, Inline, LinkKind, List, ListItem};
