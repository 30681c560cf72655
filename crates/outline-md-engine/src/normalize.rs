//! Document framing: title extraction and removal of the redundant title heading.

use crate::models::{Block, Document};
use crate::text::inline_text;

impl Document {
    /// Flattened text of the first top-level heading, at any level.
    ///
    /// Returns an empty string when the document has no top-level heading.
    pub fn title(&self) -> String {
        self.blocks
            .iter()
            .find_map(|block| match block {
                Block::Heading { inlines, .. } => Some(inline_text(inlines)),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Remove the first block if it is a level 1 heading.
    ///
    /// Returns whether a heading was removed.
    pub fn drop_leading_h1(&mut self) -> bool {
        if matches!(self.blocks.first(), Some(Block::Heading { level: 1, .. })) {
            self.blocks.remove(0);
            true
        } else {
            false
        }
    }
}
