//! Content model shared by the parsers and the renderers.
//!
//! A document is an ordered sequence of [`ContentBlock`]s. Markdown input
//! and re-extracted DOCX input both produce this sequence, and every
//! renderer consumes it in order.

mod block;
mod inline;

pub use block::{BlockKind, ContentBlock};
pub use inline::InlineRun;

/// Count blocks of a given kind.
pub fn count_kind(blocks: &[ContentBlock], kind: BlockKind) -> usize {
    blocks.iter().filter(|b| b.kind == kind).count()
}

/// Concatenate the text of all blocks, separated by spaces.
///
/// Table blocks contribute nothing, matching the text that language
/// detection runs on.
pub fn joined_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
