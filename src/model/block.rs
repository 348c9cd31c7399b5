//! Content block types.

use serde::{Deserialize, Serialize};

/// Kind of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// A heading (level 1 = top-level)
    Heading,
    /// A plain paragraph
    Paragraph,
    /// A bulleted list item
    Bullet,
    /// A numbered list item
    Numbered,
    /// A table
    Table,
}

impl BlockKind {
    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Bullet => "bullet",
            BlockKind::Numbered => "numbered",
            BlockKind::Table => "table",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One semantic unit of document structure.
///
/// Blocks are built once by a parser or extractor and consumed by a
/// renderer. `text` holds inline markup (`**bold**`, `*italic*`,
/// `__underline__`) and is empty for tables; `level` only matters for
/// headings; `table_data` is only populated for tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block kind
    pub kind: BlockKind,

    /// Inline markup text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,

    /// Heading level (1 = top-level)
    #[serde(default = "default_level")]
    pub level: u8,

    /// Table rows, each a list of cell texts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<Vec<Vec<String>>>,
}

fn default_level() -> u8 {
    1
}

impl ContentBlock {
    fn with_kind(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            level: 1,
            table_data: None,
        }
    }

    /// Create a heading block. Levels below 1 are raised to 1.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self {
            level: level.max(1),
            ..Self::with_kind(BlockKind::Heading, text)
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_kind(BlockKind::Paragraph, text)
    }

    /// Create a bullet list item.
    pub fn bullet(text: impl Into<String>) -> Self {
        Self::with_kind(BlockKind::Bullet, text)
    }

    /// Create a numbered list item.
    pub fn numbered(text: impl Into<String>) -> Self {
        Self::with_kind(BlockKind::Numbered, text)
    }

    /// Create a table block from rows of cell texts.
    pub fn table(rows: Vec<Vec<String>>) -> Self {
        Self {
            table_data: Some(rows),
            ..Self::with_kind(BlockKind::Table, String::new())
        }
    }

    /// Check if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.kind == BlockKind::Heading
    }

    /// Check if this is a top-level heading.
    pub fn is_top_heading(&self) -> bool {
        self.is_heading() && self.level <= 1
    }

    /// Table rows, empty for non-table blocks.
    pub fn rows(&self) -> &[Vec<String>] {
        self.table_data.as_deref().unwrap_or(&[])
    }

    /// Text with inline markers stripped (table cells joined by tabs/newlines).
    pub fn plain_text(&self) -> String {
        match self.kind {
            BlockKind::Table => self
                .rows()
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => crate::parser::tokenize_inline(&self.text)
                .into_iter()
                .map(|run| run.text)
                .collect(),
        }
    }
}
