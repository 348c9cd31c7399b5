//! Markdown rendering for content blocks.

use crate::model::{BlockKind, ContentBlock};

/// Convert blocks to markdown-like text with default settings.
pub fn to_markdown(blocks: &[ContentBlock]) -> String {
    MarkdownRenderer::new().render(blocks)
}

/// Markdown renderer.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    list_marker: char,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new() -> Self {
        Self { list_marker: '-' }
    }

    /// Set the bullet marker (`-`, `*` or `+`).
    pub fn with_list_marker(mut self, marker: char) -> Self {
        if matches!(marker, '-' | '*' | '+') {
            self.list_marker = marker;
        }
        self
    }

    /// Render blocks to markdown.
    ///
    /// Consecutive list items stay on adjacent lines; numbered items are
    /// renumbered from 1 within each run of numbered blocks.
    pub fn render(&self, blocks: &[ContentBlock]) -> String {
        let mut output = String::new();
        let mut number = 0u32;
        let mut previous: Option<BlockKind> = None;

        for block in blocks {
            let is_list = matches!(block.kind, BlockKind::Bullet | BlockKind::Numbered);
            if let Some(prev) = previous {
                let prev_is_list = matches!(prev, BlockKind::Bullet | BlockKind::Numbered);
                output.push('\n');
                if !(is_list && prev_is_list) {
                    output.push('\n');
                }
            }

            if block.kind == BlockKind::Numbered {
                number = if previous == Some(BlockKind::Numbered) {
                    number + 1
                } else {
                    1
                };
            }

            match block.kind {
                BlockKind::Heading => {
                    let level = block.level.clamp(1, 6) as usize;
                    output.push_str(&"#".repeat(level));
                    output.push(' ');
                    output.push_str(&single_line(&block.text));
                }
                BlockKind::Paragraph => output.push_str(&single_line(&block.text)),
                BlockKind::Bullet => {
                    output.push(self.list_marker);
                    output.push(' ');
                    output.push_str(&single_line(&block.text));
                }
                BlockKind::Numbered => {
                    output.push_str(&format!("{}. {}", number, single_line(&block.text)));
                }
                BlockKind::Table => self.render_table(&mut output, block.rows()),
            }
            previous = Some(block.kind);
        }

        if !output.is_empty() {
            output.push('\n');
        }
        output
    }

    fn render_table(&self, output: &mut String, rows: &[Vec<String>]) {
        let col_count = rows.first().map_or(0, Vec::len);
        if col_count == 0 {
            return;
        }

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push('|');
            for j in 0..col_count {
                let content = row.get(j).map(|c| escape_cell(c)).unwrap_or_default();
                output.push_str(&format!(" {} |", content));
            }

            // Separator after header row
            if i == 0 {
                output.push('\n');
                output.push('|');
                for _ in 0..col_count {
                    output.push_str(" --- |");
                }
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse line breaks so a block stays one markdown line.
fn single_line(text: &str) -> String {
    text.split('\n').map(str::trim).collect::<Vec<_>>().join(" ")
}

fn escape_cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}
