//! Markdown-like block parser.
//!
//! Supports the subset the brand templates need: ATX headings, bullet
//! items, numbered items and paragraphs. Lines are classified in the order
//! heading → bullet → numbered → paragraph; consecutive plain lines are
//! joined into one paragraph until a blank line or a structural marker.

use regex::Regex;

use crate::model::ContentBlock;

/// Parse markdown-like text into content blocks.
pub fn parse_markdown(text: &str) -> Vec<ContentBlock> {
    MarkdownParser::new().parse(text)
}

/// Line-oriented markdown parser.
#[derive(Debug, Clone)]
pub struct MarkdownParser {
    heading: Regex,
    bullet: Regex,
    numbered: Regex,
    structural_start: Regex,
}

impl MarkdownParser {
    /// Create a parser with compiled line patterns.
    pub fn new() -> Self {
        Self {
            heading: Regex::new(r"^(#{1,6})\s+(.+)$").unwrap(),
            bullet: Regex::new(r"^[-*+]\s+(.+)$").unwrap(),
            numbered: Regex::new(r"^\d+[.)]\s+(.+)$").unwrap(),
            structural_start: Regex::new(r"^(#{1,6}\s|[-*+]\s|\d+[.)]\s)").unwrap(),
        }
    }

    /// Parse text into an ordered block sequence.
    pub fn parse(&self, text: &str) -> Vec<ContentBlock> {
        let lines: Vec<&str> = text.trim().split('\n').map(str::trim).collect();
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            i += 1;

            if line.is_empty() {
                continue;
            }

            if let Some(block) = self.parse_structural(line) {
                blocks.push(block);
                continue;
            }

            let mut para_lines = vec![line];
            while i < lines.len() && !lines[i].is_empty() && !self.starts_structural(lines[i]) {
                para_lines.push(lines[i]);
                i += 1;
            }
            blocks.push(ContentBlock::paragraph(para_lines.join(" ")));
        }

        log::debug!("Parsed {} markdown blocks", blocks.len());
        blocks
    }

    /// Classify a single non-blank line as heading, bullet or numbered item.
    fn parse_structural(&self, line: &str) -> Option<ContentBlock> {
        if let Some(caps) = self.heading.captures(line) {
            let level = caps[1].len() as u8;
            return Some(ContentBlock::heading(caps[2].trim(), level));
        }
        if let Some(caps) = self.bullet.captures(line) {
            return Some(ContentBlock::bullet(caps[1].trim()));
        }
        if let Some(caps) = self.numbered.captures(line) {
            return Some(ContentBlock::numbered(caps[1].trim()));
        }
        None
    }

    fn starts_structural(&self, line: &str) -> bool {
        self.structural_start.is_match(line)
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;

    fn triples(blocks: &[ContentBlock]) -> Vec<(BlockKind, u8, &str)> {
        blocks
            .iter()
            .map(|b| (b.kind, b.level, b.text.as_str()))
            .collect()
    }

    #[test]
    fn test_scenario_heading_paragraph_bullets() {
        let blocks = parse_markdown("# Title\n\nSome **bold** text.\n\n- item one\n- item two");
        assert_eq!(
            triples(&blocks),
            vec![
                (BlockKind::Heading, 1, "Title"),
                (BlockKind::Paragraph, 1, "Some **bold** text."),
                (BlockKind::Bullet, 1, "item one"),
                (BlockKind::Bullet, 1, "item two"),
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=6u8 {
            let line = format!("{} Heading {}", "#".repeat(level as usize), level);
            let blocks = parse_markdown(&line);
            assert_eq!(blocks.len(), 1);
            assert_eq!(blocks[0].kind, BlockKind::Heading);
            assert_eq!(blocks[0].level, level);
            assert_eq!(blocks[0].text, format!("Heading {}", level));
        }
    }

    #[test]
    fn test_seven_hashes_is_paragraph() {
        let blocks = parse_markdown("####### Too deep");
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].text, "####### Too deep");
    }

    #[test]
    fn test_hash_without_space_is_paragraph() {
        let blocks = parse_markdown("#hashtag");
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_bullet_markers() {
        let blocks = parse_markdown("- dash\n* star\n+ plus");
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.kind == BlockKind::Bullet));
        assert_eq!(blocks[1].text, "star");
    }

    #[test]
    fn test_bold_line_is_not_bullet() {
        let blocks = parse_markdown("**Bold** opener");
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[0].text, "**Bold** opener");
    }

    #[test]
    fn test_numbered_markers_drop_number() {
        let blocks = parse_markdown("1. first\n7) seventh\n12. twelfth");
        assert_eq!(
            triples(&blocks),
            vec![
                (BlockKind::Numbered, 1, "first"),
                (BlockKind::Numbered, 1, "seventh"),
                (BlockKind::Numbered, 1, "twelfth"),
            ]
        );
    }

    #[test]
    fn test_paragraph_lines_joined() {
        let blocks = parse_markdown("first line\n  second line  \nthird line\n\nnext para");
        assert_eq!(
            triples(&blocks),
            vec![
                (BlockKind::Paragraph, 1, "first line second line third line"),
                (BlockKind::Paragraph, 1, "next para"),
            ]
        );
    }

    #[test]
    fn test_paragraph_terminated_by_structural_line() {
        let blocks = parse_markdown("intro text\n- item\n## Section\nbody");
        assert_eq!(
            triples(&blocks),
            vec![
                (BlockKind::Paragraph, 1, "intro text"),
                (BlockKind::Bullet, 1, "item"),
                (BlockKind::Heading, 2, "Section"),
                (BlockKind::Paragraph, 1, "body"),
            ]
        );
    }

    #[test]
    fn test_blank_and_empty_input() {
        assert!(parse_markdown("").is_empty());
        assert!(parse_markdown("\n\n   \n\t\n").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let blocks = parse_markdown("# Title\r\n\r\nBody\r\n");
        assert_eq!(
            triples(&blocks),
            vec![
                (BlockKind::Heading, 1, "Title"),
                (BlockKind::Paragraph, 1, "Body"),
            ]
        );
    }

    #[test]
    fn test_indented_markers() {
        let blocks = parse_markdown("   - indented item\n   ### Indented heading");
        assert_eq!(blocks[0].kind, BlockKind::Bullet);
        assert_eq!(blocks[1].kind, BlockKind::Heading);
        assert_eq!(blocks[1].level, 3);
    }
}
