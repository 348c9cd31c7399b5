//! Paragraph style classification.
//!
//! Maps a paragraph's style name (English or German template vocabulary) to
//! the block taxonomy. Rules are evaluated top to bottom and the first
//! matching rule decides; generic styles defer to the run font size.

use crate::model::BlockKind;

/// Outcome of classifying a style name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleClass {
    /// Explicit heading style with its level
    Heading(u8),
    /// Generic body style; structure must be inferred from font size
    Generic,
    /// Bulleted list style
    Bullet,
    /// Numbered list style
    Numbered,
    /// Any other named style
    Paragraph,
}

impl StyleClass {
    /// Block kind for this class, if it is decided without font sizes.
    pub fn block_kind(&self) -> Option<BlockKind> {
        match self {
            StyleClass::Heading(_) => Some(BlockKind::Heading),
            StyleClass::Bullet => Some(BlockKind::Bullet),
            StyleClass::Numbered => Some(BlockKind::Numbered),
            StyleClass::Paragraph => Some(BlockKind::Paragraph),
            StyleClass::Generic => None,
        }
    }
}

/// Style names treated as generic body text.
pub const GENERIC_STYLE_NAMES: &[&str] = &["normal", "body text", "default paragraph font", ""];

const HEADING_MARKERS: &[&str] = &["heading", "überschrift"];
const SUBHEADING_MARKERS: &[&str] = &["unter", "zwischen", "2"];
const BULLET_MARKERS: &[&str] = &["list", "bullet", "auflistung"];
const NUMBERED_MARKERS: &[&str] = &["number", "aufzählung"];

type Rule = (fn(&str) -> bool, fn(&str) -> StyleClass);

/// Ordered `(predicate, outcome)` table over lowercase style names.
const RULES: &[Rule] = &[
    (is_heading_style, heading_class),
    (is_generic_style, |_| StyleClass::Generic),
    (is_bullet_style, |_| StyleClass::Bullet),
    (is_numbered_style, |_| StyleClass::Numbered),
];

/// Classify a style name. Matching is case-insensitive.
pub fn classify_style(style_name: &str) -> StyleClass {
    let name = style_name.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&name))
        .map(|(_, outcome)| outcome(&name))
        .unwrap_or(StyleClass::Paragraph)
}

fn contains_any(name: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| name.contains(m))
}

fn is_heading_style(name: &str) -> bool {
    contains_any(name, HEADING_MARKERS)
}

fn is_generic_style(name: &str) -> bool {
    GENERIC_STYLE_NAMES.contains(&name)
}

fn is_bullet_style(name: &str) -> bool {
    contains_any(name, BULLET_MARKERS)
}

fn is_numbered_style(name: &str) -> bool {
    contains_any(name, NUMBERED_MARKERS)
}

fn heading_class(name: &str) -> StyleClass {
    StyleClass::Heading(heading_level(name))
}

/// Heading level from secondary markers in a heading style name.
fn heading_level(name: &str) -> u8 {
    if contains_any(name, SUBHEADING_MARKERS) {
        2
    } else if name.contains('3') {
        3
    } else {
        1
    }
}
