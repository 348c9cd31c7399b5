//! Rendering options and configuration.

use crate::locale::Locale;
use crate::model::{BlockKind, ContentBlock};
use crate::package::{BUILTIN_FONT, BUILTIN_STYLE_NAMES};

/// Paragraph style names used for each block kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNames {
    /// Level-1 headings
    pub heading: String,
    /// Headings below level 1
    pub subheading: String,
    /// Body paragraphs
    pub paragraph: String,
    /// Bullet items
    pub bullet: String,
    /// Numbered items
    pub numbered: String,
}

impl StyleNames {
    /// Style name for a non-table block.
    pub fn for_block(&self, block: &ContentBlock) -> &str {
        match block.kind {
            BlockKind::Heading if block.level <= 1 => &self.heading,
            BlockKind::Heading => &self.subheading,
            BlockKind::Bullet => &self.bullet,
            BlockKind::Numbered => &self.numbered,
            BlockKind::Paragraph | BlockKind::Table => &self.paragraph,
        }
    }
}

impl Default for StyleNames {
    fn default() -> Self {
        let [heading, subheading, paragraph, bullet, numbered] = BUILTIN_STYLE_NAMES;
        Self {
            heading: heading.1.to_string(),
            subheading: subheading.1.to_string(),
            paragraph: paragraph.1.to_string(),
            bullet: bullet.1.to_string(),
            numbered: numbered.1.to_string(),
        }
    }
}

/// Options for rendering blocks into a document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Paragraph style names
    pub styles: StyleNames,

    /// Font for table cells and footers
    pub body_font: String,

    /// Document language (detected from the content when `None`)
    pub locale: Option<Locale>,

    /// Version label shown in the footer
    pub version: Option<String>,

    /// Footer date as given by the user (today when absent or unparseable)
    pub date: Option<String>,

    /// Table cell font size in points
    pub table_font_size_pt: u32,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set paragraph style names.
    pub fn with_styles(mut self, styles: StyleNames) -> Self {
        self.styles = styles;
        self
    }

    /// Set the body font.
    pub fn with_body_font(mut self, font: impl Into<String>) -> Self {
        self.body_font = font.into();
        self
    }

    /// Force the document language.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Set the version label.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the footer date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            styles: StyleNames::default(),
            body_font: BUILTIN_FONT.to_string(),
            locale: None,
            version: None,
            date: None,
            table_font_size_pt: 11,
        }
    }
}
