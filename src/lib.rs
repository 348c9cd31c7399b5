//! # brandoc
//!
//! Turn markdown-like notes into branded Word documents.
//!
//! Input text (or an existing `.docx`) becomes an ordered sequence of
//! content blocks, which are then rendered onto a template with the
//! template's brand paragraph styles and a localized page footer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use brandoc::Brandoc;
//!
//! fn main() -> brandoc::Result<()> {
//!     Brandoc::new()
//!         .with_title("Quarterly Report")
//!         .with_version("1.2")
//!         .load("notes.md")?
//!         .write("report.docx")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Markdown-lite input**: headings, paragraphs, bullet and numbered
//!   lists, `**bold**`, `*italic*` and `__underline__`
//! - **DOCX re-extraction**: existing documents are reclassified into the
//!   same blocks by style name and font size
//! - **Templates**: any `.dotx`/`.docx` with the brand styles, or the
//!   built-in one
//! - **Localized footers**: English and German, detected from the content

pub mod convert;
pub mod detect;
pub mod error;
pub mod locale;
pub mod model;
pub mod package;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{insert_title, BlockSource, ConvertOptions, SourceRegistry};
pub use detect::{detect_format_from_bytes, detect_format_from_path, detect_language, InputFormat};
pub use error::{Error, Result};
pub use locale::Locale;
pub use model::{BlockKind, ContentBlock, InlineRun};
pub use package::{Package, Template};
pub use parser::{tokenize_inline, DocxExtractor, ExtractOptions, HeadingThresholds};
pub use render::{JsonFormat, RenderOptions, StyleNames};

use std::path::Path;

/// Parse markdown-like text into content blocks.
///
/// # Example
///
/// ```
/// use brandoc::{parse_markdown, BlockKind};
///
/// let blocks = parse_markdown("# Title\n\n- item");
/// assert_eq!(blocks[0].kind, BlockKind::Heading);
/// assert_eq!(blocks[1].kind, BlockKind::Bullet);
/// ```
pub fn parse_markdown(text: &str) -> Vec<ContentBlock> {
    parser::parse_markdown(text)
}

/// Extract content blocks from an existing `.docx` file.
///
/// # Example
///
/// ```no_run
/// let blocks = brandoc::extract_file("existing.docx").unwrap();
/// println!("{} blocks", blocks.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Vec<ContentBlock>> {
    DocxExtractor::default().extract_file(path)
}

/// Load any supported input file into content blocks.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<ContentBlock>> {
    SourceRegistry::with_defaults().load(path.as_ref())
}

/// Render blocks onto the built-in template and write `output`.
///
/// # Example
///
/// ```no_run
/// use brandoc::{build_document, parse_markdown, RenderOptions};
///
/// let blocks = parse_markdown("# Hello\n\nWorld");
/// build_document(&blocks, &RenderOptions::default(), "hello.docx").unwrap();
/// ```
pub fn build_document<P: AsRef<Path>>(
    blocks: &[ContentBlock],
    options: &RenderOptions,
    output: P,
) -> Result<()> {
    let template = Template::builtin()?;
    render::write_docx(blocks, &template, options, output)
}

/// Builder for converting input into a branded document.
///
/// # Example
///
/// ```no_run
/// use brandoc::{Brandoc, Locale};
///
/// let result = Brandoc::new()
///     .with_template("brand.dotx")
///     .with_locale(Locale::De)
///     .with_date("2025-02-15")
///     .load("notes.md")?;
/// println!("{}", result.to_markdown());
/// result.write("notes.docx")?;
/// # Ok::<(), brandoc::Error>(())
/// ```
pub struct Brandoc {
    options: ConvertOptions,
}

impl Brandoc {
    /// Create a new Brandoc builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Use all settings from prepared options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the template file.
    pub fn with_template(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.options = self.options.with_template(path);
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options = self.options.with_title(title);
        self
    }

    /// Set the footer version label.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.options.render = self.options.render.with_version(version);
        self
    }

    /// Set the footer date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.options.render = self.options.render.with_date(date);
        self
    }

    /// Force the document language.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.options.render = self.options.render.with_locale(locale);
        self
    }

    /// Set the heading thresholds used when re-extracting `.docx` input.
    pub fn with_heading_thresholds(mut self, thresholds: HeadingThresholds) -> Self {
        self.options.extract = self.options.extract.with_heading_thresholds(thresholds);
        self
    }

    /// Set paragraph style names.
    pub fn with_styles(mut self, styles: StyleNames) -> Self {
        self.options.render = self.options.render.with_styles(styles);
        self
    }

    /// Load an input file and return a result wrapper.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<BrandocResult> {
        let registry = SourceRegistry::with_extract_options(self.options.extract.clone());
        let blocks = registry.load(path.as_ref())?;
        Ok(self.finish(blocks))
    }

    /// Parse in-memory markdown text.
    pub fn load_text(self, text: &str) -> Result<BrandocResult> {
        let blocks = SourceRegistry::with_defaults().load_text(text)?;
        Ok(self.finish(blocks))
    }

    /// Use blocks that were produced elsewhere.
    pub fn with_blocks(self, blocks: Vec<ContentBlock>) -> BrandocResult {
        self.finish(blocks)
    }

    fn finish(self, mut blocks: Vec<ContentBlock>) -> BrandocResult {
        if let Some(title) = &self.options.title {
            if insert_title(&mut blocks, title) {
                log::debug!("Inserted title heading");
            }
        }
        BrandocResult {
            blocks,
            options: self.options,
        }
    }
}

impl Default for Brandoc {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocks ready to be rendered.
pub struct BrandocResult {
    /// The content blocks, title included
    pub blocks: Vec<ContentBlock>,
    options: ConvertOptions,
}

impl BrandocResult {
    /// Language the footer will use.
    pub fn locale(&self) -> Locale {
        render::DocxRenderer::new(self.options.render.clone()).resolve_locale(&self.blocks)
    }

    /// Render into an in-memory package.
    pub fn to_package(&self) -> Result<Package> {
        let template = self.options.load_template()?;
        render::to_docx(&self.blocks, &template, &self.options.render)
    }

    /// Render and write the document to `output`.
    ///
    /// Nothing is written when rendering fails.
    pub fn write<P: AsRef<Path>>(&self, output: P) -> Result<()> {
        let package = self.to_package()?;
        render::save_package(&package, output)
    }

    /// Serialize the blocks back to markdown.
    pub fn to_markdown(&self) -> String {
        render::to_markdown(&self.blocks)
    }

    /// Serialize the blocks to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.blocks, format)
    }

    /// Get the blocks.
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brandoc_builder() {
        let builder = Brandoc::new()
            .with_title("Report")
            .with_version("2.0")
            .with_locale(Locale::De);

        assert_eq!(builder.options.title.as_deref(), Some("Report"));
        assert_eq!(builder.options.render.version.as_deref(), Some("2.0"));
        assert_eq!(builder.options.render.locale, Some(Locale::De));
    }

    #[test]
    fn test_brandoc_builder_default() {
        let builder = Brandoc::default();
        assert!(builder.options.title.is_none());
        assert!(builder.options.template.is_none());
        assert!(builder.options.render.locale.is_none());
    }

    #[test]
    fn test_load_text_inserts_title() {
        let result = Brandoc::new()
            .with_title("Report")
            .load_text("Body text.")
            .unwrap();
        assert_eq!(result.blocks[0], ContentBlock::heading("Report", 1));
        assert_eq!(result.blocks.len(), 2);
    }

    #[test]
    fn test_load_text_keeps_existing_title() {
        let result = Brandoc::new()
            .with_title("Report")
            .load_text("# Own Title\n\nBody")
            .unwrap();
        assert_eq!(result.blocks[0].text, "Own Title");
        assert_eq!(result.blocks.len(), 2);
    }

    #[test]
    fn test_load_missing_input() {
        let result = Brandoc::new().load("/nonexistent/notes.md");
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_missing_template_fails_render() {
        let result = Brandoc::new()
            .with_template("/nonexistent/brand.dotx")
            .load_text("# Title")
            .unwrap();
        assert!(matches!(result.to_package(), Err(Error::TemplateMissing(_))));
    }

    #[test]
    fn test_locale_detection() {
        let result = Brandoc::new()
            .load_text("Das ist der Bericht und die Zahlen sind gut.")
            .unwrap();
        assert_eq!(result.locale(), Locale::De);

        let result = Brandoc::new()
            .with_locale(Locale::En)
            .load_text("Das ist der Bericht und die Zahlen sind gut.")
            .unwrap();
        assert_eq!(result.locale(), Locale::En);
    }

    #[test]
    fn test_result_serializers() {
        let result = Brandoc::new().load_text("# T\n\n- a").unwrap();
        assert_eq!(result.to_markdown(), "# T\n\n- a\n");
        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json.starts_with('['));
    }

    #[test]
    fn test_parse_markdown_reexport() {
        let blocks = parse_markdown("1. one\n2. two");
        assert_eq!(model::count_kind(&blocks, BlockKind::Numbered), 2);
    }
}
