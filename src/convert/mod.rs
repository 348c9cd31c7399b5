//! Input sources: a registry that turns files into content blocks.
//!
//! Each [`BlockSource`] handles a set of file extensions. The registry
//! dispatches by extension, sniffs the content when the extension is not
//! registered, and falls back to the markdown source.
//!
//! # Example
//!
//! ```no_run
//! use brandoc::convert::SourceRegistry;
//! use std::path::Path;
//!
//! fn main() -> brandoc::Result<()> {
//!     let registry = SourceRegistry::with_defaults();
//!     let blocks = registry.load(Path::new("notes.md"))?;
//!     println!("{} blocks", blocks.len());
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::detect::{detect_format_from_bytes, InputFormat};
use crate::error::{Error, Result};
use crate::model::ContentBlock;
use crate::package::Template;
use crate::parser::{parse_markdown, DocxExtractor, ExtractOptions};
use crate::render::RenderOptions;

/// A producer of content blocks for one input format.
pub trait BlockSource: Send + Sync {
    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Name of this source.
    fn name(&self) -> &str;

    /// Load blocks from raw file content.
    fn load_bytes(&self, bytes: &[u8]) -> Result<Vec<ContentBlock>>;

    /// Load blocks from a file.
    fn load(&self, path: &Path) -> Result<Vec<ContentBlock>> {
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        self.load_bytes(&fs::read(path)?)
    }

    /// Check if this source supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Markdown-like text input.
#[derive(Debug, Clone, Default)]
pub struct MarkdownSource;

impl MarkdownSource {
    /// Create a markdown source.
    pub fn new() -> Self {
        Self
    }
}

impl BlockSource for MarkdownSource {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown", "txt"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<Vec<ContentBlock>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::Other(format!("Input is not valid UTF-8: {}", e)))?;
        Ok(parse_markdown(text.trim_start_matches('\u{feff}')))
    }
}

/// Existing `.docx` documents, re-extracted into blocks.
#[derive(Debug, Clone, Default)]
pub struct DocxSource {
    extractor: DocxExtractor,
}

impl DocxSource {
    /// Create a docx source with the given extraction options.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            extractor: DocxExtractor::new(options),
        }
    }
}

impl BlockSource for DocxSource {
    fn supported_extensions(&self) -> &[&str] {
        &["docx", "docm", "dotx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<Vec<ContentBlock>> {
        self.extractor.extract_bytes(bytes)
    }
}

/// Registry of block sources keyed by extension.
pub struct SourceRegistry {
    sources: HashMap<String, Arc<dyn BlockSource>>,
    by_name: HashMap<String, Arc<dyn BlockSource>>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the markdown and docx sources.
    pub fn with_defaults() -> Self {
        Self::with_extract_options(ExtractOptions::default())
    }

    /// Default sources, with custom options for docx extraction.
    pub fn with_extract_options(options: ExtractOptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MarkdownSource::new()));
        registry.register(Arc::new(DocxSource::new(options)));
        registry
    }

    /// Register a source for all its extensions.
    pub fn register(&mut self, source: Arc<dyn BlockSource>) {
        for ext in source.supported_extensions() {
            self.sources.insert(ext.to_lowercase(), source.clone());
        }
        self.by_name.insert(source.name().to_lowercase(), source);
    }

    /// Get a source by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn BlockSource>> {
        self.sources.get(&ext.to_lowercase()).cloned()
    }

    /// Get a source by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn BlockSource>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is registered.
    pub fn supports(&self, ext: &str) -> bool {
        self.sources.contains_key(&ext.to_lowercase())
    }

    /// Get all registered extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.sources.keys().map(|s| s.as_str()).collect()
    }

    /// Pick the source for a file: extension first, then content sniffing.
    pub fn source_for(&self, path: &Path, bytes: &[u8]) -> Result<Arc<dyn BlockSource>> {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.get_by_extension(ext));
        if let Some(source) = by_ext {
            return Ok(source);
        }

        let name = match detect_format_from_bytes(bytes)? {
            InputFormat::Docx => "docx",
            InputFormat::Markdown => "markdown",
        };
        self.get_by_name(name)
            .ok_or_else(|| Error::Other(format!("No source registered for {}", name)))
    }

    /// Load blocks from a file using the matching source.
    pub fn load(&self, path: &Path) -> Result<Vec<ContentBlock>> {
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        let source = self.source_for(path, &bytes)?;
        log::debug!("Loading {} with {} source", path.display(), source.name());
        source.load_bytes(&bytes)
    }

    /// Load blocks from in-memory markdown text.
    pub fn load_text(&self, text: &str) -> Result<Vec<ContentBlock>> {
        let source = self
            .get_by_name("markdown")
            .ok_or_else(|| Error::Other("No markdown source registered".into()))?;
        source.load_bytes(text.as_bytes())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Options for a full input-to-document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Options for re-extracting `.docx` input
    pub extract: ExtractOptions,

    /// Options for the rendered document
    pub render: RenderOptions,

    /// Title inserted as a level-1 heading when the input has none
    pub title: Option<String>,

    /// Template file (the built-in template when `None`)
    pub template: Option<PathBuf>,
}

impl ConvertOptions {
    /// Create new convert options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, extract: ExtractOptions) -> Self {
        self.extract = extract;
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the template path.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Load the configured template.
    ///
    /// An explicit path must exist; without one the built-in template is used.
    pub fn load_template(&self) -> Result<Template> {
        match &self.template {
            Some(path) => Template::open(path),
            None => Template::builtin(),
        }
    }
}

/// Insert `title` as a level-1 heading at the front.
///
/// Nothing is inserted when the title is blank or the blocks already
/// contain a top-level heading.
pub fn insert_title(blocks: &mut Vec<ContentBlock>, title: &str) -> bool {
    let title = title.trim();
    if title.is_empty() || blocks.iter().any(ContentBlock::is_top_heading) {
        return false;
    }
    blocks.insert(0, ContentBlock::heading(title, 1));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;

    #[test]
    fn test_registry_with_defaults() {
        let registry = SourceRegistry::with_defaults();
        assert!(registry.supports("md"));
        assert!(registry.supports("DOCX"));
        assert!(registry.supports("dotx"));
        assert!(!registry.supports("pdf"));
    }

    #[test]
    fn test_registry_get_by_extension() {
        let registry = SourceRegistry::with_defaults();
        let source = registry.get_by_extension("markdown");
        assert!(source.is_some());
        assert_eq!(source.unwrap().name(), "markdown");
        assert_eq!(registry.get_by_name("DOCX").unwrap().name(), "docx");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_markdown() {
        let registry = SourceRegistry::with_defaults();
        let source = registry
            .source_for(Path::new("notes.rst"), b"# Title")
            .unwrap();
        assert_eq!(source.name(), "markdown");

        let source = registry.source_for(Path::new("README"), b"").unwrap();
        assert_eq!(source.name(), "markdown");
    }

    #[test]
    fn test_load_text() {
        let registry = SourceRegistry::with_defaults();
        let blocks = registry.load_text("# A\n\nbody").unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading);
    }

    #[test]
    fn test_markdown_source_strips_bom() {
        let blocks = MarkdownSource::new()
            .load_bytes("\u{feff}# Title".as_bytes())
            .unwrap();
        assert_eq!(blocks, vec![ContentBlock::heading("Title", 1)]);
    }

    #[test]
    fn test_markdown_source_rejects_invalid_utf8() {
        let result = MarkdownSource::new().load_bytes(&[0xff, 0xfe, 0x41]);
        assert!(matches!(result, Err(Error::Other(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let registry = SourceRegistry::with_defaults();
        let result = registry.load(Path::new("/nonexistent/input.md"));
        assert!(matches!(result, Err(Error::InputNotFound(_))));
    }

    #[test]
    fn test_convert_options_template() {
        let options = ConvertOptions::new();
        assert!(options.load_template().is_ok());

        let options = ConvertOptions::new()
            .with_title("T")
            .with_template("/nonexistent/brand.dotx");
        assert_eq!(options.title.as_deref(), Some("T"));
        assert!(matches!(
            options.load_template(),
            Err(Error::TemplateMissing(_))
        ));
    }

    #[test]
    fn test_insert_title() {
        let mut blocks = vec![ContentBlock::paragraph("body")];
        assert!(insert_title(&mut blocks, "Report"));
        assert_eq!(blocks[0], ContentBlock::heading("Report", 1));

        // Already has a top-level heading
        assert!(!insert_title(&mut blocks, "Other"));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_insert_title_with_only_subheadings() {
        let mut blocks = vec![ContentBlock::heading("Sub", 2)];
        assert!(insert_title(&mut blocks, "Main"));
        assert_eq!(blocks[0].level, 1);
        assert!(!insert_title(&mut Vec::new(), "   "));
    }
}
