//! Parsers that turn markdown text or existing documents into content blocks.

mod docx;
mod inline;
mod markdown;
mod options;
mod style;

pub use docx::DocxExtractor;
pub use inline::tokenize_inline;
pub use markdown::{parse_markdown, MarkdownParser};
pub use options::{
    ExtractOptions, HeadingThresholds, EMU_PER_HALF_POINT, EMU_PER_POINT, LEVEL1_THRESHOLD_EMU,
    LEVEL2_THRESHOLD_EMU,
};
pub use style::{classify_style, StyleClass, GENERIC_STYLE_NAMES};
