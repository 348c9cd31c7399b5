//! Rendering module: content blocks to DOCX, Markdown and JSON.

mod docx;
pub mod footer;
mod json;
mod markdown;
mod options;

pub use docx::{save_package, to_docx, write_docx, DocxRenderer};
pub use footer::{footer_segments, footer_text, FooterSegment};
pub use json::{from_json, to_json, JsonFormat};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::{RenderOptions, StyleNames};
