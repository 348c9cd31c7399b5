//! Input format and language detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::locale::Locale;
use crate::package::Package;

/// Kind of input a path or byte buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Markdown-like plain text
    Markdown,
    /// A WordprocessingML package
    Docx,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Markdown => f.write_str("markdown"),
            InputFormat::Docx => f.write_str("docx"),
        }
    }
}

/// Zip local file header magic.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Extensions always treated as documents.
pub const DOCX_EXTENSIONS: &[&str] = &["docx", "docm", "dotx"];

/// Detect the input format of a file.
///
/// The extension decides first; otherwise a zip archive containing a main
/// document part is a document and anything else is markdown.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<InputFormat> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }

    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| DOCX_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);
    if by_extension {
        return Ok(InputFormat::Docx);
    }

    let mut header = [0u8; 4];
    let read = File::open(path)?.read(&mut header)?;
    if &header[..read] != ZIP_MAGIC {
        return Ok(InputFormat::Markdown);
    }
    detect_format_from_bytes(&std::fs::read(path)?)
}

/// Detect the input format of a byte buffer.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<InputFormat> {
    Ok(if is_docx_bytes(data) {
        InputFormat::Docx
    } else {
        InputFormat::Markdown
    })
}

/// Check whether bytes are a zip package with a `word/document.xml` part.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
        && Package::from_bytes(data)
            .map(|p| p.has_part("word/document.xml"))
            .unwrap_or(false)
}

/// Function words that are frequent in German prose.
pub const GERMAN_MARKERS: &[&str] = &[
    "der", "die", "das", "und", "oder", "für", "über", "aber", "nach", "mit", "von", "bei",
    "seit", "wird", "werden", "haben", "sein", "einen", "einer", "eines", "einem", "nicht",
    "auch", "sich", "dass", "diese", "dieser", "dieses", "diesem", "können", "müssen", "sollen",
    "zwischen", "durch", "bereits", "sowie", "jedoch", "gegenüber", "während", "innerhalb",
    "außerdem", "grundsätzlich",
];

/// Share of marker words above which text counts as German.
pub const GERMAN_RATIO_THRESHOLD: f64 = 0.03;

fn word_pattern() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(r"\b\w+\b").unwrap())
}

/// Guess the document language from its text.
///
/// Text without words is English.
pub fn detect_language(text: &str) -> Locale {
    let lower = text.to_lowercase();
    let mut total = 0usize;
    let mut german = 0usize;
    for word in word_pattern().find_iter(&lower) {
        total += 1;
        if GERMAN_MARKERS.contains(&word.as_str()) {
            german += 1;
        }
    }

    if total == 0 {
        return Locale::En;
    }
    let ratio = german as f64 / total as f64;
    log::debug!(
        "Language markers: {}/{} words ({:.3})",
        german,
        total,
        ratio
    );
    if ratio > GERMAN_RATIO_THRESHOLD {
        Locale::De
    } else {
        Locale::En
    }
}
