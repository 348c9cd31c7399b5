//! Error types for brandoc library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for brandoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading input or building a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The template asset does not exist.
    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    /// Neither an input file nor piped content was provided.
    #[error("No input provided. Use --input or pipe content via stdin.")]
    NoInput,

    /// Error reading or writing the zip container.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error parsing WordprocessingML.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute.
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// The package is structurally invalid (missing part, bad relationship).
    #[error("Invalid document package: {0}")]
    Package(String),

    /// Error during rendering (DOCX, Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Unknown language code.
    #[error("Unsupported language: {0} (expected 'en' or 'de')")]
    InvalidLocale(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::encoding::EncodingError> for Error {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Error::Xml(quick_xml::Error::Encoding(err))
    }
}
