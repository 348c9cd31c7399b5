//! JSON rendering for content blocks.

use crate::error::{Error, Result};
use crate::model::ContentBlock;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert blocks to a JSON array.
pub fn to_json(blocks: &[ContentBlock], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(blocks),
        JsonFormat::Compact => serde_json::to_string(blocks),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse blocks back from JSON.
pub fn from_json(json: &str) -> Result<Vec<ContentBlock>> {
    serde_json::from_str(json).map_err(|e| Error::Other(format!("Invalid block JSON: {}", e)))
}
