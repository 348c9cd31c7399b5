//! Style sheet (`word/styles.xml`) lookup.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::xml;
use crate::error::Result;

/// A paragraph style definition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleEntry {
    id: String,
    name: String,
}

/// Paragraph styles of a document, by id and display name.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: Vec<StyleEntry>,
    default_id: Option<String>,
}

impl StyleSheet {
    /// Parse paragraph styles from `styles.xml` content.
    pub fn parse(xml_text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml_text);
        let mut sheet = StyleSheet::default();
        let mut current: Option<(String, bool)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"style" => {
                    let is_paragraph = xml::attr(&e, b"type").as_deref() == Some("paragraph");
                    let id = xml::attr(&e, b"styleId").unwrap_or_default();
                    if is_paragraph && !id.is_empty() {
                        if xml::attr(&e, b"default").is_some_and(|v| v == "1" || v == "true") {
                            sheet.default_id = Some(id.clone());
                        }
                        // Until a w:name shows up, the id doubles as the name
                        sheet.styles.push(StyleEntry {
                            id: id.clone(),
                            name: id.clone(),
                        });
                        current = Some((id, true));
                    } else {
                        current = Some((id, false));
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == b"name" => {
                    if let Some((id, true)) = &current {
                        if let Some(name) = xml::attr(&e, b"val") {
                            if let Some(entry) = sheet.styles.iter_mut().find(|s| &s.id == id) {
                                entry.name = name;
                            }
                        }
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!(
            "Loaded {} paragraph styles (default: {:?})",
            sheet.styles.len(),
            sheet.default_id
        );
        Ok(sheet)
    }

    /// Number of paragraph styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether the sheet has no paragraph styles.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Display name for a style id.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }

    /// Name of the default paragraph style.
    pub fn default_name(&self) -> Option<&str> {
        self.default_id.as_deref().and_then(|id| self.name_of(id))
    }

    /// Effective style name of a paragraph.
    ///
    /// A missing or unknown id falls back to the default paragraph style;
    /// a sheet without one yields the empty name.
    pub fn paragraph_style_name(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.name_of(id))
            .or_else(|| self.default_name())
            .unwrap_or("")
    }

    /// Style id for a display name.
    ///
    /// Exact match first, then case-insensitive; otherwise the name with
    /// whitespace removed, which is how Word derives ids.
    pub fn id_for_name(&self, name: &str) -> String {
        self.styles
            .iter()
            .find(|s| s.name == name)
            .or_else(|| {
                let lower = name.to_lowercase();
                self.styles.iter().find(|s| s.name.to_lowercase() == lower)
            })
            .map(|s| s.id.clone())
            .unwrap_or_else(|| name.chars().filter(|c| !c.is_whitespace()).collect())
    }
}
