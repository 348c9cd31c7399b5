//! DOCX package access.
//!
//! A [`Package`] holds every part of an Office Open XML zip container in
//! memory, in archive order, so parts can be read, patched and written back
//! without touching the ones the converter does not care about.

mod styles;
mod template;
pub(crate) mod xml;

pub use styles::StyleSheet;
pub use template::{Template, BUILTIN_FONT, BUILTIN_STYLE_NAMES};

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// Content type part name.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Relationship type of the main document part.
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type of a footer part.
pub const FOOTER_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";

/// Relationship type of the style sheet part.
pub const STYLES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Content type of a footer part.
pub const FOOTER_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";

/// Content type of a template's main part.
pub const TEMPLATE_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";

/// Content type of a document's main part.
pub const DOCUMENT_MAIN_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// A relationship entry from a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id (e.g., "rId3")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target, relative to the source part's folder
    pub target: String,
    /// Whether the target is outside the package
    pub external: bool,
}

/// An in-memory OPC package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Read a package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Read a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push((entry.name().to_string(), data));
        }
        log::debug!("Read package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// Get a part's bytes.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Get a part as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<&str> {
        let data = self
            .part(name)
            .ok_or_else(|| Error::Package(format!("missing part {}", name)))?;
        std::str::from_utf8(data)
            .map_err(|e| Error::Package(format!("part {} is not UTF-8: {}", name, e)))
    }

    /// Check whether a part exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Insert or replace a part, keeping its position if it already exists.
    pub fn set_part(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) {
        let name = name.into();
        let data = data.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name, data)),
        }
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Path of the main document part.
    pub fn main_document_part(&self) -> Result<String> {
        if !self.has_part("_rels/.rels") {
            return Ok(DEFAULT_MAIN_PART.to_string());
        }
        let rels = self.relationships("")?;
        Ok(rels
            .iter()
            .find(|r| r.rel_type == OFFICE_DOCUMENT_REL)
            .map(|r| resolve_target("", &r.target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Relationships of a part (use `""` for the package root).
    ///
    /// A missing `.rels` part yields no relationships.
    pub fn relationships(&self, source_part: &str) -> Result<Vec<Relationship>> {
        let rels_name = rels_part_name(source_part);
        if !self.has_part(&rels_name) {
            return Ok(Vec::new());
        }
        parse_relationships(self.part_str(&rels_name)?)
    }

    /// Resolve a relationship id of `source_part` to a part name.
    pub fn resolve_relationship(&self, source_part: &str, id: &str) -> Result<Option<String>> {
        Ok(self
            .relationships(source_part)?
            .into_iter()
            .find(|r| r.id == id && !r.external)
            .map(|r| resolve_target(source_part, &r.target)))
    }

    /// Paragraph style sheet of the main document part.
    ///
    /// A package without a style part yields an empty sheet.
    pub fn style_sheet(&self, main_part: &str) -> Result<StyleSheet> {
        let styles_part = self
            .relationships(main_part)?
            .into_iter()
            .find(|r| r.rel_type == STYLES_REL)
            .map(|r| resolve_target(main_part, &r.target))
            .unwrap_or_else(|| "word/styles.xml".to_string());
        if self.has_part(&styles_part) {
            StyleSheet::parse(self.part_str(&styles_part)?)
        } else {
            Ok(StyleSheet::default())
        }
    }

    /// Add a relationship from `source_part` and return its new id.
    pub fn add_relationship(
        &mut self,
        source_part: &str,
        rel_type: &str,
        target: &str,
    ) -> Result<String> {
        let rels_name = rels_part_name(source_part);
        let existing = self.relationships(source_part)?;
        let id = next_relationship_id(&existing);
        let entry = format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            id,
            xml::escape(rel_type),
            xml::escape(target)
        );

        let updated = if self.has_part(&rels_name) {
            insert_before_closing(self.part_str(&rels_name)?, "Relationships", &entry)?
        } else {
            format!(
                r#"{}<Relationships xmlns="{}">{}</Relationships>"#,
                xml::XML_DECL,
                xml::PKG_REL_NS,
                entry
            )
        };
        self.set_part(rels_name, updated);
        Ok(id)
    }

    /// Register a content type override for a part.
    pub fn add_content_type_override(&mut self, part_name: &str, content_type: &str) -> Result<()> {
        let entry = format!(
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            xml::escape(part_name.trim_start_matches('/')),
            xml::escape(content_type)
        );
        let updated = insert_before_closing(self.part_str(CONTENT_TYPES_PART)?, "Types", &entry)?;
        self.set_part(CONTENT_TYPES_PART, updated);
        Ok(())
    }

    /// Rewrite the template main content type as a document main content type.
    ///
    /// Returns `true` if the package was a template.
    pub fn convert_template_content_type(&mut self) -> Result<bool> {
        let types = self.part_str(CONTENT_TYPES_PART)?;
        if !types.contains(TEMPLATE_MAIN_CONTENT_TYPE) {
            return Ok(false);
        }
        let patched = types.replace(TEMPLATE_MAIN_CONTENT_TYPE, DOCUMENT_MAIN_CONTENT_TYPE);
        self.set_part(CONTENT_TYPES_PART, patched);
        Ok(true)
    }

    /// Write the package as a zip archive.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

/// `.rels` part name for a source part (`""` = package root).
fn rels_part_name(source_part: &str) -> String {
    match source_part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if source_part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", source_part),
    }
}

/// Resolve a relationship target against the source part's folder.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn parse_relationships(xml_text: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml_text);
    let mut rels = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                rels.push(Relationship {
                    id: xml::attr(&e, b"Id").unwrap_or_default(),
                    rel_type: xml::attr(&e, b"Type").unwrap_or_default(),
                    target: xml::attr(&e, b"Target").unwrap_or_default(),
                    external: xml::attr(&e, b"TargetMode").as_deref() == Some("External"),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

fn next_relationship_id(existing: &[Relationship]) -> String {
    let max = existing
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let mut n = max + 1;
    while existing.iter().any(|r| r.id == format!("rId{}", n)) {
        n += 1;
    }
    format!("rId{}", n)
}

/// Insert `fragment` before the closing tag of the root element `root`.
fn insert_before_closing(xml_text: &str, root: &str, fragment: &str) -> Result<String> {
    let closing = format!("</{}>", root);
    match xml_text.rfind(&closing) {
        Some(pos) => {
            let mut out = String::with_capacity(xml_text.len() + fragment.len());
            out.push_str(&xml_text[..pos]);
            out.push_str(fragment);
            out.push_str(&xml_text[pos..]);
            Ok(out)
        }
        None => {
            // Self-closing root, e.g. <Types .../>
            let open = format!("<{}", root);
            let start = xml_text
                .find(&open)
                .ok_or_else(|| Error::Package(format!("missing <{}> root", root)))?;
            let end = xml_text[start..]
                .find("/>")
                .map(|i| start + i)
                .ok_or_else(|| Error::Package(format!("malformed <{}> root", root)))?;
            Ok(format!(
                "{}>{}{}{}",
                &xml_text[..end],
                fragment,
                closing,
                &xml_text[end + 2..]
            ))
        }
    }
}
