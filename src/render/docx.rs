//! DOCX rendering: content blocks onto a template.
//!
//! The template's main part is edited in place. Its body-level paragraphs
//! and tables are dropped (except paragraphs that carry section
//! properties), the generated content goes in front of the final section
//! properties, and the first section's footers are replaced.

use std::ops::Range;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tempfile::NamedTempFile;

use super::footer::{apply_footers, footer_font_size_pt, footer_paragraph_xml, footer_segments};
use super::{RenderOptions, StyleNames};
use crate::detect::detect_language;
use crate::error::{Error, Result};
use crate::locale::{parse_date, Locale};
use crate::model::{joined_text, BlockKind, ContentBlock};
use crate::package::xml::{self, WML_NS};
use crate::package::{Package, StyleSheet, Template};
use crate::parser::tokenize_inline;

/// Render blocks onto a template, returning the finished package.
pub fn to_docx(blocks: &[ContentBlock], template: &Template, options: &RenderOptions) -> Result<Package> {
    DocxRenderer::new(options.clone()).render(blocks, template)
}

/// Render blocks onto a template and write the result to `path`.
pub fn write_docx<P: AsRef<Path>>(
    blocks: &[ContentBlock],
    template: &Template,
    options: &RenderOptions,
    path: P,
) -> Result<()> {
    let package = to_docx(blocks, template, options)?;
    save_package(&package, path)
}

/// Write a package atomically.
///
/// The archive goes to a temporary file in the destination directory and
/// is renamed into place only once it is complete.
pub fn save_package<P: AsRef<Path>>(package: &Package, path: P) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    package.write_to(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Renders content blocks into a template package.
pub struct DocxRenderer {
    options: RenderOptions,
}

impl DocxRenderer {
    /// Create a new DOCX renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Language used for the footer: the forced one, or detected from the blocks.
    pub fn resolve_locale(&self, blocks: &[ContentBlock]) -> Locale {
        self.options
            .locale
            .unwrap_or_else(|| detect_language(&joined_text(blocks)))
    }

    /// Render blocks into a copy of the template package.
    pub fn render(&self, blocks: &[ContentBlock], template: &Template) -> Result<Package> {
        let locale = self.resolve_locale(blocks);
        let main_part = template.main_part();
        let mut package = template.package().clone();
        let document = package.part_str(main_part)?;

        let layout = BodyLayout::scan(document)?;
        let writer = BlockWriter {
            sheet: template.styles(),
            names: &self.options.styles,
            ns: if layout.prefix.as_deref() == Some("w") {
                String::new()
            } else {
                format!(r#" xmlns:w="{}""#, WML_NS)
            },
            font: xml::escape(&self.options.body_font).into_owned(),
            table_size_half_points: self.options.table_font_size_pt * 2,
            block_width: template.block_width_twips(),
        };

        let mut content = String::new();
        for block in blocks {
            writer.write_block(&mut content, block);
        }
        log::debug!(
            "Rendering {} blocks ({}), dropping {} template elements",
            blocks.len(),
            locale,
            layout.removals.len()
        );

        let document = layout.splice(document, &content);

        let date = parse_date(self.options.date.as_deref());
        let segments = footer_segments(locale, self.options.version.as_deref(), date);
        let footer = footer_paragraph_xml(&segments, &self.options.body_font, footer_font_size_pt(locale));
        let document = apply_footers(&mut package, main_part, document, &footer)?;

        package.set_part(main_part, document);
        Ok(package)
    }
}

/// Where content is removed from and inserted into the template body.
#[derive(Debug)]
struct BodyLayout {
    prefix: Option<String>,
    removals: Vec<Range<usize>>,
    insert_at: usize,
}

impl BodyLayout {
    fn scan(document: &str) -> Result<Self> {
        let mut reader = Reader::from_str(document);
        let prefix = loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"body" => break xml::prefix_of(&e),
                Event::Eof => return Err(Error::Render("template has no document body".into())),
                _ => {}
            }
        };

        let mut removals = Vec::new();
        let mut section_start = None;
        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"p" => {
                        let keep = contains_section(&mut reader)?;
                        if !keep {
                            removals.push(start..reader.buffer_position() as usize);
                        }
                    }
                    b"tbl" => {
                        reader.read_to_end(e.name())?;
                        removals.push(start..reader.buffer_position() as usize);
                    }
                    b"sectPr" => {
                        section_start.get_or_insert(start);
                        reader.read_to_end(e.name())?;
                    }
                    _ => {
                        reader.read_to_end(e.name())?;
                    }
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"p" => removals.push(start..reader.buffer_position() as usize),
                    b"sectPr" => {
                        section_start.get_or_insert(start);
                    }
                    _ => {}
                },
                Event::End(_) => {
                    return Ok(Self {
                        prefix,
                        removals,
                        insert_at: section_start.unwrap_or(start),
                    });
                }
                Event::Eof => return Err(Error::Render("unterminated document body".into())),
                _ => {}
            }
        }
    }

    /// Apply the removals and insert `content`.
    fn splice(&self, document: &str, content: &str) -> String {
        let mut out = String::with_capacity(document.len() + content.len());
        let mut cursor = 0;
        let mut inserted = false;
        for range in &self.removals {
            if !inserted && self.insert_at <= range.start {
                out.push_str(&document[cursor..self.insert_at]);
                out.push_str(content);
                cursor = self.insert_at;
                inserted = true;
            }
            out.push_str(&document[cursor..range.start]);
            cursor = range.end;
        }
        if !inserted {
            out.push_str(&document[cursor..self.insert_at]);
            out.push_str(content);
            cursor = self.insert_at;
        }
        out.push_str(&document[cursor..]);
        out
    }
}

/// Consume a paragraph, reporting whether it holds section properties.
fn contains_section(reader: &mut Reader<&[u8]>) -> Result<bool> {
    let mut depth = 0usize;
    let mut found = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                found |= e.local_name().as_ref() == b"sectPr";
                depth += 1;
            }
            Event::Empty(e) => found |= e.local_name().as_ref() == b"sectPr",
            Event::End(_) => {
                if depth == 0 {
                    return Ok(found);
                }
                depth -= 1;
            }
            Event::Eof => return Err(Error::Render("unterminated paragraph".into())),
            _ => {}
        }
    }
}

struct BlockWriter<'a> {
    sheet: &'a StyleSheet,
    names: &'a StyleNames,
    /// Namespace declaration added to top-level elements
    ns: String,
    font: String,
    table_size_half_points: u32,
    block_width: u32,
}

impl BlockWriter<'_> {
    fn write_block(&self, out: &mut String, block: &ContentBlock) {
        match block.kind {
            BlockKind::Table => self.write_table(out, block.rows()),
            _ => {
                let style_id = self.sheet.id_for_name(self.names.for_block(block));
                self.write_paragraph(out, &style_id, &block.text);
            }
        }
    }

    fn write_paragraph(&self, out: &mut String, style_id: &str, text: &str) {
        out.push_str(&format!(
            r#"<w:p{}><w:pPr><w:pStyle w:val="{}"/></w:pPr>"#,
            self.ns,
            xml::escape(style_id)
        ));
        for run in tokenize_inline(text).iter().filter(|r| !r.is_empty()) {
            out.push_str("<w:r>");
            if run.has_styling() {
                out.push_str("<w:rPr>");
                if run.bold {
                    out.push_str("<w:b/>");
                }
                if run.italic {
                    out.push_str("<w:i/>");
                }
                if run.underline {
                    out.push_str(r#"<w:u w:val="single"/>"#);
                }
                out.push_str("</w:rPr>");
            }
            push_run_text(out, &run.text);
            out.push_str("</w:r>");
        }
        out.push_str("</w:p>");
    }

    fn write_table(&self, out: &mut String, rows: &[Vec<String>]) {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return;
        }
        let col_width = self.block_width / cols as u32;

        out.push_str(&format!(
            concat!(
                "<w:tbl{}><w:tblPr><w:tblW w:type=\"auto\" w:w=\"0\"/>",
                "<w:tblLook w:firstColumn=\"1\" w:firstRow=\"1\" w:lastColumn=\"0\" ",
                "w:lastRow=\"0\" w:noHBand=\"0\" w:noVBand=\"1\" w:val=\"04A0\"/></w:tblPr><w:tblGrid>"
            ),
            self.ns
        ));
        for _ in 0..cols {
            out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, col_width));
        }
        out.push_str("</w:tblGrid>");

        for (i, row) in rows.iter().enumerate() {
            out.push_str("<w:tr>");
            for j in 0..cols {
                out.push_str(&format!(
                    r#"<w:tc><w:tcPr><w:tcW w:type="dxa" w:w="{}"/></w:tcPr>"#,
                    col_width
                ));
                match row.get(j) {
                    Some(text) => {
                        let bold = i == 0 || (cols == 2 && j == 0);
                        self.write_cell_paragraph(out, text, bold);
                    }
                    None => out.push_str("<w:p/>"),
                }
                out.push_str("</w:tc>");
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl>");
    }

    fn write_cell_paragraph(&self, out: &mut String, text: &str, bold: bool) {
        out.push_str(&format!(
            r#"<w:p><w:r><w:rPr><w:rFonts w:ascii="{f}" w:hAnsi="{f}"/>{b}<w:color w:val="000000"/><w:sz w:val="{sz}"/></w:rPr>"#,
            f = self.font,
            b = if bold { "<w:b/>" } else { "" },
            sz = self.table_size_half_points
        ));
        push_run_text(out, text);
        out.push_str("</w:r></w:p>");
    }
}

/// Run content: text segments, with tabs and line breaks as elements.
fn push_run_text(out: &mut String, text: &str) {
    let mut segment = String::new();
    let flush = |out: &mut String, segment: &mut String| {
        if !segment.is_empty() {
            out.push_str(&format!(
                r#"<w:t xml:space="preserve">{}</w:t>"#,
                xml::escape(segment)
            ));
            segment.clear();
        }
    };
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush(out, &mut segment);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(out, &mut segment);
                out.push_str("<w:br/>");
            }
            '\r' => {}
            c => segment.push(c),
        }
    }
    flush(out, &mut segment);
}
