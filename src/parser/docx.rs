//! Block extraction from existing `.docx` documents.
//!
//! The body is read in document order with a pull parser. Body-level
//! paragraphs and tables become [`ContentBlock`]s; everything else
//! (section properties, content controls, bookmarks) is skipped.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::options::{ExtractOptions, EMU_PER_HALF_POINT};
use super::style::{classify_style, StyleClass};
use crate::error::{Error, Result};
use crate::model::ContentBlock;
use crate::package::xml;
use crate::package::{Package, StyleSheet};

/// Paragraph-level containers whose runs belong to the paragraph text.
const TRANSPARENT_CONTAINERS: &[&[u8]] = &[b"hyperlink", b"ins", b"smartTag", b"fldSimple", b"customXml"];

/// A formatted run as read from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunData {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Direct `w:sz` in half-points
    pub size_half_points: Option<u32>,
}

/// A body paragraph before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParagraphData {
    pub style_id: Option<String>,
    pub runs: Vec<RunData>,
}

impl ParagraphData {
    fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Largest direct run size in EMU (0 when no run sets a size).
    fn max_size_emu(&self) -> u32 {
        self.runs
            .iter()
            .filter_map(|r| r.size_half_points)
            .max()
            .map_or(0, |hp| hp.saturating_mul(EMU_PER_HALF_POINT))
    }
}

/// A body-level element in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BodyElement {
    Paragraph(ParagraphData),
    Table(Vec<Vec<String>>),
}

/// Extracts content blocks from a document package.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor {
    options: ExtractOptions,
}

impl DocxExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Extraction options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract blocks from a `.docx` file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ContentBlock>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        self.extract(&Package::open(path)?)
    }

    /// Extract blocks from `.docx` bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Vec<ContentBlock>> {
        self.extract(&Package::from_bytes(data)?)
    }

    /// Extract blocks from an opened package.
    pub fn extract(&self, package: &Package) -> Result<Vec<ContentBlock>> {
        let main_part = package.main_document_part()?;
        let styles = package.style_sheet(&main_part)?;
        let elements = read_body(package.part_str(&main_part)?)?;

        let blocks: Vec<ContentBlock> = elements
            .into_iter()
            .filter_map(|element| self.to_block(element, &styles))
            .collect();
        log::debug!("Extracted {} blocks from {}", blocks.len(), main_part);
        Ok(blocks)
    }

    fn to_block(&self, element: BodyElement, styles: &StyleSheet) -> Option<ContentBlock> {
        match element {
            BodyElement::Paragraph(para) => {
                let name = styles.paragraph_style_name(para.style_id.as_deref());
                self.paragraph_block(&para, name)
            }
            BodyElement::Table(rows) if self.options.include_tables && !rows.is_empty() => {
                Some(ContentBlock::table(rows))
            }
            BodyElement::Table(_) => None,
        }
    }

    /// Classify one paragraph given its effective style name.
    pub(crate) fn paragraph_block(&self, para: &ParagraphData, style_name: &str) -> Option<ContentBlock> {
        let plain = para.plain_text();
        let plain = plain.trim();
        if plain.is_empty() {
            return None;
        }

        let class = classify_style(style_name);
        log::trace!("Style {:?} classified as {:?}", style_name, class);

        let body_text = || {
            if self.options.reconstruct_inline {
                markup_text(&para.runs)
            } else {
                plain.to_string()
            }
        };

        let block = match class {
            StyleClass::Heading(level) => ContentBlock::heading(body_text(), level),
            StyleClass::Generic => match self
                .options
                .heading_thresholds
                .level_for(para.max_size_emu())
            {
                Some(level) => ContentBlock::heading(body_text(), level),
                None => ContentBlock::paragraph(body_text()),
            },
            StyleClass::Bullet => ContentBlock::bullet(body_text()),
            StyleClass::Numbered => ContentBlock::numbered(body_text()),
            StyleClass::Paragraph => ContentBlock::paragraph(body_text()),
        };
        Some(block)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Plain,
    Bold,
    Italic,
    Underline,
}

impl Emphasis {
    fn of(run: &RunData) -> Self {
        if run.bold {
            Emphasis::Bold
        } else if run.italic {
            Emphasis::Italic
        } else if run.underline {
            Emphasis::Underline
        } else {
            Emphasis::Plain
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Emphasis::Plain => "",
            Emphasis::Bold => "**",
            Emphasis::Italic => "*",
            Emphasis::Underline => "__",
        }
    }
}

/// Rebuild inline markup from run formatting.
///
/// Adjacent runs with the same emphasis are merged so that a word split
/// across runs becomes one span. Touching spans of one kind therefore
/// collapse: `**a****b**` comes back as `**ab**`.
pub(crate) fn markup_text(runs: &[RunData]) -> String {
    let mut groups: Vec<(Emphasis, String)> = Vec::new();
    for run in runs.iter().filter(|r| !r.text.is_empty()) {
        let emphasis = Emphasis::of(run);
        match groups.last_mut() {
            Some((last, text)) if *last == emphasis => text.push_str(&run.text),
            _ => groups.push((emphasis, run.text.clone())),
        }
    }

    let mut out = String::new();
    for (emphasis, text) in &groups {
        let marker = emphasis.marker();
        out.push_str(marker);
        out.push_str(text);
        out.push_str(marker);
    }
    out.trim().to_string()
}

/// Read the body-level paragraphs and tables of a document part.
pub(crate) fn read_body(document: &str) -> Result<Vec<BodyElement>> {
    let mut reader = Reader::from_str(document);

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"body" => break,
            Event::Empty(e) if e.local_name().as_ref() == b"body" => return Ok(Vec::new()),
            Event::Eof => return Err(Error::Package("document has no body".into())),
            _ => {}
        }
    }

    let mut elements = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => elements.push(BodyElement::Paragraph(read_paragraph(&mut reader)?)),
                b"tbl" => elements.push(BodyElement::Table(read_table(&mut reader)?)),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                elements.push(BodyElement::Paragraph(ParagraphData::default()));
            }
            Event::End(_) => break,
            Event::Eof => return Err(Error::Package("unterminated document body".into())),
            _ => {}
        }
    }

    Ok(elements)
}

fn read_paragraph(reader: &mut Reader<&[u8]>) -> Result<ParagraphData> {
    let mut para = ParagraphData::default();
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"pPr" => para.style_id = read_paragraph_style(reader)?,
                b"r" => para.runs.push(read_run(reader)?),
                name if TRANSPARENT_CONTAINERS.contains(&name) => depth += 1,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(_) => {
                if depth == 0 {
                    return Ok(para);
                }
                depth -= 1;
            }
            Event::Eof => return Err(Error::Package("unterminated paragraph".into())),
            _ => {}
        }
    }
}

/// Read `w:pPr`, returning the `w:pStyle` id.
fn read_paragraph_style(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut style = None;
    loop {
        match reader.read_event()? {
            Event::Empty(e) if e.local_name().as_ref() == b"pStyle" => {
                style = xml::attr(&e, b"val");
            }
            Event::Start(e) => {
                if e.local_name().as_ref() == b"pStyle" {
                    style = xml::attr(&e, b"val");
                }
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(style),
            Event::Eof => return Err(Error::Package("unterminated paragraph properties".into())),
            _ => {}
        }
    }
}

fn read_run(reader: &mut Reader<&[u8]>) -> Result<RunData> {
    let mut run = RunData::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPr" => read_run_properties(reader, &mut run)?,
                b"t" => run.text.push_str(&xml::read_text(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => run.text.push('\t'),
                b"br" => {
                    let kind = xml::attr(&e, b"type");
                    if matches!(kind.as_deref(), None | Some("textWrapping")) {
                        run.text.push('\n');
                    }
                }
                b"cr" => run.text.push('\n'),
                _ => {}
            },
            Event::End(_) => return Ok(run),
            Event::Eof => return Err(Error::Package("unterminated run".into())),
            _ => {}
        }
    }
}

fn read_run_properties(reader: &mut Reader<&[u8]>, run: &mut RunData) -> Result<()> {
    loop {
        let (e, has_children) = match reader.read_event()? {
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(Error::Package("unterminated run properties".into())),
            _ => continue,
        };
        match e.local_name().as_ref() {
            b"b" => run.bold = xml::toggle(&e),
            b"i" => run.italic = xml::toggle(&e),
            b"u" => run.underline = xml::attr(&e, b"val").map_or(true, |v| v != "none"),
            b"sz" => {
                run.size_half_points = xml::attr(&e, b"val").and_then(|v| v.parse::<u32>().ok());
            }
            _ => {}
        }
        if has_children {
            reader.read_to_end(e.name())?;
        }
    }
}

/// A table cell before grid expansion.
#[derive(Debug, Default)]
struct CellData {
    text: String,
    grid_span: usize,
    continues_merge: bool,
}

fn read_table(reader: &mut Reader<&[u8]>) -> Result<Vec<Vec<String>>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"tr" => {
                let cells = read_row(reader)?;
                if cells.is_empty() {
                    continue;
                }
                let row = expand_row(cells, rows.last().map(Vec::as_slice));
                rows.push(row);
            }
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(rows),
            Event::Eof => return Err(Error::Package("unterminated table".into())),
            _ => {}
        }
    }
}

/// Lay cells out on the grid: spans repeat the cell, vertical merge
/// continuations take the text of the cell above.
fn expand_row(cells: Vec<CellData>, previous: Option<&[String]>) -> Vec<String> {
    let mut row = Vec::new();
    for cell in cells {
        for _ in 0..cell.grid_span.max(1) {
            let text = if cell.continues_merge {
                previous
                    .and_then(|prev| prev.get(row.len()))
                    .cloned()
                    .unwrap_or_default()
            } else {
                cell.text.clone()
            };
            row.push(text);
        }
    }
    row
}

fn read_row(reader: &mut Reader<&[u8]>) -> Result<Vec<CellData>> {
    let mut cells = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"tc" => cells.push(read_cell(reader)?),
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(cells),
            Event::Eof => return Err(Error::Package("unterminated table row".into())),
            _ => {}
        }
    }
}

fn read_cell(reader: &mut Reader<&[u8]>) -> Result<CellData> {
    let mut cell = CellData {
        grid_span: 1,
        ..CellData::default()
    };
    let mut paragraphs: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tcPr" => read_cell_properties(reader, &mut cell)?,
                b"p" => paragraphs.push(read_paragraph(reader)?.plain_text()),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"p" => paragraphs.push(String::new()),
            Event::End(_) => break,
            Event::Eof => return Err(Error::Package("unterminated table cell".into())),
            _ => {}
        }
    }

    cell.text = paragraphs.join("\n").trim().to_string();
    Ok(cell)
}

fn read_cell_properties(reader: &mut Reader<&[u8]>, cell: &mut CellData) -> Result<()> {
    loop {
        let (e, has_children) = match reader.read_event()? {
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(Error::Package("unterminated cell properties".into())),
            _ => continue,
        };
        match e.local_name().as_ref() {
            b"gridSpan" => {
                cell.grid_span = xml::attr(&e, b"val")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1);
            }
            b"vMerge" => {
                cell.continues_merge = xml::attr(&e, b"val").map_or(true, |v| v == "continue");
            }
            _ => {}
        }
        if has_children {
            reader.read_to_end(e.name())?;
        }
    }
}
