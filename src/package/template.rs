//! Base layout templates.

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::xml::{self, PKG_REL_NS, REL_NS, WML_NS, XML_DECL};
use super::{
    Package, StyleSheet, CONTENT_TYPES_PART, DOCUMENT_MAIN_CONTENT_TYPE, FOOTER_CONTENT_TYPE,
    FOOTER_REL, OFFICE_DOCUMENT_REL, STYLES_REL,
};
use crate::error::{Error, Result};

/// Brand paragraph styles of the built-in template as `(style id, name)`,
/// in the order heading, subheading, paragraph, bullet, numbered.
pub const BUILTIN_STYLE_NAMES: [(&str, &str); 5] = [
    ("BrandHeading", "Brand - Überschrift"),
    ("BrandSubheading", "Brand - Unterüberschrift"),
    ("BrandParagraph", "Brand - Paragraph"),
    ("BrandList", "Brand - Auflistung"),
    ("BrandEnumeration", "Brand - Aufzählung"),
];

/// Font used by the built-in template.
pub const BUILTIN_FONT: &str = "GT America Light";

/// A4 width minus 1" margins, in twips.
const DEFAULT_BLOCK_WIDTH: u32 = 9026;

/// A document package used as the base layout for rendering.
#[derive(Debug, Clone)]
pub struct Template {
    package: Package,
    main_part: String,
    styles: StyleSheet,
    block_width: u32,
}

impl Template {
    /// Open a `.dotx`/`.docx` template from disk.
    ///
    /// Template packages are converted to document packages in memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::TemplateMissing(path.to_path_buf()));
        }
        log::debug!("Loading template {}", path.display());
        Self::from_package(Package::open(path)?)
    }

    /// Load a template from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// Wrap a package as a template.
    pub fn from_package(mut package: Package) -> Result<Self> {
        if package.convert_template_content_type()? {
            log::debug!("Converted template content type to document");
        }
        let main_part = package.main_document_part()?;
        if !package.has_part(&main_part) {
            return Err(Error::Package(format!("missing main part {}", main_part)));
        }

        let styles = package.style_sheet(&main_part)?;

        let block_width = block_width_twips(package.part_str(&main_part)?)?;

        Ok(Self {
            package,
            main_part,
            styles,
            block_width,
        })
    }

    /// The built-in brand template.
    pub fn builtin() -> Result<Self> {
        let mut package = Package::new();
        package.set_part(CONTENT_TYPES_PART, builtin_content_types());
        package.set_part("_rels/.rels", builtin_package_rels());
        package.set_part("word/document.xml", builtin_document());
        package.set_part("word/_rels/document.xml.rels", builtin_document_rels());
        package.set_part("word/styles.xml", builtin_styles());
        package.set_part("word/footer1.xml", empty_footer());
        package.set_part("word/footer2.xml", empty_footer());
        Self::from_package(package)
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Take the underlying package.
    pub fn into_package(self) -> Package {
        self.package
    }

    /// Name of the main document part.
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// The template's paragraph styles.
    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Text block width (page width minus side margins) in twips.
    pub fn block_width_twips(&self) -> u32 {
        self.block_width
    }
}

/// Page width minus left and right margins of the first section.
fn block_width_twips(document: &str) -> Result<u32> {
    let mut reader = Reader::from_str(document);
    let mut page_width = None;
    let mut margins = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"pgSz" if page_width.is_none() => {
                    page_width = xml::attr(&e, b"w").and_then(|v| v.parse::<u32>().ok());
                }
                b"pgMar" if margins.is_none() => {
                    let left = xml::attr(&e, b"left").and_then(|v| v.parse::<u32>().ok());
                    let right = xml::attr(&e, b"right").and_then(|v| v.parse::<u32>().ok());
                    margins = Some(left.unwrap_or(0) + right.unwrap_or(0));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        if page_width.is_some() && margins.is_some() {
            break;
        }
    }

    Ok(match (page_width, margins) {
        (Some(width), Some(margins)) if width > margins => width - margins,
        _ => DEFAULT_BLOCK_WIDTH,
    })
}

fn builtin_content_types() -> String {
    format!(
        concat!(
            "{decl}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/word/document.xml\" ContentType=\"{main}\"/>",
            "<Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>",
            "<Override PartName=\"/word/footer1.xml\" ContentType=\"{footer}\"/>",
            "<Override PartName=\"/word/footer2.xml\" ContentType=\"{footer}\"/>",
            "</Types>"
        ),
        decl = XML_DECL,
        main = DOCUMENT_MAIN_CONTENT_TYPE,
        footer = FOOTER_CONTENT_TYPE,
    )
}

fn builtin_package_rels() -> String {
    format!(
        "{}<Relationships xmlns=\"{}\"><Relationship Id=\"rId1\" Type=\"{}\" Target=\"word/document.xml\"/></Relationships>",
        XML_DECL, PKG_REL_NS, OFFICE_DOCUMENT_REL
    )
}

fn builtin_document_rels() -> String {
    format!(
        concat!(
            "{decl}<Relationships xmlns=\"{ns}\">",
            "<Relationship Id=\"rId1\" Type=\"{styles}\" Target=\"styles.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"{footer}\" Target=\"footer1.xml\"/>",
            "<Relationship Id=\"rId3\" Type=\"{footer}\" Target=\"footer2.xml\"/>",
            "</Relationships>"
        ),
        decl = XML_DECL,
        ns = PKG_REL_NS,
        styles = STYLES_REL,
        footer = FOOTER_REL,
    )
}

fn builtin_document() -> String {
    format!(
        concat!(
            "{decl}<w:document xmlns:w=\"{w}\" xmlns:r=\"{r}\"><w:body>",
            "<w:sectPr>",
            "<w:footerReference w:type=\"default\" r:id=\"rId2\"/>",
            "<w:footerReference w:type=\"first\" r:id=\"rId3\"/>",
            "<w:pgSz w:w=\"11906\" w:h=\"16838\"/>",
            "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" ",
            "w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/>",
            "<w:titlePg/>",
            "</w:sectPr>",
            "</w:body></w:document>"
        ),
        decl = XML_DECL,
        w = WML_NS,
        r = REL_NS,
    )
}

fn builtin_styles() -> String {
    let [heading, subheading, paragraph, bullet, numbered] = BUILTIN_STYLE_NAMES;
    let mut out = format!(
        concat!(
            "{decl}<w:styles xmlns:w=\"{w}\">",
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            "<w:rFonts w:ascii=\"{font}\" w:hAnsi=\"{font}\" w:cs=\"{font}\"/>",
            "<w:sz w:val=\"22\"/><w:szCs w:val=\"22\"/><w:lang w:val=\"de-DE\"/>",
            "</w:rPr></w:rPrDefault></w:docDefaults>",
            "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\">",
            "<w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
            "<w:style w:type=\"character\" w:default=\"1\" w:styleId=\"DefaultParagraphFont\">",
            "<w:name w:val=\"Default Paragraph Font\"/><w:uiPriority w:val=\"1\"/><w:semiHidden/></w:style>"
        ),
        decl = XML_DECL,
        w = WML_NS,
        font = BUILTIN_FONT,
    );
    out.push_str(&brand_style(heading, "<w:spacing w:before=\"240\" w:after=\"120\"/>", "<w:b/><w:sz w:val=\"32\"/>"));
    out.push_str(&brand_style(subheading, "<w:spacing w:before=\"200\" w:after=\"80\"/>", "<w:b/><w:sz w:val=\"26\"/>"));
    out.push_str(&brand_style(paragraph, "<w:spacing w:after=\"120\"/>", "<w:sz w:val=\"22\"/>"));
    out.push_str(&brand_style(bullet, "<w:ind w:left=\"360\" w:hanging=\"360\"/>", "<w:sz w:val=\"22\"/>"));
    out.push_str(&brand_style(numbered, "<w:ind w:left=\"360\" w:hanging=\"360\"/>", "<w:sz w:val=\"22\"/>"));
    out.push_str("</w:styles>");
    out
}

fn brand_style((id, name): (&str, &str), ppr: &str, rpr: &str) -> String {
    format!(
        concat!(
            "<w:style w:type=\"paragraph\" w:customStyle=\"1\" w:styleId=\"{id}\">",
            "<w:name w:val=\"{name}\"/><w:basedOn w:val=\"Normal\"/><w:qFormat/>",
            "<w:pPr>{ppr}</w:pPr><w:rPr>{rpr}</w:rPr></w:style>"
        ),
        id = id,
        name = xml::escape(name),
        ppr = ppr,
        rpr = rpr,
    )
}

fn empty_footer() -> String {
    format!(
        "{}<w:ftr xmlns:w=\"{}\" xmlns:r=\"{}\"><w:p/></w:ftr>",
        XML_DECL, WML_NS, REL_NS
    )
}
