//! Footer generation: version, date and page number fields.

use std::ops::Range;

use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::locale::{format_date, Locale};
use crate::package::xml::{self, REL_NS, WML_NS, XML_DECL};
use crate::package::{Package, FOOTER_CONTENT_TYPE, FOOTER_REL};

/// Footer paragraph spacing before, in twips (18pt).
pub const FOOTER_SPACE_BEFORE_TWIPS: u32 = 360;

/// A piece of footer content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FooterSegment {
    /// Literal text
    Text(String),
    /// A field code such as `PAGE`
    Field(&'static str),
}

/// Footer font size in points for a locale.
pub fn footer_font_size_pt(locale: Locale) -> u32 {
    match locale {
        Locale::En => 10,
        Locale::De => 8,
    }
}

/// Footer content for a locale, version label and date.
pub fn footer_segments(locale: Locale, version: Option<&str>, date: NaiveDate) -> Vec<FooterSegment> {
    use FooterSegment::{Field, Text};

    let version = version.map(str::trim).filter(|v| !v.is_empty());
    match locale {
        Locale::En => {
            let prefix = match version {
                Some(v) => format!("Version {} from {}, Page ", v, format_date(date, locale)),
                None => "Page ".to_string(),
            };
            vec![
                Text(prefix),
                Field("PAGE"),
                Text(" (".to_string()),
                Field("NUMPAGES"),
                Text(")".to_string()),
            ]
        }
        Locale::De => {
            let date = format_date(date, locale);
            let prefix = match version {
                Some(v) => format!("Version {} vom {}   Seite ", v, date),
                None => format!("{}   Seite ", date),
            };
            vec![Text(prefix), Field("PAGE"), Text("/".to_string()), Field("SECTIONPAGES")]
        }
    }
}

/// Human-readable footer with fields shown as `{NAME}`.
pub fn footer_text(segments: &[FooterSegment]) -> String {
    segments
        .iter()
        .map(|s| match s {
            FooterSegment::Text(t) => t.clone(),
            FooterSegment::Field(f) => format!("{{{}}}", f),
        })
        .collect()
}

/// The footer paragraph: right-aligned, spaced, one run per segment.
pub fn footer_paragraph_xml(segments: &[FooterSegment], font: &str, size_pt: u32) -> String {
    let rpr = format!(
        r#"<w:rPr><w:rFonts w:ascii="{f}" w:hAnsi="{f}" w:cs="{f}"/><w:color w:val="000000"/><w:sz w:val="{sz}"/></w:rPr>"#,
        f = xml::escape(font),
        sz = size_pt * 2
    );

    let mut runs = String::new();
    for segment in segments {
        match segment {
            FooterSegment::Text(text) => {
                runs.push_str(&format!(
                    r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
                    rpr,
                    xml::escape(text)
                ));
            }
            FooterSegment::Field(name) => {
                runs.push_str(&format!(r#"<w:r>{}<w:fldChar w:fldCharType="begin"/></w:r>"#, rpr));
                runs.push_str(&format!(
                    r#"<w:r>{}<w:instrText xml:space="preserve"> {} </w:instrText></w:r>"#,
                    rpr, name
                ));
                runs.push_str(&format!(r#"<w:r>{}<w:fldChar w:fldCharType="separate"/></w:r>"#, rpr));
                runs.push_str(&format!(r#"<w:r>{}<w:t>1</w:t></w:r>"#, rpr));
                runs.push_str(&format!(r#"<w:r>{}<w:fldChar w:fldCharType="end"/></w:r>"#, rpr));
            }
        }
    }

    format!(
        concat!(
            "<w:p><w:pPr><w:spacing w:before=\"{before}\"/><w:jc w:val=\"right\"/></w:pPr>",
            "{runs}</w:p>"
        ),
        before = FOOTER_SPACE_BEFORE_TWIPS,
        runs = runs,
    )
}

/// Complete footer part XML.
pub fn footer_part_xml(segments: &[FooterSegment], font: &str, size_pt: u32) -> String {
    footer_document(&footer_paragraph_xml(segments, font, size_pt))
}

fn footer_document(paragraph: &str) -> String {
    format!(
        r#"{}<w:ftr xmlns:w="{}" xmlns:r="{}">{}</w:ftr>"#,
        XML_DECL, WML_NS, REL_NS, paragraph
    )
}

/// Put `paragraph` into an existing footer part.
///
/// The first top-level paragraph is replaced and later ones are emptied.
/// Tables, content controls and other footer elements stay in place.
fn replace_footer_paragraphs(footer: &str, paragraph: &str) -> Result<String> {
    let mut reader = Reader::from_str(footer);
    let prefix = loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"ftr" => break xml::prefix_of(&e),
            Event::Empty(e) if e.local_name().as_ref() == b"ftr" => {
                let end = reader.buffer_position() as usize;
                let open = footer[start..end].trim_end_matches("/>").trim_end();
                let prefix = xml::prefix_of(&e);
                return Ok(format!(
                    "{}{}>{}</{}ftr>{}",
                    &footer[..start],
                    open,
                    paragraph_in(prefix.as_deref(), paragraph),
                    prefix_colon(prefix.as_deref()),
                    &footer[end..]
                ));
            }
            Event::Eof => return Err(Error::Package("footer part has no root element".into())),
            _ => {}
        }
    };

    let mut paragraphs: Vec<Range<usize>> = Vec::new();
    let end = loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => {
                reader.read_to_end(e.name())?;
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(start..reader.buffer_position() as usize);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"p" => {
                paragraphs.push(start..reader.buffer_position() as usize);
            }
            Event::End(_) => break start,
            Event::Eof => return Err(Error::Package("unterminated footer part".into())),
            _ => {}
        }
    };

    let new_paragraph = paragraph_in(prefix.as_deref(), paragraph);
    let Some((first, rest)) = paragraphs.split_first() else {
        return Ok(format!("{}{}{}", &footer[..end], new_paragraph, &footer[end..]));
    };

    let empty = format!("<{}p/>", prefix_colon(prefix.as_deref()));
    let mut out = String::with_capacity(footer.len() + new_paragraph.len());
    out.push_str(&footer[..first.start]);
    out.push_str(&new_paragraph);
    let mut cursor = first.end;
    for range in rest {
        out.push_str(&footer[cursor..range.start]);
        out.push_str(&empty);
        cursor = range.end;
    }
    out.push_str(&footer[cursor..]);
    Ok(out)
}

/// `prefix:` for an element prefix, empty for the default namespace.
fn prefix_colon(prefix: Option<&str>) -> String {
    prefix.map_or(String::new(), |p| format!("{}:", p))
}

/// The `w:`-prefixed paragraph, declaring `w` when the part binds it differently.
fn paragraph_in(prefix: Option<&str>, paragraph: &str) -> String {
    if prefix == Some("w") {
        paragraph.to_string()
    } else {
        paragraph.replacen("<w:p>", &format!(r#"<w:p xmlns:w="{}">"#, WML_NS), 1)
    }
}

/// Footer references of the first section.
#[derive(Debug, Default)]
struct SectionFooters {
    /// Byte range of the `sectPr` start tag
    start_tag: Range<usize>,
    self_closing: bool,
    prefix: Option<String>,
    default_id: Option<String>,
    first_id: Option<String>,
}

fn first_section(document: &str) -> Result<Option<SectionFooters>> {
    let mut reader = Reader::from_str(document);
    loop {
        let start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Empty(e) if e.local_name().as_ref() == b"sectPr" => {
                return Ok(Some(SectionFooters {
                    start_tag: start..reader.buffer_position() as usize,
                    self_closing: true,
                    prefix: xml::prefix_of(&e),
                    ..SectionFooters::default()
                }));
            }
            Event::Start(e) if e.local_name().as_ref() == b"sectPr" => {
                let mut section = SectionFooters {
                    start_tag: start..reader.buffer_position() as usize,
                    self_closing: false,
                    prefix: xml::prefix_of(&e),
                    ..SectionFooters::default()
                };
                read_footer_references(&mut reader, &mut section)?;
                return Ok(Some(section));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn read_footer_references(reader: &mut Reader<&[u8]>, section: &mut SectionFooters) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"footerReference" => {
                let id = xml::attr(&e, b"id");
                match xml::attr(&e, b"type").as_deref() {
                    Some("first") => section.first_id = id,
                    Some("default") | None => section.default_id = id,
                    _ => {}
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"sectPr" => return Ok(()),
            Event::Eof => return Err(Error::Package("unterminated section properties".into())),
            _ => {}
        }
    }
}

/// Unused `footerN.xml` part name next to the main part, with its target.
fn next_footer_part(package: &Package, main_part: &str) -> (String, String) {
    let dir = main_part.rsplit_once('/').map_or("", |(dir, _)| dir);
    let mut n = 1;
    loop {
        let target = format!("footer{}.xml", n);
        let part = if dir.is_empty() {
            target.clone()
        } else {
            format!("{}/{}", dir, target)
        };
        if !package.has_part(&part) {
            return (part, target);
        }
        n += 1;
    }
}

/// Replace the default and first-page footers of the first section.
///
/// Footer parts the section does not reference yet are created and
/// referenced. Returns the updated main document XML.
pub(crate) fn apply_footers(
    package: &mut Package,
    main_part: &str,
    document: String,
    paragraph: &str,
) -> Result<String> {
    let Some(section) = first_section(&document)? else {
        return Err(Error::Render("document has no section properties".into()));
    };

    let mut new_refs = String::new();
    let prefix = prefix_colon(section.prefix.as_deref());
    // Attributes need a bound prefix even when sectPr uses the default namespace
    let (attr_prefix, ns) = match section.prefix.as_deref() {
        Some(_) => (prefix.clone(), String::new()),
        None => ("w:".to_string(), format!(r#" xmlns:w="{}""#, WML_NS)),
    };
    let wanted = [("default", &section.default_id), ("first", &section.first_id)];

    for (kind, id) in wanted {
        let existing = match id {
            Some(id) => package.resolve_relationship(main_part, id)?,
            None => None,
        };
        let part = match existing {
            Some(part) => part,
            None => {
                let (part, target) = next_footer_part(package, main_part);
                let id = package.add_relationship(main_part, FOOTER_REL, &target)?;
                package.add_content_type_override(&part, FOOTER_CONTENT_TYPE)?;
                new_refs.push_str(&format!(
                    r#"<{p}footerReference {a}type="{kind}" r:id="{id}"{ns} xmlns:r="{r}"/>"#,
                    p = prefix,
                    a = attr_prefix,
                    kind = kind,
                    id = id,
                    ns = ns,
                    r = REL_NS
                ));
                log::debug!("Created {} footer part {}", kind, part);
                part
            }
        };
        let footer = if package.has_part(&part) {
            replace_footer_paragraphs(package.part_str(&part)?, paragraph)?
        } else {
            footer_document(paragraph)
        };
        // Written now so a second new part gets its own name
        package.set_part(part.clone(), footer);
        log::debug!("Replaced {} footer {}", kind, part);
    }

    if new_refs.is_empty() {
        return Ok(document);
    }

    let tag = &document[section.start_tag.clone()];
    let replacement = if section.self_closing {
        let open = tag.trim_end_matches("/>").trim_end();
        format!("{}>{}</{}sectPr>", open, new_refs, prefix)
    } else {
        format!("{}{}", tag, new_refs)
    };

    let mut out = String::with_capacity(document.len() + new_refs.len() + 16);
    out.push_str(&document[..section.start_tag.start]);
    out.push_str(&replacement);
    out.push_str(&document[section.start_tag.end..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH: &str = "<w:p><w:r><w:t>Footer</w:t></w:r></w:p>";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 19).unwrap()
    }

    #[test]
    fn test_english_footer_with_version() {
        let segments = footer_segments(Locale::En, Some("1.0"), date());
        assert_eq!(
            footer_text(&segments),
            "Version 1.0 from 19th March 2024, Page {PAGE} ({NUMPAGES})"
        );
    }

    #[test]
    fn test_english_footer_without_version() {
        let segments = footer_segments(Locale::En, None, date());
        assert_eq!(footer_text(&segments), "Page {PAGE} ({NUMPAGES})");
    }

    #[test]
    fn test_german_footer_with_version() {
        let segments = footer_segments(Locale::De, Some("2.1"), date());
        assert_eq!(
            footer_text(&segments),
            "Version 2.1 vom 19.03.2024   Seite {PAGE}/{SECTIONPAGES}"
        );
    }

    #[test]
    fn test_german_footer_without_version() {
        let segments = footer_segments(Locale::De, Some("  "), date());
        assert_eq!(footer_text(&segments), "19.03.2024   Seite {PAGE}/{SECTIONPAGES}");
    }

    #[test]
    fn test_footer_font_sizes() {
        assert_eq!(footer_font_size_pt(Locale::En), 10);
        assert_eq!(footer_font_size_pt(Locale::De), 8);
    }

    #[test]
    fn test_footer_part_xml_fields() {
        let segments = footer_segments(Locale::En, None, date());
        let xml = footer_part_xml(&segments, "GT America Light", 10);
        assert!(xml.contains(r#"<w:jc w:val="right"/>"#));
        assert!(xml.contains(r#"<w:spacing w:before="360"/>"#));
        assert!(xml.contains(r#"<w:sz w:val="20"/>"#));
        assert!(xml.contains("> PAGE </w:instrText>"));
        assert!(xml.contains("> NUMPAGES </w:instrText>"));
        assert_eq!(xml.matches(r#"w:fldCharType="begin""#).count(), 2);
        assert_eq!(xml.matches(r#"w:fldCharType="separate""#).count(), 2);
        assert_eq!(xml.matches(r#"w:fldCharType="end""#).count(), 2);
    }

    #[test]
    fn test_apply_footers_creates_missing_references() {
        let mut package = Package::new();
        package.set_part(
            crate::package::CONTENT_TYPES_PART,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"></Types>"#,
        );
        let document = format!(
            r#"<w:document xmlns:w="{}"><w:body><w:p/><w:sectPr/></w:body></w:document>"#,
            WML_NS
        );

        let updated = apply_footers(&mut package, "word/document.xml", document, PARAGRAPH).unwrap();
        assert!(updated.contains(r#"<w:footerReference w:type="default" r:id="rId1""#));
        assert!(updated.contains(r#"<w:footerReference w:type="first" r:id="rId2""#));
        assert!(updated.contains("</w:sectPr></w:body>"));
        for part in ["word/footer1.xml", "word/footer2.xml"] {
            let footer = package.part_str(part).unwrap();
            assert!(footer.contains(&format!("<w:ftr xmlns:w=\"{}\"", WML_NS)));
            assert!(footer.ends_with(&format!("{}</w:ftr>", PARAGRAPH)));
        }
        let types = package.part_str(crate::package::CONTENT_TYPES_PART).unwrap();
        assert!(types.contains(r#"PartName="/word/footer2.xml""#));

        // The rewritten section still parses and now resolves both footers
        let section = first_section(&updated).unwrap().unwrap();
        assert_eq!(section.default_id.as_deref(), Some("rId1"));
        assert_eq!(section.first_id.as_deref(), Some("rId2"));
    }

    #[test]
    fn test_apply_footers_without_section_fails() {
        let mut package = Package::new();
        let document = r#"<w:document xmlns:w="x"><w:body/></w:document>"#.to_string();
        let result = apply_footers(&mut package, "word/document.xml", document, PARAGRAPH);
        assert!(matches!(result, Err(Error::Render(_))));
    }

    #[test]
    fn test_apply_footers_default_namespace_section() {
        let mut package = Package::new();
        package.set_part(
            crate::package::CONTENT_TYPES_PART,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"></Types>"#,
        );
        let document = format!(
            r#"<document xmlns="{}"><body><sectPr/></body></document>"#,
            WML_NS
        );

        let updated = apply_footers(&mut package, "word/document.xml", document, PARAGRAPH).unwrap();
        assert!(updated.contains(&format!(
            r#"<footerReference w:type="default" r:id="rId1" xmlns:w="{}""#,
            WML_NS
        )));
        assert!(updated.contains("</sectPr></body>"));
        assert!(!updated.contains(" type="));

        let section = first_section(&updated).unwrap().unwrap();
        assert_eq!(section.default_id.as_deref(), Some("rId1"));
        assert_eq!(section.first_id.as_deref(), Some("rId2"));
    }

    #[test]
    fn test_existing_footer_keeps_other_elements() {
        let footer = format!(
            concat!(
                r#"<?xml version="1.0"?><w:ftr xmlns:w="{}">"#,
                r#"<w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:t>Old</w:t></w:r></w:p>"#,
                r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Logo</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
                r#"<w:sdt><w:sdtContent><w:p><w:r><w:t>Control</w:t></w:r></w:p></w:sdtContent></w:sdt>"#,
                r#"<w:p><w:r><w:t>Second</w:t></w:r></w:p>"#,
                "</w:ftr>"
            ),
            WML_NS
        );
        let updated = replace_footer_paragraphs(&footer, PARAGRAPH).unwrap();
        assert!(updated.starts_with(r#"<?xml version="1.0"?><w:ftr "#));
        assert!(updated.contains(&format!("\">{}<w:tbl>", PARAGRAPH)));
        assert!(updated.contains("Logo"));
        assert!(updated.contains("Control"));
        assert!(!updated.contains("Old"));
        assert!(!updated.contains("Second"));
        assert!(updated.ends_with("</w:sdt><w:p/></w:ftr>"));
    }

    #[test]
    fn test_existing_footer_without_paragraphs() {
        let footer = format!(
            r#"<w:ftr xmlns:w="{}"><w:sdt><w:sdtContent/></w:sdt></w:ftr>"#,
            WML_NS
        );
        let updated = replace_footer_paragraphs(&footer, PARAGRAPH).unwrap();
        assert!(updated.ends_with(&format!("</w:sdt>{}</w:ftr>", PARAGRAPH)));

        let footer = format!(r#"<w:ftr xmlns:w="{}"/>"#, WML_NS);
        let updated = replace_footer_paragraphs(&footer, PARAGRAPH).unwrap();
        assert_eq!(
            updated,
            format!(r#"<w:ftr xmlns:w="{}">{}</w:ftr>"#, WML_NS, PARAGRAPH)
        );
    }

    #[test]
    fn test_existing_footer_default_namespace() {
        let footer = format!(r#"<ftr xmlns="{}"><p/><p><r><t>x</t></r></p></ftr>"#, WML_NS);
        let updated = replace_footer_paragraphs(&footer, PARAGRAPH).unwrap();
        assert!(updated.contains(&format!(r#"<w:p xmlns:w="{}"><w:r>"#, WML_NS)));
        assert!(updated.ends_with("</w:p><p/></ftr>"));
    }
}
