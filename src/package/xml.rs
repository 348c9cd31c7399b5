//! Small WordprocessingML XML helpers shared by the reader and writers.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};

/// WordprocessingML main namespace.
pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace.
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Package relationships namespace (`.rels` parts).
pub const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Standard XML declaration for generated parts.
pub const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Get an attribute value by local name (namespace prefix ignored).
pub fn attr(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| {
            a.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&a.value).into_owned(),
                Cow::into_owned,
            )
        })
}

/// WordprocessingML on/off toggle (`<w:b/>`, `<w:b w:val="0"/>`).
pub fn toggle(e: &BytesStart) -> bool {
    attr(e, b"val").map_or(true, |v| !matches!(v.as_str(), "0" | "false" | "off"))
}

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Decode an entity reference name (`amp`, `#x41`) to its text.
pub fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "amp" => "&".to_string(),
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}

/// Read character content up to the end of the current element.
///
/// Nested elements are skipped; only their text is kept.
pub fn read_text(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Text(e) => text.push_str(&reader.decoder().decode(&e)?),
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                text.push_str(&decode_entity(&entity));
            }
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    return Ok(text);
                }
                depth -= 1;
            }
            Event::Eof => return Err(Error::Package("unexpected end of XML".into())),
            _ => {}
        }
    }
}

/// Element name prefix (`w` for `w:sectPr`), if any.
pub fn prefix_of(e: &BytesStart) -> Option<String> {
    e.name()
        .prefix()
        .map(|p| String::from_utf8_lossy(p.as_ref()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entity() {
        assert_eq!(decode_entity("amp"), "&");
        assert_eq!(decode_entity("#x41"), "A");
        assert_eq!(decode_entity("#228"), "ä");
        assert_eq!(decode_entity("nbsp"), "&nbsp;");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_read_text_with_entities() {
        let xml = r#"<w:t xmlns:w="x">Fish &amp; Chips &#x2014; ok</w:t>"#;
        let mut reader = Reader::from_str(xml);
        match reader.read_event().unwrap() {
            Event::Start(_) => {}
            other => panic!("unexpected event {:?}", other),
        }
        let text = read_text(&mut reader).unwrap();
        assert_eq!(text, "Fish & Chips \u{2014} ok");
    }

    #[test]
    fn test_attr_and_toggle() {
        let xml = r#"<w:b xmlns:w="x" w:val="0"/><w:i xmlns:w="x"/>"#;
        let mut reader = Reader::from_str(xml);
        let mut seen = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Empty(e) => seen.push((attr(&e, b"val"), toggle(&e))),
                Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(seen, vec![(Some("0".to_string()), false), (None, true)]);
    }
}
