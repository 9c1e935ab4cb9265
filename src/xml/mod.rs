//! XML utilities and raw element preservation for round-trip support

mod namespace;
mod raw;

pub use namespace::*;
pub use raw::{RawXmlElement, RawXmlNode};

use crate::error::Result;
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Reader over a part's text.
///
/// Text is never trimmed: `w:t` content is significant down to the last
/// space, and whitespace between elements is kept by raw nodes.
pub fn reader_for(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader
}

/// Write the standard `<?xml ... standalone="yes"?>` declaration
pub fn write_declaration<W: std::io::Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(())
}

/// All attributes of a tag as (qualified name, unescaped value) pairs
pub fn attributes_of(element: &BytesStart) -> Result<Vec<(String, String)>> {
    element
        .attributes()
        .map(|a| {
            let a = a?;
            Ok((
                String::from_utf8_lossy(a.key.as_ref()).into_owned(),
                a.unescape_value()?.into_owned(),
            ))
        })
        .collect()
}

/// Helper to get attribute value from BytesStart
pub fn get_attr(element: &BytesStart, name: &str) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse an OOXML on/off value ("1", "true", "on", or a missing val)
pub fn parse_bool(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => matches!(v, "1" | "true" | "on"),
    }
}
