//! `[Content_Types].xml`

use crate::error::{Error, Result};
use crate::opc::PartUri;
use crate::xml::{self, CT};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;
use std::io::Write;

pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const XML: &str = "application/xml";
pub const MAIN_DOCUMENT: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const NUMBERING: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";

/// Content type table: extension defaults plus per-part overrides
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<PartUri, String>,
}

impl ContentTypes {
    /// Table with the defaults every package needs
    pub fn new() -> Self {
        let mut ct = Self::default();
        ct.add_default("rels", RELATIONSHIPS);
        ct.add_default("xml", XML);
        ct
    }

    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reader = xml::reader_for(text);
        let mut ct = Self::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => match e.name().local_name().as_ref() {
                    b"Default" => {
                        let ext = required_attr(&e, "Extension")?;
                        ct.add_default(&ext, &required_attr(&e, "ContentType")?);
                    }
                    b"Override" => {
                        let uri = PartUri::new(&required_attr(&e, "PartName")?)?;
                        ct.add_override(&uri, &required_attr(&e, "ContentType")?);
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(ct)
    }

    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new(out);
        xml::write_declaration(&mut writer)?;

        let mut types = BytesStart::new("Types");
        types.push_attribute(("xmlns", CT));
        writer.write_event(Event::Start(types))?;

        for (ext, content_type) in &self.defaults {
            let mut elem = BytesStart::new("Default");
            elem.push_attribute(("Extension", ext.as_str()));
            elem.push_attribute(("ContentType", content_type.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        for (uri, content_type) in &self.overrides {
            let mut elem = BytesStart::new("Override");
            elem.push_attribute(("PartName", uri.as_str()));
            elem.push_attribute(("ContentType", content_type.as_str()));
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Types")))?;
        Ok(())
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_lowercase(), content_type.to_string());
    }

    pub fn add_override(&mut self, uri: &PartUri, content_type: &str) {
        self.overrides.insert(uri.clone(), content_type.to_string());
    }

    pub fn remove_override(&mut self, uri: &PartUri) -> Option<String> {
        self.overrides.remove(uri)
    }

    /// Override first, then the extension default
    pub fn get(&self, uri: &PartUri) -> Option<&str> {
        self.overrides
            .get(uri)
            .or_else(|| {
                uri.extension()
                    .and_then(|ext| self.defaults.get(&ext.to_lowercase()))
            })
            .map(String::as_str)
    }
}

fn required_attr(element: &BytesStart, name: &str) -> Result<String> {
    xml::get_attr(element, name).ok_or_else(|| Error::MissingAttribute {
        element: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
        attr: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_types() {
        let text = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="XML" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

        let ct = ContentTypes::from_xml(text).unwrap();

        let doc_uri = PartUri::new("/word/document.xml").unwrap();
        assert_eq!(ct.get(&doc_uri), Some(MAIN_DOCUMENT));
        let styles = PartUri::new("/word/styles.xml").unwrap();
        assert_eq!(ct.get(&styles), Some(XML));
    }

    #[test]
    fn test_missing_attribute() {
        let text = r#"<Types><Default Extension="rels"/></Types>"#;
        assert!(matches!(
            ContentTypes::from_xml(text),
            Err(Error::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_roundtrip() {
        let mut ct = ContentTypes::new();
        let numbering = PartUri::new("/word/numbering.xml").unwrap();
        ct.add_override(&numbering, NUMBERING);

        let mut out = Vec::new();
        ct.write_to(&mut out).unwrap();
        let ct2 = ContentTypes::from_xml(std::str::from_utf8(&out).unwrap()).unwrap();

        assert_eq!(ct2.get(&numbering), Some(NUMBERING));
    }
}
