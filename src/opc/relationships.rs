//! `.rels` parts

use crate::error::{Error, Result};
use crate::xml::{self, PR};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::io::Write;

/// Well-known relationship types
pub mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

/// A single relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// e.g. "rId1"
    pub id: String,
    pub rel_type: String,
    /// Relative to the source part, or an absolute URL when external
    pub target: String,
    pub external: bool,
}

/// Relationships of one source part, in document order
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    items: Vec<Relationship>,
    /// Highest numeric "rIdN" ever handed out or seen
    high_water: u32,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reader = xml::reader_for(text);
        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e)
                    if e.name().local_name().as_ref() == b"Relationship" =>
                {
                    rels.insert(parse_relationship(&e)?);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new(out);
        xml::write_declaration(&mut writer)?;

        let mut root = BytesStart::new("Relationships");
        root.push_attribute(("xmlns", PR));
        writer.write_event(Event::Start(root))?;

        for rel in &self.items {
            let mut elem = BytesStart::new("Relationship");
            elem.push_attribute(("Id", rel.id.as_str()));
            elem.push_attribute(("Type", rel.rel_type.as_str()));
            elem.push_attribute(("Target", rel.target.as_str()));
            if rel.external {
                elem.push_attribute(("TargetMode", "External"));
            }
            writer.write_event(Event::Empty(elem))?;
        }

        writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    /// First relationship of the given type
    pub fn by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type)
    }

    /// Add an internal relationship and return its new id
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        self.high_water += 1;
        let id = format!("rId{}", self.high_water);
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.items.iter().position(|r| r.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert(&mut self, rel: Relationship) {
        if let Some(n) = rel.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()) {
            self.high_water = self.high_water.max(n);
        }
        self.items.push(rel);
    }
}

fn parse_relationship(element: &BytesStart) -> Result<Relationship> {
    let required = |name: &str| {
        xml::get_attr(element, name).ok_or_else(|| Error::MissingAttribute {
            element: "Relationship".into(),
            attr: name.into(),
        })
    };

    Ok(Relationship {
        id: required("Id")?,
        rel_type: required("Type")?,
        target: required("Target")?,
        external: xml::get_attr(element, "TargetMode").as_deref() == Some("External"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = Relationships::from_xml(SAMPLE).unwrap();

        assert_eq!(rels.len(), 2);
        let doc = rels.by_type(rel_types::OFFICE_DOCUMENT).unwrap();
        assert_eq!(doc.target, "word/document.xml");
        assert!(!doc.external);

        let link = rels.get("rId7").unwrap();
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
        assert!(link.external);
    }

    #[test]
    fn test_new_ids_continue_after_highest() {
        let mut rels = Relationships::from_xml(SAMPLE).unwrap();
        assert_eq!(rels.add(rel_types::NUMBERING, "numbering.xml"), "rId8");

        rels.remove("rId8");
        assert_eq!(rels.add(rel_types::STYLES, "styles.xml"), "rId9");
    }

    #[test]
    fn test_roundtrip() {
        let mut rels = Relationships::new();
        rels.add(rel_types::STYLES, "styles.xml");
        rels.add(rel_types::NUMBERING, "numbering.xml");

        let mut out = Vec::new();
        rels.write_to(&mut out).unwrap();
        let rels2 = Relationships::from_xml(std::str::from_utf8(&out).unwrap()).unwrap();

        assert_eq!(rels2.iter().collect::<Vec<_>>(), rels.iter().collect::<Vec<_>>());
    }
}
