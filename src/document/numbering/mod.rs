//! Numbering definitions (numbering.xml)
//!
//! Definitions are kept verbatim; new lists are added with ids above every
//! id seen so far, so an id is never handed out twice.

mod abstract_num;
mod level;
mod num;
mod types;

pub use abstract_num::AbstractNum;
pub use level::Level;
pub use num::Num;
pub use types::{ListHandle, ListStyle, NumberFormat};

use super::NUMBERING_PART;
use crate::error::{Error, Result};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::BTreeMap;

/// Numbering definitions from numbering.xml
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numbering {
    root_name: String,
    root_attrs: Vec<(String, String)>,
    /// Children preceding the definitions (`w:numPicBullet`, ...)
    leading: Vec<RawXmlNode>,
    abstract_nums: BTreeMap<u32, AbstractNum>,
    nums: BTreeMap<u32, Num>,
    /// Children following the definitions (`w:numIdMacAtCleanup`, ...)
    trailing: Vec<RawXmlNode>,
    next_abstract_id: u32,
    /// `0` means "no numbering" to a paragraph, so instance ids start at 1
    next_num_id: u32,
}

impl Numbering {
    /// Create empty numbering definitions
    pub fn new() -> Self {
        Numbering {
            root_name: "w:numbering".into(),
            root_attrs: xml::document_namespaces(),
            leading: Vec::new(),
            abstract_nums: BTreeMap::new(),
            nums: BTreeMap::new(),
            trailing: Vec::new(),
            next_abstract_id: 0,
            next_num_id: 1,
        }
    }

    /// Parse numbering.xml content
    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reader = xml::reader_for(text);
        let mut buf = Vec::new();

        let root = loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => break e.into_owned(),
                Event::Empty(e) => {
                    let mut numbering = Self::new();
                    numbering.root_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    numbering.root_attrs = xml::attributes_of(&e)?;
                    return Ok(numbering);
                }
                Event::Eof => return Err(Error::malformed(NUMBERING_PART, "missing w:numbering element")),
                _ => {}
            }
            buf.clear();
        };

        let mut numbering = Self::new();
        numbering.root_name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
        numbering.root_attrs = xml::attributes_of(&root)?;

        loop {
            buf.clear();
            let node = match reader.read_event_into(&mut buf)? {
                Event::Start(e) => RawXmlNode::Element(RawXmlElement::from_reader(&mut reader, &e)?),
                Event::Empty(e) => RawXmlNode::Element(RawXmlElement::from_empty(&e)?),
                Event::Comment(c) => RawXmlNode::Comment(String::from_utf8_lossy(&c).into_owned()),
                Event::End(_) | Event::Eof => break,
                _ => continue,
            };
            numbering.classify(node)?;
        }

        for num in numbering.nums.values() {
            if !numbering.abstract_nums.contains_key(&num.abstract_num_id()) {
                log::warn!(
                    "numbering instance {} references missing abstract definition {}",
                    num.id(),
                    num.abstract_num_id()
                );
            }
        }
        log::debug!(
            "parsed numbering: {} abstract definitions, {} instances",
            numbering.abstract_nums.len(),
            numbering.nums.len()
        );
        Ok(numbering)
    }

    fn classify(&mut self, node: RawXmlNode) -> Result<()> {
        let definitions_seen = !self.abstract_nums.is_empty() || !self.nums.is_empty();
        match node {
            RawXmlNode::Element(raw) if raw.local_name() == "abstractNum" => {
                let abs = AbstractNum::from_raw(raw)?;
                self.next_abstract_id = self.next_abstract_id.max(abs.id() + 1);
                self.abstract_nums.insert(abs.id(), abs);
            }
            RawXmlNode::Element(raw) if raw.local_name() == "num" => {
                let num = Num::from_raw(raw)?;
                self.next_num_id = self.next_num_id.max(num.id() + 1);
                self.nums.insert(num.id(), num);
            }
            other if definitions_seen => self.trailing.push(other),
            other => self.leading.push(other),
        }
        Ok(())
    }

    /// Serialize to XML
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer);
        xml::write_declaration(&mut writer)?;

        let mut start = BytesStart::new(self.root_name.as_str());
        for (key, value) in &self.root_attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(start))?;

        for node in &self.leading {
            node.write_to(&mut writer)?;
        }
        for abs in self.abstract_nums.values() {
            abs.raw.write_to(&mut writer)?;
        }
        for num in self.nums.values() {
            num.raw.write_to(&mut writer)?;
        }
        for node in &self.trailing {
            node.write_to(&mut writer)?;
        }

        writer.write_event(Event::End(BytesEnd::new(self.root_name.as_str())))?;
        String::from_utf8(buffer).map_err(|e| Error::Utf8(e.utf8_error()))
    }

    pub fn abstract_num(&self, id: u32) -> Option<&AbstractNum> {
        self.abstract_nums.get(&id)
    }

    pub fn num(&self, num_id: u32) -> Option<&Num> {
        self.nums.get(&num_id)
    }

    pub fn abstract_nums(&self) -> impl Iterator<Item = &AbstractNum> {
        self.abstract_nums.values()
    }

    pub fn nums(&self) -> impl Iterator<Item = &Num> {
        self.nums.values()
    }

    /// Abstract definition behind instance `num_id`
    pub fn abstract_id_of(&self, num_id: u32) -> Option<u32> {
        self.nums.get(&num_id).map(Num::abstract_num_id)
    }

    /// Get the format for a specific numId and level
    pub fn format(&self, num_id: u32, level: u8) -> Option<NumberFormat> {
        self.abstract_nums.get(&self.abstract_id_of(num_id)?)?.format(level)
    }

    /// Check if a numId represents a bullet list
    pub fn is_bullet_list(&self, num_id: u32) -> bool {
        self.format(num_id, 0).is_some_and(|f| f.is_bullet())
    }

    /// Add a list and return its ids
    pub fn create_list(&mut self, style: ListStyle) -> Result<ListHandle> {
        let (num, abstract_num_id) = match style {
            ListStyle::Bullet | ListStyle::Decimal => {
                let abs_id = self.next_abstract_id;
                self.next_abstract_id += 1;
                let abs = match style {
                    ListStyle::Bullet => AbstractNum::bullet_list(abs_id),
                    _ => AbstractNum::decimal_list(abs_id),
                };
                self.abstract_nums.insert(abs_id, abs);
                (Num::new(self.next_num_id, abs_id), abs_id)
            }
            ListStyle::Restart(abs_id) => {
                if !self.abstract_nums.contains_key(&abs_id) {
                    return Err(Error::IncompatibleList(format!(
                        "abstract numbering definition {} does not exist",
                        abs_id
                    )));
                }
                (Num::restart(self.next_num_id, abs_id), abs_id)
            }
        };
        self.next_num_id += 1;

        let handle = ListHandle {
            num_id: num.id(),
            abstract_num_id,
        };
        self.nums.insert(num.id(), num);
        log::debug!("created list {:?} as {:?}", style, handle);
        Ok(handle)
    }

    /// Check that a paragraph numbered by instance `current` may move to `handle`:
    /// both instances must exist and share one abstract definition.
    pub fn check_compatible(&self, current: u32, handle: &ListHandle) -> Result<()> {
        let target = self
            .abstract_id_of(handle.num_id)
            .filter(|id| *id == handle.abstract_num_id)
            .ok_or_else(|| {
                Error::IncompatibleList(format!("list {} is not defined", handle.num_id))
            })?;
        let existing = self.abstract_id_of(current).ok_or_else(|| {
            Error::IncompatibleList(format!("numbering instance {} is not defined", current))
        })?;

        if existing != target {
            return Err(Error::IncompatibleList(format!(
                "instance {} uses definition {}, list {} uses definition {}",
                current, existing, handle.num_id, target
            )));
        }
        Ok(())
    }
}

impl Default for Numbering {
    fn default() -> Self {
        Self::new()
    }
}

fn required_attr<'a>(raw: &'a RawXmlElement, attr: &str) -> Result<&'a str> {
    raw.attr(attr).ok_or_else(|| Error::MissingAttribute {
        element: raw.name.clone(),
        attr: attr.into(),
    })
}

fn parse_id(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::malformed(NUMBERING_PART, format!("'{}' is not a numbering id", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:numPicBullet w:numPicBulletId="0"><w:pict/></w:numPicBullet>
  <w:abstractNum w:abstractNumId="0">
    <w:multiLevelType w:val="hybridMultilevel"/>
    <w:lvl w:ilvl="0">
      <w:start w:val="1"/>
      <w:numFmt w:val="decimal"/>
      <w:lvlText w:val="%1."/>
      <w:lvlJc w:val="left"/>
    </w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="3">
    <w:lvl w:ilvl="0">
      <w:numFmt w:val="bullet"/>
      <w:lvlText w:val="•"/>
    </w:lvl>
  </w:abstractNum>
  <w:num w:numId="1">
    <w:abstractNumId w:val="0"/>
  </w:num>
  <w:num w:numId="2">
    <w:abstractNumId w:val="3"/>
  </w:num>
  <w:numIdMacAtCleanup w:val="1"/>
</w:numbering>"#;

    #[test]
    fn test_parse_numbering() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();

        assert_eq!(numbering.abstract_nums().count(), 2);
        assert_eq!(numbering.nums().count(), 2);
        assert_eq!(numbering.abstract_id_of(1), Some(0));
        assert_eq!(numbering.format(1, 0), Some(NumberFormat::Decimal));
        assert!(numbering.is_bullet_list(2));
        assert!(!numbering.is_bullet_list(1));
        assert_eq!(numbering.leading.len(), 1);
        assert_eq!(numbering.trailing.len(), 1);
    }

    #[test]
    fn test_roundtrip() {
        let numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        let xml = numbering.to_xml().unwrap();
        assert_eq!(Numbering::from_xml(&xml).unwrap(), numbering);
    }

    #[test]
    fn test_ids_above_existing() {
        let mut numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();

        let bullets = numbering.create_list(ListStyle::Bullet).unwrap();
        assert_eq!(
            bullets,
            ListHandle {
                num_id: 3,
                abstract_num_id: 4
            }
        );
        assert!(numbering.is_bullet_list(bullets.num_id));

        let restart = numbering.create_list(ListStyle::Restart(0)).unwrap();
        assert_eq!(
            restart,
            ListHandle {
                num_id: 4,
                abstract_num_id: 0
            }
        );
        assert_eq!(numbering.num(4).unwrap().start_overrides(), vec![(0, 1)]);

        assert!(matches!(
            numbering.create_list(ListStyle::Restart(42)),
            Err(Error::IncompatibleList(_))
        ));
        // a failed request burns no id
        let decimal = numbering.create_list(ListStyle::Decimal).unwrap();
        assert_eq!(decimal.num_id, 5);
        assert_eq!(decimal.abstract_num_id, 5);
    }

    #[test]
    fn test_new_numbering_starts_at_one() {
        let mut numbering = Numbering::new();
        let handle = numbering.create_list(ListStyle::Decimal).unwrap();
        assert_eq!(handle.num_id, 1);
        assert_eq!(handle.abstract_num_id, 0);
        assert_eq!(numbering.format(1, 0), Some(NumberFormat::Decimal));
    }

    #[test]
    fn test_check_compatible() {
        let mut numbering = Numbering::from_xml(SAMPLE_NUMBERING).unwrap();
        let same = numbering.create_list(ListStyle::Restart(0)).unwrap();
        let other = numbering.create_list(ListStyle::Bullet).unwrap();

        assert!(numbering.check_compatible(1, &same).is_ok());
        assert!(matches!(
            numbering.check_compatible(1, &other),
            Err(Error::IncompatibleList(_))
        ));
        assert!(numbering.check_compatible(99, &same).is_err());

        let stale = ListHandle {
            num_id: same.num_id,
            abstract_num_id: 3,
        };
        assert!(numbering.check_compatible(2, &stale).is_err());
    }

    #[test]
    fn test_malformed_ids() {
        let xml = r#"<w:numbering xmlns:w="urn:w"><w:num w:numId="one"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;
        assert!(matches!(
            Numbering::from_xml(xml),
            Err(Error::MalformedPart { .. })
        ));
    }
}
