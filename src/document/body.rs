//! Document body and block-level content

use crate::document::{Paragraph, DOCUMENT_PART};
use crate::error::{Error, Result};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Block-level content in a document body
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockContent {
    /// Paragraph
    Paragraph(Paragraph),
    /// Tables, section properties, content controls... (preserved)
    Unknown(RawXmlNode),
}

/// The main document part: root element plus `w:body`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    /// Root element name, normally `w:document`
    root_name: String,
    /// Root attributes (namespace declarations, `mc:Ignorable`, ...)
    root_attrs: Vec<(String, String)>,
    /// Root children before `w:body` (e.g. `w:background`)
    before: Vec<RawXmlNode>,
    body_attrs: Vec<(String, String)>,
    /// Block-level content
    pub content: Vec<BlockContent>,
    /// Root children after `w:body`
    after: Vec<RawXmlNode>,
}

impl Body {
    /// Empty body inside a `w:document` root
    pub fn new() -> Self {
        Body {
            root_name: "w:document".into(),
            root_attrs: xml::document_namespaces(),
            before: Vec::new(),
            body_attrs: Vec::new(),
            content: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Parse the text of the main document part
    pub fn from_xml(text: &str) -> Result<Self> {
        let mut reader = xml::reader_for(text);
        let mut buf = Vec::new();

        let root = loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => break e.into_owned(),
                Event::Empty(_) | Event::Eof => {
                    return Err(Error::malformed(DOCUMENT_PART, "missing w:body element"))
                }
                _ => {}
            }
            buf.clear();
        };

        let mut body = Body {
            root_name: String::from_utf8_lossy(root.name().as_ref()).into_owned(),
            root_attrs: xml::attributes_of(&root)?,
            before: Vec::new(),
            body_attrs: Vec::new(),
            content: Vec::new(),
            after: Vec::new(),
        };
        let mut seen_body = false;

        loop {
            buf.clear();
            let node = match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().local_name().as_ref() == b"body" && !seen_body => {
                    seen_body = true;
                    body.body_attrs = xml::attributes_of(&e)?;
                    body.content = read_blocks(&mut reader)?;
                    continue;
                }
                Event::Empty(e) if e.name().local_name().as_ref() == b"body" && !seen_body => {
                    seen_body = true;
                    body.body_attrs = xml::attributes_of(&e)?;
                    continue;
                }
                Event::Start(e) => RawXmlNode::Element(RawXmlElement::from_reader(&mut reader, &e)?),
                Event::Empty(e) => RawXmlNode::Element(RawXmlElement::from_empty(&e)?),
                Event::Text(t) => {
                    let text = t.unescape()?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    RawXmlNode::Text(text.into_owned())
                }
                Event::Comment(c) => RawXmlNode::Comment(String::from_utf8_lossy(&c).into_owned()),
                Event::End(_) | Event::Eof => break,
                _ => continue,
            };
            if seen_body {
                body.after.push(node);
            } else {
                body.before.push(node);
            }
        }

        if !seen_body {
            return Err(Error::malformed(DOCUMENT_PART, "missing w:body element"));
        }
        log::debug!("parsed body with {} block items", body.content.len());
        Ok(body)
    }

    /// Serialize to the text of the main document part
    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(&mut buffer);
        xml::write_declaration(&mut writer)?;

        let mut root = BytesStart::new(self.root_name.as_str());
        for (key, value) in &self.root_attrs {
            root.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(root))?;
        for node in &self.before {
            node.write_to(&mut writer)?;
        }

        let mut start = BytesStart::new("w:body");
        for (key, value) in &self.body_attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(start))?;
        for block in &self.content {
            block.write_to(&mut writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:body")))?;

        for node in &self.after {
            node.write_to(&mut writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.root_name.as_str())))?;

        String::from_utf8(buffer).map_err(|e| Error::Utf8(e.utf8_error()))
    }

    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(|c| match c {
            BlockContent::Paragraph(p) => Some(p),
            BlockContent::Unknown(_) => None,
        })
    }

    /// Get all paragraphs mutably
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.content.iter_mut().filter_map(|c| match c {
            BlockContent::Paragraph(p) => Some(p),
            BlockContent::Unknown(_) => None,
        })
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs().nth(index)
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.paragraphs_mut().nth(index)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Add a paragraph at the end, before a trailing `w:sectPr`
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        let last = self.content.iter().rposition(|c| {
            !matches!(c, BlockContent::Unknown(RawXmlNode::Text(t)) if t.trim().is_empty())
        });
        let at = match last {
            Some(i) if is_section_properties(&self.content[i]) => i,
            _ => self.content.len(),
        };
        self.content.insert(at, BlockContent::Paragraph(paragraph));
    }

    /// Replace paragraph `index` with `paragraphs`, in order
    pub(crate) fn replace_paragraph(
        &mut self,
        index: usize,
        paragraphs: Vec<Paragraph>,
    ) -> Result<()> {
        let position = self
            .content
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, BlockContent::Paragraph(_)))
            .nth(index)
            .map(|(i, _)| i)
            .ok_or(Error::ParagraphNotFound(index))?;
        self.content.splice(
            position..=position,
            paragraphs.into_iter().map(BlockContent::Paragraph),
        );
        Ok(())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockContent {
    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            BlockContent::Paragraph(para) => para.write_to(writer),
            BlockContent::Unknown(node) => node.write_to(writer),
        }
    }
}

fn is_section_properties(block: &BlockContent) -> bool {
    matches!(block, BlockContent::Unknown(RawXmlNode::Element(e)) if e.local_name() == "sectPr")
}

/// Read block-level content up to the end of `w:body`
fn read_blocks<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<BlockContent>> {
    let mut content = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if e.name().local_name().as_ref() == b"p" {
                    content.push(BlockContent::Paragraph(Paragraph::from_reader(reader, &e)?));
                } else {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                }
            }
            Event::Empty(e) => {
                if e.name().local_name().as_ref() == b"p" {
                    content.push(BlockContent::Paragraph(Paragraph::from_empty(&e)?));
                } else {
                    let raw = RawXmlElement::from_empty(&e)?;
                    content.push(BlockContent::Unknown(RawXmlNode::Element(raw)));
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if !text.is_empty() {
                    content.push(BlockContent::Unknown(RawXmlNode::Text(text.into_owned())));
                }
            }
            Event::Comment(c) => {
                content.push(BlockContent::Unknown(RawXmlNode::Comment(
                    String::from_utf8_lossy(&c).into_owned(),
                )));
            }
            Event::End(e) => {
                if e.name().local_name().as_ref() == b"body" {
                    break;
                }
            }
            Event::Eof => return Err(Error::malformed(DOCUMENT_PART, "unterminated w:body")),
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}
