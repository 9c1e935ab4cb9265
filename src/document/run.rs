//! Run element (w:r) - leaves sharing one formatting descriptor

use crate::document::index::{LeafContainer, OffsetIndex};
use crate::document::leaf::{Leaf, TextSpan};
use crate::error::{Error, Result};
use crate::xml::{self, parse_bool, RawXmlElement};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Run element (w:r)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Run {
    /// Formatting descriptor (`w:rPr`), copied verbatim to both halves of a split
    pub properties: Option<RawXmlElement>,
    pub content: Vec<Leaf>,
    /// Attributes on `w:r` (rsid etc.)
    pub attrs: Vec<(String, String)>,
}

/// Direct formatting applied to runs created by an insertion
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunFormat {
    /// Character style ID
    pub style: Option<String>,
    /// ASCII font
    pub font: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// RGB hex color
    pub color: Option<String>,
    /// Font size in half-points (24 = 12pt)
    pub size: Option<u32>,
    /// Underline type, e.g. "single"
    pub underline: Option<String>,
}

impl Run {
    /// Parse from reader (after w:r start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut run = Run {
            attrs: xml::attributes_of(start)?,
            ..Default::default()
        };
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().local_name().as_ref() {
                    b"rPr" => {
                        run.properties = Some(RawXmlElement::from_reader(reader, &e)?);
                    }
                    b"t" => {
                        let span = read_span(reader, &e, b"t")?;
                        run.content.push(Leaf::Text(span));
                    }
                    b"delText" => {
                        let span = read_span(reader, &e, b"delText")?;
                        run.content.push(Leaf::DeletedText(span));
                    }
                    _ => {
                        let raw = RawXmlElement::from_reader(reader, &e)?;
                        run.content.push(Leaf::from_raw(raw));
                    }
                },
                Event::Empty(e) => match e.name().local_name().as_ref() {
                    b"rPr" => {
                        run.properties = Some(RawXmlElement::from_empty(&e)?);
                    }
                    b"t" => run.content.push(Leaf::Text(empty_span(&e)?)),
                    b"delText" => run.content.push(Leaf::DeletedText(empty_span(&e)?)),
                    _ => run.content.push(Leaf::from_raw(RawXmlElement::from_empty(&e)?)),
                },
                Event::End(e) => {
                    if e.name().local_name().as_ref() == b"r" {
                        break;
                    }
                }
                Event::Eof => return Err(Error::malformed("w:r", "unterminated run")),
                _ => {}
            }
            buf.clear();
        }

        Ok(run)
    }

    /// Create from empty element
    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(Run {
            attrs: xml::attributes_of(start)?,
            ..Default::default()
        })
    }

    /// A plain run holding one text leaf
    pub fn new(text: impl Into<String>) -> Self {
        Self::from_leaves(vec![Leaf::text(text)])
    }

    pub fn from_leaves(content: Vec<Leaf>) -> Self {
        Run {
            content,
            ..Default::default()
        }
    }

    /// Apply direct formatting, replacing any existing descriptor
    pub fn with_format(mut self, format: &RunFormat) -> Self {
        self.properties = format.to_properties();
        self
    }

    /// Get all text in this run
    pub fn text(&self) -> String {
        self.flatten()
    }

    pub fn bold(&self) -> bool {
        self.toggle("b")
    }

    pub fn italic(&self) -> bool {
        self.toggle("i")
    }

    fn toggle(&self, local: &str) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.child(local))
            .is_some_and(|e| parse_bool(e.attr("w:val")))
    }

    /// Split into the content before and after `offset`.
    ///
    /// Both halves carry the original descriptor. A half without any leaf
    /// is `None`; `offset == len` returns the run untouched on the left.
    pub fn split_at(self, offset: usize) -> Result<(Option<Run>, Option<Run>)> {
        let (len, hit) = {
            let index = OffsetIndex::build(&self);
            let hit = index.find(offset).map(|e| (e.path[0], e.start));
            (index.flat_len(), hit)
        };
        if offset > len {
            return Err(Error::out_of_range(offset, 0, len));
        }
        let Some((target, start)) = hit else {
            return Ok((self.non_empty(), None));
        };

        let Run {
            properties,
            content,
            attrs,
        } = self;
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (i, leaf) in content.into_iter().enumerate() {
            if i < target {
                left.push(leaf);
            } else if i > target {
                right.push(leaf);
            } else {
                let (l, r) = leaf.split_at(start, offset)?;
                left.extend(l);
                right.extend(r);
            }
        }

        let half = |content: Vec<Leaf>| {
            (!content.is_empty()).then(|| Run {
                properties: properties.clone(),
                content,
                attrs: attrs.clone(),
            })
        };
        log::debug!("split run of length {} at {}", len, offset);
        Ok((half(left), half(right)))
    }

    fn non_empty(self) -> Option<Run> {
        (!self.content.is_empty()).then_some(self)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:r");
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_none() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(props) = &self.properties {
            props.write_to(writer)?;
        }
        for leaf in &self.content {
            leaf.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
        Ok(())
    }

    /// Turn every text leaf into deleted text
    pub(crate) fn into_deleted(mut self) -> Self {
        self.content = self.content.into_iter().map(Leaf::into_deleted).collect();
        self
    }
}

impl LeafContainer for Run {
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf)) {
        self.content.walk(path, visit);
    }
}

impl RunFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Font size in points, rounded to the nearest half point.
    ///
    /// A size that is not a positive number clears it.
    pub fn size_pt(self, size: f32) -> Self {
        let half_points = (size * 2.0).round();
        if half_points.is_finite() && half_points >= 1.0 {
            self.size_half_points(half_points as u32)
        } else {
            self.size_half_points(0)
        }
    }

    /// Font size in half-points, as `w:sz` stores it; `0` clears it
    pub fn size_half_points(mut self, half_points: u32) -> Self {
        self.size = (half_points > 0).then_some(half_points);
        self
    }

    pub fn underline(mut self, kind: impl Into<String>) -> Self {
        self.underline = Some(kind.into());
        self
    }

    /// Render as a `w:rPr` element, children in schema order
    pub fn to_properties(&self) -> Option<RawXmlElement> {
        let mut children = Vec::new();

        if let Some(style) = &self.style {
            children.push(RawXmlElement::new("w:rStyle").with_attr("w:val", style.as_str()));
        }
        if let Some(font) = &self.font {
            children.push(
                RawXmlElement::new("w:rFonts")
                    .with_attr("w:ascii", font.as_str())
                    .with_attr("w:hAnsi", font.as_str()),
            );
        }
        for (name, value) in [("w:b", self.bold), ("w:i", self.italic)] {
            match value {
                Some(true) => children.push(RawXmlElement::new(name)),
                Some(false) => children.push(RawXmlElement::new(name).with_attr("w:val", "0")),
                None => {}
            }
        }
        if let Some(color) = &self.color {
            children.push(RawXmlElement::new("w:color").with_attr("w:val", color.as_str()));
        }
        if let Some(size) = self.size {
            children.push(RawXmlElement::new("w:sz").with_attr("w:val", size.to_string()));
        }
        if let Some(underline) = &self.underline {
            children.push(RawXmlElement::new("w:u").with_attr("w:val", underline.as_str()));
        }

        if children.is_empty() {
            return None;
        }
        Some(
            children
                .into_iter()
                .fold(RawXmlElement::new("w:rPr"), RawXmlElement::with_child),
        )
    }
}

/// Read a text element's attributes and content
fn read_span<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart, end: &[u8]) -> Result<TextSpan> {
    let mut span = empty_span(start)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(t) => span.text.push_str(&t.unescape()?),
            Event::CData(c) => span.text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(e) if e.name().local_name().as_ref() == end => break,
            Event::Eof => return Err(Error::malformed("w:t", "unterminated text element")),
            _ => {}
        }
        buf.clear();
    }

    Ok(span)
}

fn empty_span(start: &BytesStart) -> Result<TextSpan> {
    let mut span = TextSpan::default();
    for (key, value) in xml::attributes_of(start)? {
        if key == "xml:space" {
            span.preserve = value == "preserve";
        } else {
            span.attrs.push((key, value));
        }
    }
    Ok(span)
}
