//! Leaf nodes of a run: the atomic units of addressable content.
//!
//! Every leaf has a fixed length in the flat offset space. Text spans are
//! one unit per `char`, tabs and breaks are one unit, and opaque content
//! (drawings, field characters, rendering hints) takes no space at all.

use crate::error::{Error, Result};
use crate::xml::RawXmlElement;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Break type (`w:br/@w:type`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BreakType {
    #[default]
    TextWrapping,
    Page,
    Column,
}

impl BreakType {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("page") => BreakType::Page,
            Some("column") => BreakType::Column,
            _ => BreakType::TextWrapping,
        }
    }

    fn as_attr(self) -> Option<&'static str> {
        match self {
            BreakType::TextWrapping => None,
            BreakType::Page => Some("page"),
            BreakType::Column => Some("column"),
        }
    }
}

/// Text held by a `w:t` or `w:delText` element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextSpan {
    pub text: String,
    /// `xml:space="preserve"`
    pub preserve: bool,
    /// Attributes other than `xml:space`
    pub attrs: Vec<(String, String)>,
}

impl TextSpan {
    /// New span with the preservation flag derived from its content
    pub fn new(text: impl Into<String>) -> Self {
        Self::derived(text.into(), Vec::new())
    }

    fn derived(text: String, attrs: Vec<(String, String)>) -> Self {
        let preserve = needs_preserve(&text);
        TextSpan {
            text,
            preserve,
            attrs,
        }
    }

    /// Length in the flat offset space
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split at a local char offset strictly inside the span
    fn split(self, local: usize) -> (TextSpan, TextSpan) {
        let at = self
            .text
            .char_indices()
            .nth(local)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        let right = self.text[at..].to_string();
        let mut left = self.text;
        left.truncate(at);
        (
            TextSpan::derived(left, self.attrs.clone()),
            TextSpan::derived(right, self.attrs),
        )
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>, name: &str) -> Result<()> {
        let mut start = BytesStart::new(name);
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if self.preserve {
            start.push_attribute(("xml:space", "preserve"));
        }
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&self.text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

/// Whitespace must be preserved when the text starts or ends with a space
pub fn needs_preserve(text: &str) -> bool {
    text.starts_with(' ') || text.ends_with(' ')
}

/// A leaf of a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Leaf {
    /// `w:t`
    Text(TextSpan),
    /// `w:delText`, only valid inside a tracked deletion
    DeletedText(TextSpan),
    /// `w:tab`
    Tab,
    /// `w:br`
    Break {
        kind: BreakType,
        /// Attributes other than `w:type` (e.g. `w:clear`)
        attrs: Vec<(String, String)>,
    },
    /// Anything else found inside a run, kept verbatim
    Opaque(RawXmlElement),
}

impl Leaf {
    pub fn text(text: impl Into<String>) -> Self {
        Leaf::Text(TextSpan::new(text))
    }

    pub fn line_break(kind: BreakType) -> Self {
        Leaf::Break {
            kind,
            attrs: Vec::new(),
        }
    }

    /// Classify a raw run child: tabs and breaks become atomic leaves
    pub(crate) fn from_raw(raw: RawXmlElement) -> Self {
        if raw.local_name() == "tab" {
            return Leaf::Tab;
        }
        if raw.local_name() != "br" {
            return Leaf::Opaque(raw);
        }

        let kind = BreakType::from_attr(raw.attr("w:type"));
        let attrs = raw
            .attributes
            .into_iter()
            .filter(|(k, _)| k != "w:type")
            .collect();
        Leaf::Break { kind, attrs }
    }

    /// Fixed length in the flat offset space
    pub fn len(&self) -> usize {
        match self {
            Leaf::Text(span) | Leaf::DeletedText(span) => span.len(),
            Leaf::Tab | Leaf::Break { .. } => 1,
            Leaf::Opaque(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tabs and breaks can only be cut at their boundaries
    pub fn is_atomic(&self) -> bool {
        matches!(self, Leaf::Tab | Leaf::Break { .. })
    }

    /// Append this leaf's flat text
    pub(crate) fn push_text(&self, out: &mut String) {
        match self {
            Leaf::Text(span) | Leaf::DeletedText(span) => out.push_str(&span.text),
            Leaf::Tab => out.push('\t'),
            Leaf::Break { .. } => out.push('\n'),
            Leaf::Opaque(_) => {}
        }
    }

    /// Turn live text into deleted text; other leaves are unchanged
    pub(crate) fn into_deleted(self) -> Self {
        match self {
            Leaf::Text(span) => Leaf::DeletedText(span),
            other => other,
        }
    }

    /// Split this leaf, which starts at `start`, at `offset`.
    ///
    /// Splitting on a boundary hands the whole leaf to the touching side.
    pub fn split_at(self, start: usize, offset: usize) -> Result<(Option<Leaf>, Option<Leaf>)> {
        let len = self.len();
        if offset < start || offset > start + len {
            return Err(Error::out_of_range(offset, start, start + len));
        }

        let local = offset - start;
        if local == 0 {
            return Ok((None, Some(self)));
        }
        if local == len {
            return Ok((Some(self), None));
        }

        match self {
            Leaf::Text(span) => {
                let (l, r) = span.split(local);
                Ok((Some(Leaf::Text(l)), Some(Leaf::Text(r))))
            }
            Leaf::DeletedText(span) => {
                let (l, r) = span.split(local);
                Ok((Some(Leaf::DeletedText(l)), Some(Leaf::DeletedText(r))))
            }
            // tabs, breaks and opaque leaves have no interior offset
            _ => Err(Error::out_of_range(offset, start, start)),
        }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            Leaf::Text(span) => span.write_to(writer, "w:t"),
            Leaf::DeletedText(span) => span.write_to(writer, "w:delText"),
            Leaf::Tab => {
                writer.write_event(Event::Empty(BytesStart::new("w:tab")))?;
                Ok(())
            }
            Leaf::Break { kind, attrs } => {
                let mut start = BytesStart::new("w:br");
                if let Some(value) = kind.as_attr() {
                    start.push_attribute(("w:type", value));
                }
                for (key, value) in attrs {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                writer.write_event(Event::Empty(start))?;
                Ok(())
            }
            Leaf::Opaque(raw) => raw.write_to(writer),
        }
    }
}
