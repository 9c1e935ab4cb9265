//! Paragraph element (w:p)

use crate::document::index::LeafContainer;
use crate::document::revision::{RevisionKind, TrackedChange};
use crate::document::{Leaf, Run};
use crate::error::{Error, Result};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Paragraph element (w:p)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph properties
    pub properties: Option<ParagraphProperties>,
    /// Paragraph content (runs, tracked changes, hyperlinks, fields, etc.)
    pub content: Vec<ParagraphContent>,
    /// Attributes on `w:p` (rsid, paraId, ...)
    pub attrs: Vec<(String, String)>,
}

/// Content within a paragraph, tracked change or container
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParagraphContent {
    /// Text run
    Run(Run),
    /// `w:ins` / `w:del` / `w:moveFrom` / `w:moveTo`
    TrackedChange(TrackedChange),
    /// Hyperlink, simple field, smart tag, custom XML or content control
    Container(Container),
    /// Bookmarks, comments ranges, proofing marks, whitespace... (preserved)
    Unknown(RawXmlNode),
}

/// Inline elements whose runs belong to the paragraph text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    /// `w:hyperlink`
    Hyperlink,
    /// `w:fldSimple`; the runs hold the cached field result
    SimpleField,
    /// `w:smartTag`
    SmartTag,
    /// `w:customXml`
    CustomXml,
    /// `w:sdt`, its runs inside `w:sdtContent`
    ContentControl,
}

impl ContainerKind {
    pub(crate) fn from_local(local: &[u8]) -> Option<Self> {
        match local {
            b"hyperlink" => Some(ContainerKind::Hyperlink),
            b"fldSimple" => Some(ContainerKind::SimpleField),
            b"smartTag" => Some(ContainerKind::SmartTag),
            b"customXml" => Some(ContainerKind::CustomXml),
            b"sdt" => Some(ContainerKind::ContentControl),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ContainerKind::Hyperlink => "w:hyperlink",
            ContainerKind::SimpleField => "w:fldSimple",
            ContainerKind::SmartTag => "w:smartTag",
            ContainerKind::CustomXml => "w:customXml",
            ContainerKind::ContentControl => "w:sdt",
        }
    }

    /// Local name of the leading properties child, if the kind has one
    fn properties_local(self) -> Option<&'static str> {
        match self {
            ContainerKind::Hyperlink => None,
            ContainerKind::SimpleField => Some("fldData"),
            ContainerKind::SmartTag => Some("smartTagPr"),
            ContainerKind::CustomXml => Some("customXmlPr"),
            ContainerKind::ContentControl => Some("sdtPr"),
        }
    }
}

/// Transparent inline wrapper: its runs are addressed like direct runs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    pub kind: ContainerKind,
    /// Attributes (`r:id`, `w:anchor`, `w:instr`, `w:element`, ...)
    pub attrs: Vec<(String, String)>,
    /// Property children written before the content (`w:sdtPr`, `w:smartTagPr`, ...)
    pub properties: Vec<RawXmlNode>,
    pub content: Vec<ParagraphContent>,
}

/// Paragraph properties (w:pPr), kept verbatim
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParagraphProperties {
    pub raw: RawXmlElement,
}

impl Paragraph {
    /// Parse paragraph from reader (after w:p start tag)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut content = read_content(reader, b"p")?;

        let props_at = content.iter().position(|item| {
            matches!(item, ParagraphContent::Unknown(RawXmlNode::Element(e)) if e.local_name() == "pPr")
        });
        let properties = match props_at.map(|i| content.remove(i)) {
            Some(ParagraphContent::Unknown(RawXmlNode::Element(raw))) => {
                Some(ParagraphProperties { raw })
            }
            _ => None,
        };

        Ok(Paragraph {
            properties,
            content,
            attrs: xml::attributes_of(start)?,
        })
    }

    pub fn from_empty(start: &BytesStart) -> Result<Self> {
        Ok(Paragraph {
            attrs: xml::attributes_of(start)?,
            ..Default::default()
        })
    }

    /// Create a paragraph with a single plain run
    pub fn new(text: impl Into<String>) -> Self {
        Self::from_content(vec![ParagraphContent::Run(Run::new(text))])
    }

    pub fn from_content(content: Vec<ParagraphContent>) -> Self {
        Paragraph {
            content,
            ..Default::default()
        }
    }

    pub fn with_properties(mut self, properties: ParagraphProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Direct child runs
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.content.iter().filter_map(|c| match c {
            ParagraphContent::Run(r) => Some(r),
            _ => None,
        })
    }

    pub fn add_run(&mut self, run: Run) {
        self.content.push(ParagraphContent::Run(run));
    }

    /// Paragraph text, deleted text included
    pub fn text(&self) -> String {
        self.flatten()
    }

    pub fn style(&self) -> Option<&str> {
        self.properties.as_ref()?.style()
    }

    pub fn num_id(&self) -> Option<u32> {
        self.properties.as_ref()?.num_id()
    }

    /// True if any run sits in the paragraph, directly or nested
    pub fn has_run(&self) -> bool {
        self.content.iter().any(ParagraphContent::has_run)
    }

    /// Write to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("w:p");
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.properties.is_none() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(props) = &self.properties {
            props.raw.write_to(writer)?;
        }
        for item in &self.content {
            item.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:p")))?;
        Ok(())
    }
}

impl LeafContainer for Paragraph {
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf)) {
        self.content.walk(path, visit);
    }

    fn walk_live<'a>(&'a self, visit: &mut dyn FnMut(&'a Leaf)) {
        self.content.walk_live(visit);
    }
}

impl ParagraphContent {
    pub fn has_run(&self) -> bool {
        match self {
            ParagraphContent::Run(_) => true,
            ParagraphContent::TrackedChange(c) => c.content.iter().any(Self::has_run),
            ParagraphContent::Container(c) => c.content.iter().any(Self::has_run),
            ParagraphContent::Unknown(_) => false,
        }
    }

    /// Turn the text of runs into deleted text, looking through containers.
    ///
    /// Tracked changes are returned as they are: deleting inside one takes
    /// a deletion nested in it, never a rewrite of its runs.
    pub(crate) fn into_deleted(self) -> Self {
        match self {
            ParagraphContent::Run(run) => ParagraphContent::Run(run.into_deleted()),
            ParagraphContent::Container(mut container) => {
                container.content = container.content.into_iter().map(Self::into_deleted).collect();
                ParagraphContent::Container(container)
            }
            other => other,
        }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            ParagraphContent::Run(run) => run.write_to(writer),
            ParagraphContent::TrackedChange(change) => change.write_to(writer),
            ParagraphContent::Container(container) => container.write_to(writer),
            ParagraphContent::Unknown(node) => node.write_to(writer),
        }
    }
}

impl LeafContainer for ParagraphContent {
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf)) {
        match self {
            ParagraphContent::Run(run) => run.walk(path, visit),
            ParagraphContent::TrackedChange(change) => change.walk(path, visit),
            ParagraphContent::Container(container) => container.content.walk(path, visit),
            ParagraphContent::Unknown(_) => {}
        }
    }

    fn walk_live<'a>(&'a self, visit: &mut dyn FnMut(&'a Leaf)) {
        match self {
            ParagraphContent::Run(run) => run.walk_live(visit),
            ParagraphContent::TrackedChange(change) => change.walk_live(visit),
            ParagraphContent::Container(container) => container.content.walk_live(visit),
            ParagraphContent::Unknown(_) => {}
        }
    }
}

impl Container {
    pub fn new(kind: ContainerKind, content: Vec<ParagraphContent>) -> Self {
        Container {
            kind,
            attrs: Vec::new(),
            properties: Vec::new(),
            content,
        }
    }

    pub fn from_reader<R: BufRead>(
        reader: &mut Reader<R>,
        start: &BytesStart,
        kind: ContainerKind,
    ) -> Result<Self> {
        let mut container = Self::from_empty(start, kind)?;
        if kind == ContainerKind::ContentControl {
            container.read_control(reader)?;
            return Ok(container);
        }

        let mut content = read_content(reader, kind.tag().trim_start_matches("w:").as_bytes())?;
        if let Some(name) = kind.properties_local() {
            let at = content.iter().position(|item| {
                matches!(item, ParagraphContent::Unknown(RawXmlNode::Element(e)) if e.local_name() == name)
            });
            if let Some(ParagraphContent::Unknown(node)) = at.map(|i| content.remove(i)) {
                container.properties.push(node);
            }
        }
        container.content = content;
        Ok(container)
    }

    pub fn from_empty(start: &BytesStart, kind: ContainerKind) -> Result<Self> {
        Ok(Container {
            attrs: xml::attributes_of(start)?,
            ..Self::new(kind, Vec::new())
        })
    }

    /// `w:sdt` children: properties up to `w:sdtContent`, then its runs
    fn read_control<R: BufRead>(&mut self, reader: &mut Reader<R>) -> Result<()> {
        let mut buf = Vec::new();
        let mut seen_content = false;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().local_name().as_ref() == b"sdtContent" => {
                    self.content = read_content(reader, b"sdtContent")?;
                    seen_content = true;
                }
                Event::Start(e) => {
                    let raw = RawXmlElement::from_reader(reader, &e)?;
                    self.properties.push(RawXmlNode::Element(raw));
                }
                Event::Empty(e) if e.name().local_name().as_ref() == b"sdtContent" => {
                    seen_content = true;
                }
                Event::Empty(e) => {
                    self.properties.push(RawXmlNode::Element(RawXmlElement::from_empty(&e)?));
                }
                Event::Text(t) if !seen_content => {
                    let text = t.unescape()?;
                    if !text.is_empty() {
                        self.properties.push(RawXmlNode::Text(text.into_owned()));
                    }
                }
                Event::End(e) if e.name().local_name().as_ref() == b"sdt" => break,
                Event::Eof => {
                    return Err(Error::malformed("sdt", "unexpected end of input inside element"))
                }
                _ => {}
            }
            buf.clear();
        }
        Ok(())
    }

    /// Relationship id of an external hyperlink target
    pub fn r_id(&self) -> Option<&str> {
        self.attr("r:id")
    }

    /// Bookmark name of an internal hyperlink target
    pub fn anchor(&self) -> Option<&str> {
        self.attr("w:anchor")
    }

    /// Field instruction of a simple field
    pub fn instruction(&self) -> Option<&str> {
        self.attr("w:instr")
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Same wrapper around `content`, for the second half of a split.
    ///
    /// A content control id must stay unique, so the copy drops `w:sdtPr/w:id`.
    pub(crate) fn continued(&self, content: Vec<ParagraphContent>) -> Self {
        let mut next = Container {
            kind: self.kind,
            attrs: self.attrs.clone(),
            properties: self.properties.clone(),
            content,
        };
        if self.kind == ContainerKind::ContentControl {
            for node in &mut next.properties {
                if let RawXmlNode::Element(pr) = node {
                    if pr.local_name() == "sdtPr" {
                        pr.children.retain(|child| {
                            !matches!(child, RawXmlNode::Element(e) if e.local_name() == "id")
                        });
                    }
                }
            }
        }
        next
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let tag = self.kind.tag();
        let control = self.kind == ContainerKind::ContentControl;
        let mut start = BytesStart::new(tag);
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        if !control && self.properties.is_empty() && self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for node in &self.properties {
            node.write_to(writer)?;
        }
        if control {
            writer.write_event(Event::Start(BytesStart::new("w:sdtContent")))?;
        }
        for item in &self.content {
            item.write_to(writer)?;
        }
        if control {
            writer.write_event(Event::End(BytesEnd::new("w:sdtContent")))?;
        }
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }
}

impl ParagraphProperties {
    pub fn new() -> Self {
        Self {
            raw: RawXmlElement::new("w:pPr"),
        }
    }

    /// Properties of a list item at `level` of numbering instance `num_id`
    pub fn numbered(num_id: u32, level: u32) -> Self {
        let num_pr = RawXmlElement::new("w:numPr")
            .with_child(RawXmlElement::new("w:ilvl").with_attr("w:val", level.to_string()))
            .with_child(RawXmlElement::new("w:numId").with_attr("w:val", num_id.to_string()));
        Self {
            raw: RawXmlElement::new("w:pPr").with_child(num_pr),
        }
    }

    pub fn style(&self) -> Option<&str> {
        self.raw.child("pStyle")?.attr("w:val")
    }

    /// Numbering instance referenced by `w:numPr/w:numId`.
    ///
    /// `0` means numbering is switched off and reads as `None`.
    pub fn num_id(&self) -> Option<u32> {
        let value = self.raw.child("numPr")?.child("numId")?.attr("w:val")?;
        value.trim().parse().ok().filter(|id| *id != 0)
    }

    pub fn level(&self) -> Option<u32> {
        let value = self.raw.child("numPr")?.child("ilvl")?.attr("w:val")?;
        value.trim().parse().ok()
    }

    /// Replace the numbering instance id. Returns false if no `w:numId` exists.
    pub(crate) fn set_num_id(&mut self, num_id: u32) -> bool {
        match self
            .raw
            .child_mut("numPr")
            .and_then(|num_pr| num_pr.child_mut("numId"))
        {
            Some(elem) => {
                elem.set_attr("w:val", num_id.to_string());
                true
            }
            None => false,
        }
    }
}

impl Default for ParagraphProperties {
    fn default() -> Self {
        Self::new()
    }
}

/// Read paragraph-level content until the end tag named `end`.
///
/// Shared by paragraphs, tracked changes and containers.
pub(crate) fn read_content<R: BufRead>(
    reader: &mut Reader<R>,
    end: &[u8],
) -> Result<Vec<ParagraphContent>> {
    let mut content = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let local = e.name().local_name().as_ref().to_vec();
                let item = if local == b"r" {
                    ParagraphContent::Run(Run::from_reader(reader, &e)?)
                } else if let Some(kind) = ContainerKind::from_local(&local) {
                    ParagraphContent::Container(Container::from_reader(reader, &e, kind)?)
                } else if let Some(kind) = RevisionKind::from_local(&local) {
                    ParagraphContent::TrackedChange(TrackedChange::from_reader(reader, &e, kind)?)
                } else {
                    ParagraphContent::Unknown(RawXmlNode::Element(RawXmlElement::from_reader(reader, &e)?))
                };
                content.push(item);
            }
            Event::Empty(e) => {
                let local = e.name().local_name().as_ref().to_vec();
                let item = if local == b"r" {
                    ParagraphContent::Run(Run::from_empty(&e)?)
                } else if let Some(kind) = ContainerKind::from_local(&local) {
                    ParagraphContent::Container(Container::from_empty(&e, kind)?)
                } else if let Some(kind) = RevisionKind::from_local(&local) {
                    ParagraphContent::TrackedChange(TrackedChange::from_empty(&e, kind)?)
                } else {
                    ParagraphContent::Unknown(RawXmlNode::Element(RawXmlElement::from_empty(&e)?))
                };
                content.push(item);
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if !text.is_empty() {
                    content.push(ParagraphContent::Unknown(RawXmlNode::Text(text.into_owned())));
                }
            }
            Event::Comment(c) => {
                content.push(ParagraphContent::Unknown(RawXmlNode::Comment(
                    String::from_utf8_lossy(&c).into_owned(),
                )));
            }
            Event::End(e) => {
                if e.name().local_name().as_ref() == end {
                    break;
                }
            }
            Event::Eof => {
                return Err(Error::malformed(
                    String::from_utf8_lossy(end),
                    "unexpected end of input inside element",
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Paragraph {
        let mut reader = xml::reader_for(text);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) => return Paragraph::from_reader(&mut reader, &e.into_owned()).unwrap(),
                Event::Empty(e) => return Paragraph::from_empty(&e).unwrap(),
                _ => {}
            }
        }
    }

    fn write(paragraph: &Paragraph) -> String {
        let mut out = Vec::new();
        paragraph.write_to(&mut Writer::new(&mut out)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_mixed_content() {
        let p = parse(
            r#"<w:p w:rsidR="00AA"><w:pPr><w:pStyle w:val="Heading1"/><w:numPr><w:ilvl w:val="1"/><w:numId w:val="3"/></w:numPr></w:pPr><w:r><w:t>A</w:t></w:r><w:bookmarkStart w:id="0" w:name="x"/><w:ins w:id="1" w:author="Ann"><w:r><w:t>B</w:t></w:r></w:ins><w:del w:id="2"><w:r><w:delText>C</w:delText></w:r></w:del><w:hyperlink r:id="rId5"><w:r><w:t>D</w:t></w:r></w:hyperlink></w:p>"#,
        );

        assert_eq!(p.style(), Some("Heading1"));
        assert_eq!(p.num_id(), Some(3));
        assert_eq!(p.properties.as_ref().unwrap().level(), Some(1));
        assert_eq!(p.content.len(), 5);
        assert_eq!(p.text(), "ABCD");
        assert_eq!(p.live_text(), "ABD");
        assert!(matches!(&p.content[4], ParagraphContent::Container(h) if h.r_id() == Some("rId5")));
    }

    #[test]
    fn test_roundtrip_keeps_everything() {
        let xml = r#"<w:p w14:paraId="1A2B"><w:pPr><w:jc w:val="center"/></w:pPr><w:proofErr w:type="spellStart"/><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">a </w:t></w:r><!--note--><w:hyperlink w:anchor="top"><w:r><w:t>b</w:t></w:r></w:hyperlink></w:p>"#;
        let p = parse(xml);
        assert_eq!(write(&p), xml);
        assert_eq!(parse(&write(&p)), p);
    }

    #[test]
    fn test_empty_paragraph() {
        let p = parse("<w:p/>");
        assert_eq!(p, Paragraph::default());
        assert_eq!(write(&p), "<w:p/>");
        assert!(!p.has_run());
    }

    #[test]
    fn test_num_id_zero_reads_as_none() {
        let props = ParagraphProperties::numbered(0, 0);
        assert_eq!(props.num_id(), None);

        let mut props = ParagraphProperties::numbered(4, 2);
        assert_eq!(props.num_id(), Some(4));
        assert!(props.set_num_id(9));
        assert_eq!(props.num_id(), Some(9));
        assert_eq!(props.level(), Some(2));
        assert!(!ParagraphProperties::new().set_num_id(1));
    }

    #[test]
    fn test_has_run_sees_nested_runs() {
        let link = Container::new(
            ContainerKind::Hyperlink,
            vec![ParagraphContent::Run(Run::new("x"))],
        );
        let p = Paragraph::from_content(vec![
            ParagraphContent::Unknown(RawXmlNode::Text(" ".into())),
            ParagraphContent::Container(link),
        ]);
        assert!(p.has_run());
        assert_eq!(p.runs().count(), 0);
    }

    #[test]
    fn test_inline_wrappers_are_transparent() {
        let p = parse(
            r#"<w:p><w:r><w:t>A</w:t></w:r><w:fldSimple w:instr=" PAGE "><w:r><w:t>5</w:t></w:r></w:fldSimple><w:sdt><w:sdtPr><w:id w:val="7"/></w:sdtPr><w:sdtContent><w:r><w:t>Z</w:t></w:r></w:sdtContent></w:sdt><w:smartTag w:element="place"><w:smartTagPr><w:attr w:name="x" w:val="y"/></w:smartTagPr><w:r><w:t>Q</w:t></w:r></w:smartTag><w:customXml w:element="c"><w:r><w:t>!</w:t></w:r></w:customXml></w:p>"#,
        );
        assert_eq!(p.text(), "A5ZQ!");
        assert_eq!(p.flat_len(), 5);

        let kinds: Vec<_> = p
            .content
            .iter()
            .filter_map(|item| match item {
                ParagraphContent::Container(c) => Some(c.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ContainerKind::SimpleField,
                ContainerKind::ContentControl,
                ContainerKind::SmartTag,
                ContainerKind::CustomXml,
            ]
        );
        let ParagraphContent::Container(field) = &p.content[1] else {
            panic!("expected simple field")
        };
        assert_eq!(field.instruction(), Some(" PAGE "));
        let ParagraphContent::Container(tag) = &p.content[3] else {
            panic!("expected smart tag")
        };
        assert_eq!(tag.properties.len(), 1);
        assert_eq!(tag.content.len(), 1);
    }

    #[test]
    fn test_wrapper_roundtrip() {
        let xml = r#"<w:p><w:sdt><w:sdtPr><w:id w:val="7"/><w:text/></w:sdtPr><w:sdtEndPr/><w:sdtContent><w:r><w:t>Z</w:t></w:r></w:sdtContent></w:sdt><w:smartTag w:element="place"><w:smartTagPr><w:attr w:name="x" w:val="y"/></w:smartTagPr><w:r><w:t>Q</w:t></w:r></w:smartTag><w:fldSimple w:instr="DATE"/><w:moveTo w:id="2" w:author="Ann"><w:r><w:t>m</w:t></w:r></w:moveTo></w:p>"#;
        let p = parse(xml);
        assert_eq!(write(&p), xml);
        assert_eq!(p.text(), "ZQm");
    }

    #[test]
    fn test_continued_control_drops_its_id() {
        let p = parse(
            r#"<w:p><w:sdt><w:sdtPr><w:alias w:val="Name"/><w:id w:val="7"/></w:sdtPr><w:sdtContent><w:r><w:t>Z</w:t></w:r></w:sdtContent></w:sdt></w:p>"#,
        );
        let ParagraphContent::Container(control) = &p.content[0] else {
            panic!("expected content control")
        };
        let next = control.continued(Vec::new());
        let RawXmlNode::Element(pr) = &next.properties[0] else {
            panic!("expected sdtPr")
        };
        assert!(pr.child("id").is_none());
        assert!(pr.child("alias").is_some());
    }

    #[test]
    fn test_move_source_is_not_live() {
        let p = parse(
            r#"<w:p><w:moveFrom w:id="1" w:author="Ann"><w:r><w:t>old</w:t></w:r></w:moveFrom><w:r><w:t>kept</w:t></w:r></w:p>"#,
        );
        assert_eq!(p.text(), "oldkept");
        assert_eq!(p.live_text(), "kept");
    }
}
