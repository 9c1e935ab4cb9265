//! Tracked changes: `w:ins` / `w:del` / `w:moveFrom` / `w:moveTo`
//! wrappers, editor identity and revision id allocation.

use crate::document::index::LeafContainer;
use crate::document::paragraph::{read_content, ParagraphContent};
use crate::document::{BlockContent, Body, Leaf, Paragraph, Run};
use crate::error::{Error, Result};
use crate::xml::{self, RawXmlElement, RawXmlNode};
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

/// Kind of tracked change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevisionKind {
    Insertion,
    Deletion,
    /// Source of a move; its text is gone once the move is accepted
    MoveFrom,
    /// Destination of a move
    MoveTo,
}

impl RevisionKind {
    pub(crate) fn from_local(local: &[u8]) -> Option<Self> {
        match local {
            b"ins" => Some(RevisionKind::Insertion),
            b"del" => Some(RevisionKind::Deletion),
            b"moveFrom" => Some(RevisionKind::MoveFrom),
            b"moveTo" => Some(RevisionKind::MoveTo),
            _ => None,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            RevisionKind::Insertion => "w:ins",
            RevisionKind::Deletion => "w:del",
            RevisionKind::MoveFrom => "w:moveFrom",
            RevisionKind::MoveTo => "w:moveTo",
        }
    }

    /// True for changes whose content disappears when accepted
    pub fn removes_content(self) -> bool {
        matches!(self, RevisionKind::Deletion | RevisionKind::MoveFrom)
    }
}

/// Tracked-edit wrapper around paragraph content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedChange {
    pub kind: RevisionKind,
    /// `w:id`
    pub id: u32,
    /// `w:author`
    pub author: Option<String>,
    /// `w:date`, kept as written
    pub date: Option<String>,
    /// Other attributes (rsid etc.)
    pub attrs: Vec<(String, String)>,
    pub content: Vec<ParagraphContent>,
}

impl TrackedChange {
    /// Parse from reader (after the wrapper's start tag)
    pub fn from_reader<R: BufRead>(
        reader: &mut Reader<R>,
        start: &BytesStart,
        kind: RevisionKind,
    ) -> Result<Self> {
        let mut change = Self::from_empty(start, kind)?;
        let end = kind.tag().trim_start_matches("w:");
        change.content = read_content(reader, end.as_bytes())?;
        Ok(change)
    }

    pub fn from_empty(start: &BytesStart, kind: RevisionKind) -> Result<Self> {
        let mut change = TrackedChange {
            kind,
            id: 0,
            author: None,
            date: None,
            attrs: Vec::new(),
            content: Vec::new(),
        };
        let mut id = None;

        for (key, value) in xml::attributes_of(start)? {
            match key.as_str() {
                "w:id" => id = Some(value),
                "w:author" => change.author = Some(value),
                "w:date" => change.date = Some(value),
                _ => change.attrs.push((key, value)),
            }
        }

        let id = id.ok_or_else(|| Error::MissingAttribute {
            element: kind.tag().into(),
            attr: "w:id".into(),
        })?;
        change.id = id.trim().parse().map_err(|_| {
            Error::malformed(kind.tag(), format!("revision id '{}' is not a number", id))
        })?;
        Ok(change)
    }

    /// Same kind, author, date and attributes around new content
    pub(crate) fn with_content(&self, id: u32, content: Vec<ParagraphContent>) -> Self {
        TrackedChange {
            kind: self.kind,
            id,
            author: self.author.clone(),
            date: self.date.clone(),
            attrs: self.attrs.clone(),
            content,
        }
    }

    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let tag = self.kind.tag();
        let mut start = BytesStart::new(tag);
        start.push_attribute(("w:id", self.id.to_string().as_str()));
        if let Some(author) = &self.author {
            start.push_attribute(("w:author", author.as_str()));
        }
        if let Some(date) = &self.date {
            start.push_attribute(("w:date", date.as_str()));
        }
        for (key, value) in &self.attrs {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.content.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for item in &self.content {
            item.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }
}

impl LeafContainer for TrackedChange {
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf)) {
        self.content.walk(path, visit);
    }

    fn walk_live<'a>(&'a self, visit: &mut dyn FnMut(&'a Leaf)) {
        if self.kind != RevisionKind::MoveFrom {
            self.content.walk_live(visit);
        }
    }
}

/// Identity stamped on tracked changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Editor {
    pub author: String,
    pub date: DateTime<Utc>,
}

impl Editor {
    pub fn new(author: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            date,
        }
    }

    /// Editor stamped with the current time
    pub fn now(author: impl Into<String>) -> Self {
        Self::new(author, Utc::now())
    }

    /// `w:date` value, e.g. `2024-05-01T09:30:00Z`
    pub fn date_attr(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Allocator for revision ids. Ids handed out are never reused.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevisionIds {
    next: u32,
}

impl RevisionIds {
    /// Start above the highest revision id used anywhere in `body`,
    /// raw markup (tables, property changes) included
    pub fn from_body(body: &Body) -> Self {
        let mut next = 0;
        each_revision_id(body, &mut |id| next = next.max(id + 1));
        Self { next }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next allocation will return
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// Wrap `content` in a new tracked change stamped by `editor`.
///
/// Deleted content has its text leaves turned into deleted text; offsets
/// are unchanged.
pub fn wrap(
    kind: RevisionKind,
    editor: &Editor,
    content: Vec<ParagraphContent>,
    ids: &mut RevisionIds,
) -> TrackedChange {
    let content = match kind {
        RevisionKind::Deletion => content.into_iter().map(ParagraphContent::into_deleted).collect(),
        _ => content,
    };
    TrackedChange {
        kind,
        id: ids.next_id(),
        author: Some(editor.author.clone()),
        date: Some(editor.date_attr()),
        attrs: Vec::new(),
        content,
    }
}

/// Reassign revision ids `0..n` in document order and reset the
/// allocator to `n`. Returns `n`.
///
/// Revision annotations kept as raw markup are renumbered in the same
/// sequence, so ids stay unique across the whole part.
pub fn renumber(body: &mut Body, ids: &mut RevisionIds) -> u32 {
    let mut next = 0;
    for block in &mut body.content {
        match block {
            BlockContent::Paragraph(paragraph) => renumber_paragraph(paragraph, &mut next),
            BlockContent::Unknown(node) => renumber_node(node, &mut next),
        }
    }
    log::debug!("renumbered {} revisions", next);
    ids.next = next;
    next
}

/// Raw revision annotations carry both `w:id` and `w:author`; bookmarks
/// and comment anchors carry only `w:id`. Move range starts are paired
/// with ends by id, so they keep theirs.
fn raw_revision_id(elem: &RawXmlElement) -> Option<u32> {
    if elem.local_name().ends_with("RangeStart") {
        return None;
    }
    elem.attr("w:author")?;
    elem.attr("w:id")?.trim().parse().ok()
}

/// Every revision id in `body`, in document order
pub(crate) fn each_revision_id(body: &Body, see: &mut dyn FnMut(u32)) {
    for block in &body.content {
        match block {
            BlockContent::Paragraph(paragraph) => scan_paragraph(paragraph, see),
            BlockContent::Unknown(node) => scan_node(node, see),
        }
    }
}

fn scan_paragraph(paragraph: &Paragraph, see: &mut dyn FnMut(u32)) {
    if let Some(props) = &paragraph.properties {
        scan_raw(&props.raw, see);
    }
    scan_items(&paragraph.content, see);
}

fn scan_items(items: &[ParagraphContent], see: &mut dyn FnMut(u32)) {
    for item in items {
        match item {
            ParagraphContent::Run(run) => scan_run(run, see),
            ParagraphContent::TrackedChange(change) => {
                see(change.id);
                scan_items(&change.content, see);
            }
            ParagraphContent::Container(container) => {
                for node in &container.properties {
                    scan_node(node, see);
                }
                scan_items(&container.content, see);
            }
            ParagraphContent::Unknown(node) => scan_node(node, see),
        }
    }
}

fn scan_run(run: &Run, see: &mut dyn FnMut(u32)) {
    if let Some(props) = &run.properties {
        scan_raw(props, see);
    }
    for leaf in &run.content {
        if let Leaf::Opaque(raw) = leaf {
            scan_raw(raw, see);
        }
    }
}

fn scan_node(node: &RawXmlNode, see: &mut dyn FnMut(u32)) {
    if let RawXmlNode::Element(elem) = node {
        scan_raw(elem, see);
    }
}

fn scan_raw(elem: &RawXmlElement, see: &mut dyn FnMut(u32)) {
    if let Some(id) = raw_revision_id(elem) {
        see(id);
    }
    for child in elem.elements() {
        scan_raw(child, see);
    }
}

fn renumber_paragraph(paragraph: &mut Paragraph, next: &mut u32) {
    if let Some(props) = &mut paragraph.properties {
        renumber_raw(&mut props.raw, next);
    }
    renumber_items(&mut paragraph.content, next);
}

fn renumber_items(items: &mut [ParagraphContent], next: &mut u32) {
    for item in items {
        match item {
            ParagraphContent::Run(run) => {
                if let Some(props) = &mut run.properties {
                    renumber_raw(props, next);
                }
                for leaf in &mut run.content {
                    if let Leaf::Opaque(raw) = leaf {
                        renumber_raw(raw, next);
                    }
                }
            }
            ParagraphContent::TrackedChange(change) => {
                change.id = *next;
                *next += 1;
                renumber_items(&mut change.content, next);
            }
            ParagraphContent::Container(container) => {
                for node in &mut container.properties {
                    renumber_node(node, next);
                }
                renumber_items(&mut container.content, next);
            }
            ParagraphContent::Unknown(node) => renumber_node(node, next),
        }
    }
}

fn renumber_node(node: &mut RawXmlNode, next: &mut u32) {
    if let RawXmlNode::Element(elem) = node {
        renumber_raw(elem, next);
    }
}

fn renumber_raw(elem: &mut RawXmlElement, next: &mut u32) {
    if raw_revision_id(elem).is_some() {
        elem.set_attr("w:id", next.to_string());
        *next += 1;
    }
    for child in &mut elem.children {
        renumber_node(child, next);
    }
}
