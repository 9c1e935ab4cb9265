//! Document model and the offset-addressed edit API
//!
//! Paragraph content is addressed by flat offsets: every char of text is
//! one unit, tabs and breaks are one unit each, everything else takes no
//! space. The document text is the concatenation of its paragraphs with no
//! separator in between.

mod body;
mod edit;
mod index;
mod leaf;
mod numbering;
mod offsets;
mod paragraph;
mod revision;
mod run;

pub use body::{BlockContent, Body};
pub use edit::{delete_range, insert_break, insert_tab, insert_text, split_paragraph, EditOptions};
pub use index::{IndexEntry, LeafContainer, OffsetIndex};
pub use leaf::{needs_preserve, BreakType, Leaf, TextSpan};
pub use numbering::{
    AbstractNum, Level, ListHandle, ListStyle, Num, NumberFormat, Numbering,
};
pub use offsets::{rebuild, OffsetTable, ParagraphSpan};
pub use paragraph::{Container, ContainerKind, Paragraph, ParagraphContent, ParagraphProperties};
pub use revision::{renumber, wrap, Editor, RevisionIds, RevisionKind, TrackedChange};
pub use run::{Run, RunFormat};

use crate::error::{Error, Result};
use crate::opc::{rel_types, Package, PartUri, SharedPackage, MAIN_DOCUMENT, NUMBERING};
use std::cell::OnceCell;
use std::path::Path;

/// Default part names, also used to label parse errors
pub(crate) const DOCUMENT_PART: &str = "/word/document.xml";
pub(crate) const NUMBERING_PART: &str = "/word/numbering.xml";

/// A DOCX document
#[derive(Debug)]
pub struct Document {
    /// Underlying OPC package, possibly shared with other documents
    package: SharedPackage,
    part_uri: PartUri,
    /// Parsed document body
    body: Body,
    numbering: Option<Numbering>,
    numbering_uri: Option<PartUri>,
    revision_ids: RevisionIds,
    /// Cache, taken by every structural edit
    offsets: OnceCell<OffsetTable>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            package: Package::new().into_shared(),
            part_uri: PartUri::from_static(DOCUMENT_PART),
            body: Body::new(),
            numbering: None,
            numbering_uri: None,
            revision_ids: RevisionIds::default(),
            offsets: OnceCell::new(),
        }
    }

    /// Open a document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?.into_shared())
    }

    /// Open a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?.into_shared())
    }

    /// Load the main document of `package`.
    ///
    /// Parse failures are reported as [`Error::MalformedPart`]; the offset
    /// table is built once before returning.
    pub fn from_package(package: SharedPackage) -> Result<Self> {
        let (part_uri, body, numbering_uri, numbering) = {
            let pkg = package.lock();
            let part_uri = pkg
                .main_document_uri()
                .ok_or_else(|| Error::MissingPart("main document part".into()))?;
            let part = pkg
                .get_part(part_uri.as_str())
                .ok_or_else(|| Error::PartNotFound(part_uri.to_string()))?;
            let body = part
                .data_as_str()
                .map_err(Error::from)
                .and_then(Body::from_xml)
                .map_err(|e| malformed(&part_uri, e))?;

            let numbering_uri = pkg.related_part_uri(&part_uri, rel_types::NUMBERING);
            let numbering = match numbering_uri.as_ref().and_then(|uri| pkg.get_part(uri.as_str())) {
                Some(part) => Some(
                    part.data_as_str()
                        .map_err(Error::from)
                        .and_then(Numbering::from_xml)
                        .map_err(|e| malformed(part.uri(), e))?,
                ),
                None => None,
            };
            (part_uri, body, numbering_uri, numbering)
        };

        let doc = Self {
            package,
            part_uri,
            revision_ids: RevisionIds::from_body(&body),
            body,
            numbering,
            numbering_uri,
            offsets: OnceCell::new(),
        };
        let table = doc.offset_table()?;
        log::debug!(
            "loaded {} with {} paragraphs, {} offsets",
            doc.part_uri,
            doc.body.paragraph_count(),
            table.total_len()
        );
        Ok(doc)
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut pkg = self.package.lock();
        self.flush(&mut pkg)?;
        pkg.save(path)
    }

    /// Save the document to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut pkg = self.package.lock();
        self.flush(&mut pkg)?;
        pkg.to_bytes()
    }

    /// Write the body and numbering back into the package
    fn flush(&self, pkg: &mut Package) -> Result<()> {
        let name = self.part_uri.as_str();
        let content_type = pkg
            .get_part(name)
            .map_or(MAIN_DOCUMENT, |p| p.content_type())
            .to_string();
        pkg.put_part(name, &content_type, self.body.to_xml()?.into_bytes())?;
        if pkg.main_document_uri().is_none() {
            pkg.create_relationship(None, name, rel_types::OFFICE_DOCUMENT)?;
        }

        if let Some(numbering) = &self.numbering {
            let uri = self
                .numbering_uri
                .clone()
                .unwrap_or_else(|| PartUri::from_static(NUMBERING_PART));
            pkg.put_part(uri.as_str(), NUMBERING, numbering.to_xml()?.into_bytes())?;
            if pkg.related_part_uri(&self.part_uri, rel_types::NUMBERING).is_none() {
                pkg.create_relationship(Some(name), uri.as_str(), rel_types::NUMBERING)?;
            }
        }
        Ok(())
    }

    /// Get the shared package
    pub fn package(&self) -> &SharedPackage {
        &self.package
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Get mutable body. The offset table is rebuilt on next use.
    pub fn body_mut(&mut self) -> &mut Body {
        self.offsets.take();
        &mut self.body
    }

    pub fn numbering(&self) -> Option<&Numbering> {
        self.numbering.as_ref()
    }

    /// Get all paragraphs
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.paragraphs()
    }

    /// Get paragraph by index
    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.body.paragraph(index)
    }

    /// Get paragraph count
    pub fn paragraph_count(&self) -> usize {
        self.body.paragraph_count()
    }

    /// Append a paragraph and return its index
    pub fn push_paragraph(&mut self, paragraph: Paragraph) -> usize {
        self.body_mut().push_paragraph(paragraph);
        self.body.paragraph_count() - 1
    }

    /// Full document text, deleted text included
    pub fn text(&self) -> String {
        self.body.paragraphs().map(|p| p.flatten()).collect()
    }

    /// Document text as it reads with all changes accepted
    pub fn live_text(&self) -> String {
        self.body.paragraphs().map(|p| p.live_text()).collect()
    }

    /// Offset table, rebuilt if an edit invalidated it
    pub fn offset_table(&self) -> Result<&OffsetTable> {
        if let Some(table) = self.offsets.get() {
            return Ok(table);
        }
        let table = rebuild(&self.body)?;
        Ok(self.offsets.get_or_init(|| table))
    }

    /// Paragraph index and local offset of document offset `offset`
    pub fn locate(&self, offset: usize) -> Result<(usize, usize)> {
        match self.offset_table()?.locate(offset) {
            // a document without text is edited through its first paragraph
            Err(_) if offset == 0 && self.body.paragraph_count() > 0 => Ok((0, 0)),
            located => located,
        }
    }

    fn edit_paragraph<F>(&mut self, index: usize, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Paragraph, &mut RevisionIds) -> Result<()>,
    {
        let paragraph = self
            .body
            .paragraph_mut(index)
            .ok_or(Error::ParagraphNotFound(index))?;
        self.offsets.take();
        edit(paragraph, &mut self.revision_ids)
    }

    /// Insert `text` at `offset` of paragraph `index`
    pub fn insert_text(
        &mut self,
        index: usize,
        offset: usize,
        text: &str,
        options: &EditOptions,
    ) -> Result<()> {
        self.edit_paragraph(index, |p, ids| insert_text(p, offset, text, options, ids))
    }

    /// Insert `text` at document offset `offset`
    pub fn insert_text_at(&mut self, offset: usize, text: &str, options: &EditOptions) -> Result<()> {
        let (index, local) = self.locate(offset)?;
        self.insert_text(index, local, text, options)
    }

    pub fn insert_tab(&mut self, index: usize, offset: usize, options: &EditOptions) -> Result<()> {
        self.edit_paragraph(index, |p, ids| insert_tab(p, offset, options, ids))
    }

    pub fn insert_break(
        &mut self,
        index: usize,
        offset: usize,
        kind: BreakType,
        options: &EditOptions,
    ) -> Result<()> {
        self.edit_paragraph(index, |p, ids| insert_break(p, offset, kind, options, ids))
    }

    /// Delete `[start, end)` of paragraph `index`, tracked when `editor` is given
    pub fn delete_range(
        &mut self,
        index: usize,
        start: usize,
        end: usize,
        editor: Option<&Editor>,
    ) -> Result<()> {
        self.edit_paragraph(index, |p, ids| delete_range(p, start, end, editor, ids))
    }

    /// Split paragraph `index` in two at `offset`.
    ///
    /// Splitting at either end, or a paragraph without runs, leaves the
    /// body as it was.
    pub fn split_paragraph(&mut self, index: usize, offset: usize) -> Result<()> {
        let paragraph = self
            .body
            .paragraph_mut(index)
            .ok_or(Error::ParagraphNotFound(index))?;
        let len = paragraph.flat_len();
        if offset > len {
            return Err(Error::out_of_range(offset, 0, len));
        }
        if !paragraph.has_run() {
            return Ok(());
        }

        self.offsets.take();
        let taken = std::mem::take(paragraph);
        let (left, right) = split_paragraph(taken, offset, &mut self.revision_ids)?;
        self.body
            .replace_paragraph(index, left.into_iter().chain(right).collect())
    }

    /// Reassign tracked-change ids `0..n` in document order
    pub fn renumber_revisions(&mut self) -> u32 {
        renumber(&mut self.body, &mut self.revision_ids)
    }

    /// Add a list to the numbering definitions, creating them if needed
    pub fn create_list(&mut self, style: ListStyle) -> Result<ListHandle> {
        self.numbering
            .get_or_insert_with(Numbering::new)
            .create_list(style)
    }

    /// Move numbered paragraph `index` onto the list `handle`.
    ///
    /// The paragraph must already be numbered with an instance of the same
    /// abstract definition, else [`Error::IncompatibleList`].
    pub fn link_paragraph_to_list(&mut self, index: usize, handle: &ListHandle) -> Result<()> {
        let paragraph = self
            .body
            .paragraph_mut(index)
            .ok_or(Error::ParagraphNotFound(index))?;
        let current = paragraph.num_id().ok_or_else(|| {
            Error::IncompatibleList(format!("paragraph {} has no numbering", index))
        })?;
        if current == handle.num_id {
            return Ok(());
        }

        let numbering = self
            .numbering
            .as_ref()
            .ok_or_else(|| Error::IncompatibleList("document has no numbering definitions".into()))?;
        numbering.check_compatible(current, handle)?;

        if let Some(props) = paragraph.properties.as_mut() {
            props.set_num_id(handle.num_id);
        }
        log::debug!("paragraph {} moved from list {} to {}", index, current, handle.num_id);
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Report a load failure against the part it came from
fn malformed(uri: &PartUri, err: Error) -> Error {
    match err {
        e @ Error::MalformedPart { .. } => e,
        other => Error::malformed(uri.as_str(), other.to_string()),
    }
}
