//! Offset-addressed editing of paragraph content.
//!
//! All offsets are local to one paragraph. Every operation splits the
//! content at the requested offsets and splices new items in between, so
//! nodes are consumed and rebuilt rather than patched in place.

use crate::document::index::{LeafContainer, OffsetIndex};
use crate::document::paragraph::{Paragraph, ParagraphContent};
use crate::document::revision::{wrap, Editor, RevisionIds, RevisionKind};
use crate::document::{BreakType, Leaf, Run, RunFormat};
use crate::error::{Error, Result};

/// Options applied to inserted content
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditOptions {
    /// Track the edit as a revision by this editor
    pub editor: Option<Editor>,
    /// Direct formatting for generated runs
    pub format: Option<RunFormat>,
}

impl EditOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked(editor: Editor) -> Self {
        Self {
            editor: Some(editor),
            format: None,
        }
    }

    pub fn with_format(mut self, format: RunFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl ParagraphContent {
    /// Split this item at `offset`, local to its own start.
    ///
    /// A tracked change cut in two yields two wrappers with the original
    /// author and date and fresh ids. A container cut in two yields two
    /// copies of the wrapper.
    pub(crate) fn split_at(
        self,
        offset: usize,
        ids: &mut RevisionIds,
    ) -> Result<(Option<Self>, Option<Self>)> {
        match self {
            ParagraphContent::Run(run) => {
                let (left, right) = run.split_at(offset)?;
                Ok((left.map(ParagraphContent::Run), right.map(ParagraphContent::Run)))
            }
            ParagraphContent::TrackedChange(mut change) => {
                let content = std::mem::take(&mut change.content);
                let (left, right) = split_content(content, offset, ids)?;
                if right.is_empty() {
                    change.content = left;
                    return Ok((Some(ParagraphContent::TrackedChange(change)), None));
                }
                if left.is_empty() {
                    change.content = right;
                    return Ok((None, Some(ParagraphContent::TrackedChange(change))));
                }
                let first = change.with_content(ids.next_id(), left);
                let second = change.with_content(ids.next_id(), right);
                Ok((
                    Some(ParagraphContent::TrackedChange(first)),
                    Some(ParagraphContent::TrackedChange(second)),
                ))
            }
            ParagraphContent::Container(mut container) => {
                let content = std::mem::take(&mut container.content);
                let (left, right) = split_content(content, offset, ids)?;
                if right.is_empty() {
                    container.content = left;
                    return Ok((Some(ParagraphContent::Container(container)), None));
                }
                if left.is_empty() {
                    container.content = right;
                    return Ok((None, Some(ParagraphContent::Container(container))));
                }
                let second = container.continued(right);
                container.content = left;
                Ok((
                    Some(ParagraphContent::Container(container)),
                    Some(ParagraphContent::Container(second)),
                ))
            }
            unknown @ ParagraphContent::Unknown(_) => Ok((Some(unknown), None)),
        }
    }
}

/// Split a sequence of paragraph items at `offset`.
///
/// Items holding no offsets before the split point stay on the left;
/// `offset == len` puts everything on the left.
pub(crate) fn split_content(
    items: Vec<ParagraphContent>,
    offset: usize,
    ids: &mut RevisionIds,
) -> Result<(Vec<ParagraphContent>, Vec<ParagraphContent>)> {
    let (len, hit) = {
        let index = OffsetIndex::build(items.as_slice());
        let hit = index.find(offset).map(|e| e.path[0]);
        (index.flat_len(), hit)
    };
    if offset > len {
        return Err(Error::out_of_range(offset, 0, len));
    }
    let Some(target) = hit else {
        return Ok((items, Vec::new()));
    };
    let item_start = items[..target].flat_len();

    let mut left = Vec::with_capacity(target + 1);
    let mut right = Vec::with_capacity(items.len() - target);
    for (i, item) in items.into_iter().enumerate() {
        if i < target {
            left.push(item);
        } else if i > target {
            right.push(item);
        } else {
            let (l, r) = item.split_at(offset - item_start, ids)?;
            left.extend(l);
            right.extend(r);
        }
    }
    Ok((left, right))
}

/// Split a paragraph in two at `offset`.
///
/// The left half keeps the paragraph properties and attributes. A half
/// without any run is `None` and its remaining items go to the other half,
/// which then keeps the properties too.
pub fn split_paragraph(
    paragraph: Paragraph,
    offset: usize,
    ids: &mut RevisionIds,
) -> Result<(Option<Paragraph>, Option<Paragraph>)> {
    let Paragraph {
        properties,
        content,
        attrs,
    } = paragraph;
    let (mut left, mut right) = split_content(content, offset, ids)?;
    let left_has_run = left.iter().any(ParagraphContent::has_run);
    let right_has_run = right.iter().any(ParagraphContent::has_run);
    log::debug!("split paragraph at {}", offset);

    let whole = |content| Paragraph {
        properties: properties.clone(),
        content,
        attrs: attrs.clone(),
    };
    match (left_has_run, right_has_run) {
        (true, true) => Ok((
            Some(whole(left)),
            Some(Paragraph::from_content(right)),
        )),
        (true, false) => {
            left.append(&mut right);
            Ok((Some(whole(left)), None))
        }
        (false, true) => {
            left.append(&mut right);
            Ok((None, Some(whole(left))))
        }
        (false, false) => Ok((None, None)),
    }
}

/// Runs for `text`: one per span of ordinary characters, one per tab or
/// line break
pub(crate) fn build_runs(text: &str, format: Option<&RunFormat>) -> Vec<Run> {
    let properties = format.and_then(RunFormat::to_properties);
    let make = |leaf: Leaf| Run {
        properties: properties.clone(),
        content: vec![leaf],
        attrs: Vec::new(),
    };

    let mut runs = Vec::new();
    let mut pending = String::new();
    for ch in text.chars() {
        let special = match ch {
            '\t' => Leaf::Tab,
            '\n' => Leaf::line_break(BreakType::TextWrapping),
            _ => {
                pending.push(ch);
                continue;
            }
        };
        if !pending.is_empty() {
            runs.push(make(Leaf::text(std::mem::take(&mut pending))));
        }
        runs.push(make(special));
    }
    if !pending.is_empty() {
        runs.push(make(Leaf::text(pending)));
    }
    runs
}

/// Insert `text` at `offset`. Tabs and newlines become tab and break leaves.
pub fn insert_text(
    paragraph: &mut Paragraph,
    offset: usize,
    text: &str,
    options: &EditOptions,
    ids: &mut RevisionIds,
) -> Result<()> {
    let runs = build_runs(text, options.format.as_ref());
    insert_runs(paragraph, offset, runs, options, ids)
}

pub fn insert_tab(
    paragraph: &mut Paragraph,
    offset: usize,
    options: &EditOptions,
    ids: &mut RevisionIds,
) -> Result<()> {
    insert_leaf(paragraph, offset, Leaf::Tab, options, ids)
}

pub fn insert_break(
    paragraph: &mut Paragraph,
    offset: usize,
    kind: BreakType,
    options: &EditOptions,
    ids: &mut RevisionIds,
) -> Result<()> {
    insert_leaf(paragraph, offset, Leaf::line_break(kind), options, ids)
}

fn insert_leaf(
    paragraph: &mut Paragraph,
    offset: usize,
    leaf: Leaf,
    options: &EditOptions,
    ids: &mut RevisionIds,
) -> Result<()> {
    let mut run = Run::from_leaves(vec![leaf]);
    if let Some(format) = &options.format {
        run = run.with_format(format);
    }
    insert_runs(paragraph, offset, vec![run], options, ids)
}

fn insert_runs(
    paragraph: &mut Paragraph,
    offset: usize,
    runs: Vec<Run>,
    options: &EditOptions,
    ids: &mut RevisionIds,
) -> Result<()> {
    let len = paragraph.flat_len();
    if offset > len {
        return Err(Error::out_of_range(offset, 0, len));
    }
    if runs.is_empty() {
        return Ok(());
    }

    let mut inserted: Vec<ParagraphContent> = runs.into_iter().map(ParagraphContent::Run).collect();
    if let Some(editor) = &options.editor {
        let change = wrap(RevisionKind::Insertion, editor, inserted, ids);
        inserted = vec![ParagraphContent::TrackedChange(change)];
    }

    let content = std::mem::take(&mut paragraph.content);
    let (mut left, right) = split_content(content, offset, ids)?;
    log::debug!(
        "insert {} item(s) at {} (tracked: {})",
        inserted.len(),
        offset,
        options.editor.is_some()
    );
    left.extend(inserted);
    left.extend(right);
    paragraph.content = left;
    Ok(())
}

/// Delete `[start, end)`.
///
/// With an editor the range is kept and wrapped as a tracked deletion;
/// content already deleted or moved away stays as it is, and inserted
/// content gets a deletion nested inside its insertion. Deletions go
/// inside hyperlinks and other containers. Without an editor the range is
/// removed, keeping only markup that holds no offsets (bookmarks,
/// comments...).
pub fn delete_range(
    paragraph: &mut Paragraph,
    start: usize,
    end: usize,
    editor: Option<&Editor>,
    ids: &mut RevisionIds,
) -> Result<()> {
    let len = paragraph.flat_len();
    if end > len {
        return Err(Error::out_of_range(end, 0, len));
    }
    if start > end {
        return Err(Error::out_of_range(start, 0, end));
    }
    if start == end {
        return Ok(());
    }

    let content = std::mem::take(&mut paragraph.content);
    let (rest, tail) = split_content(content, end, ids)?;
    let (mut head, middle) = split_content(rest, start, ids)?;

    let middle = match editor {
        Some(editor) => mark_deleted(middle, editor, ids),
        None => keep_markers(middle),
    };
    log::debug!("deleted [{}, {}) (tracked: {})", start, end, editor.is_some());

    head.extend(middle);
    head.extend(tail);
    paragraph.content = head;
    Ok(())
}

/// Wrap live content in deletions, leaving existing deletions alone
fn mark_deleted(
    items: Vec<ParagraphContent>,
    editor: &Editor,
    ids: &mut RevisionIds,
) -> Vec<ParagraphContent> {
    let mut out = Vec::new();
    let mut pending = Vec::new();

    for item in items {
        match item {
            ParagraphContent::TrackedChange(mut change) => {
                flush_deleted(&mut pending, &mut out, editor, ids);
                if !change.kind.removes_content() {
                    let content = std::mem::take(&mut change.content);
                    change.content = mark_deleted(content, editor, ids);
                }
                out.push(ParagraphContent::TrackedChange(change));
            }
            ParagraphContent::Container(mut container) => {
                flush_deleted(&mut pending, &mut out, editor, ids);
                let content = std::mem::take(&mut container.content);
                container.content = mark_deleted(content, editor, ids);
                out.push(ParagraphContent::Container(container));
            }
            other => pending.push(other),
        }
    }
    flush_deleted(&mut pending, &mut out, editor, ids);
    out
}

/// Drop runs, and wrappers left without them; markers inside wrappers
/// move up to the paragraph level.
fn keep_markers(items: Vec<ParagraphContent>) -> Vec<ParagraphContent> {
    let mut out = Vec::new();
    for item in items {
        match item {
            ParagraphContent::Run(_) => {}
            ParagraphContent::TrackedChange(change) => out.extend(keep_markers(change.content)),
            ParagraphContent::Container(container) => out.extend(keep_markers(container.content)),
            unknown @ ParagraphContent::Unknown(_) => out.push(unknown),
        }
    }
    out
}

fn flush_deleted(
    pending: &mut Vec<ParagraphContent>,
    out: &mut Vec<ParagraphContent>,
    editor: &Editor,
    ids: &mut RevisionIds,
) {
    if pending.is_empty() {
        return;
    }
    let group = std::mem::take(pending);
    if group.iter().any(ParagraphContent::has_run) {
        let change = wrap(RevisionKind::Deletion, editor, group, ids);
        out.push(ParagraphContent::TrackedChange(change));
    } else {
        out.extend(group);
    }
}
