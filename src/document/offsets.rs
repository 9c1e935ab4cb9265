//! Document-level offset table: which paragraph holds which flat offsets.

use crate::document::paragraph::ParagraphContent;
use crate::document::revision::RevisionKind;
use crate::document::{Body, Leaf};
use crate::error::{Error, Result};

/// Offsets held by one paragraph, `(start, end]` in document coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParagraphSpan {
    /// Index into the body's paragraphs
    pub paragraph: usize,
    pub start: usize,
    pub end: usize,
}

/// Table of non-empty paragraphs ordered by offset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetTable {
    spans: Vec<ParagraphSpan>,
    total: usize,
}

impl OffsetTable {
    pub fn spans(&self) -> &[ParagraphSpan] {
        &self.spans
    }

    /// Length of the whole document text
    pub fn total_len(&self) -> usize {
        self.total
    }

    /// Paragraph and local offset holding document offset `offset`.
    ///
    /// The end of the document resolves to the end of the last non-empty
    /// paragraph.
    pub fn locate(&self, offset: usize) -> Result<(usize, usize)> {
        if offset > self.total {
            return Err(Error::out_of_range(offset, 0, self.total));
        }
        let pos = self.spans.partition_point(|s| s.end <= offset);
        let span = self
            .spans
            .get(pos)
            .or_else(|| self.spans.last())
            .ok_or_else(|| Error::out_of_range(offset, 0, 0))?;
        Ok((span.paragraph, offset - span.start))
    }
}

/// Rebuild the offset table of `body` in one pass over its leaves.
///
/// Deleted text outside a deletion or move source, and live text directly
/// inside a deletion, are reported as [`Error::InconsistentTree`].
pub fn rebuild(body: &Body) -> Result<OffsetTable> {
    let mut table = OffsetTable::default();

    for (index, paragraph) in body.paragraphs().enumerate() {
        let mut len = 0;
        check_items(&paragraph.content, None, index, &mut len)?;
        if len > 0 {
            table.spans.push(ParagraphSpan {
                paragraph: index,
                start: table.total,
                end: table.total + len,
            });
            table.total += len;
        }
    }

    log::debug!(
        "rebuilt offset table: {} addressable paragraphs, {} offsets",
        table.spans.len(),
        table.total
    );
    Ok(table)
}

fn check_items(
    items: &[ParagraphContent],
    wrapper: Option<RevisionKind>,
    paragraph: usize,
    len: &mut usize,
) -> Result<()> {
    for item in items {
        match item {
            ParagraphContent::Run(run) => {
                for leaf in &run.content {
                    match (leaf, wrapper) {
                        (
                            Leaf::DeletedText(_),
                            Some(RevisionKind::Deletion | RevisionKind::MoveFrom),
                        ) => {}
                        (Leaf::DeletedText(_), _) => {
                            return Err(Error::InconsistentTree(format!(
                                "paragraph {}: deleted text outside of a deletion",
                                paragraph
                            )))
                        }
                        (Leaf::Text(_), Some(RevisionKind::Deletion)) => {
                            return Err(Error::InconsistentTree(format!(
                                "paragraph {}: live text inside a deletion",
                                paragraph
                            )))
                        }
                        _ => {}
                    }
                    *len += leaf.len();
                }
            }
            ParagraphContent::TrackedChange(change) => {
                check_items(&change.content, Some(change.kind), paragraph, len)?;
            }
            ParagraphContent::Container(container) => {
                check_items(&container.content, wrapper, paragraph, len)?;
            }
            ParagraphContent::Unknown(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn body(xml_paragraphs: &str) -> Body {
        Body::from_xml(&format!(
            r#"<w:document xmlns:w="urn:w"><w:body>{}</w:body></w:document>"#,
            xml_paragraphs
        ))
        .unwrap()
    }

    #[test]
    fn test_spans_skip_empty_paragraphs() {
        let body = body(
            "<w:p><w:r><w:t>AB</w:t></w:r></w:p><w:p/><w:tbl/><w:p><w:r><w:tab/><w:t>C</w:t></w:r></w:p>",
        );
        let table = rebuild(&body).unwrap();

        assert_eq!(
            table.spans(),
            &[
                ParagraphSpan {
                    paragraph: 0,
                    start: 0,
                    end: 2
                },
                ParagraphSpan {
                    paragraph: 2,
                    start: 2,
                    end: 4
                },
            ]
        );
        assert_eq!(table.total_len(), 4);
    }

    #[test]
    fn test_locate() {
        let body = body("<w:p><w:r><w:t>AB</w:t></w:r></w:p><w:p><w:r><w:t>CD</w:t></w:r></w:p>");
        let table = rebuild(&body).unwrap();

        assert_eq!(table.locate(0).unwrap(), (0, 0));
        assert_eq!(table.locate(1).unwrap(), (0, 1));
        assert_eq!(table.locate(2).unwrap(), (1, 0));
        assert_eq!(table.locate(4).unwrap(), (1, 2));
        assert!(table.locate(5).is_err());
    }

    #[test]
    fn test_empty_document() {
        let table = rebuild(&body("<w:p/>")).unwrap();
        assert_eq!(table.total_len(), 0);
        assert!(matches!(table.locate(0), Err(Error::OffsetOutOfRange { .. })));
    }

    #[test]
    fn test_deleted_text_outside_deletion() {
        let body = body("<w:p><w:r><w:delText>x</w:delText></w:r></w:p>");
        assert!(matches!(rebuild(&body), Err(Error::InconsistentTree(_))));
    }

    #[test]
    fn test_text_inside_deletion() {
        let body = body(r#"<w:p><w:del w:id="1"><w:hyperlink><w:r><w:t>x</w:t></w:r></w:hyperlink></w:del></w:p>"#);
        assert!(matches!(rebuild(&body), Err(Error::InconsistentTree(_))));
    }

    #[test]
    fn test_deleted_insertion_is_consistent() {
        let body = body(
            r#"<w:p><w:ins w:id="1"><w:del w:id="2"><w:r><w:delText>x</w:delText></w:r></w:del><w:r><w:t>y</w:t></w:r></w:ins></w:p>"#,
        );
        let table = rebuild(&body).unwrap();
        assert_eq!(table.total_len(), 2);
    }

    #[test]
    fn test_moves_and_wrappers_are_consistent() {
        let moved = body(
            r#"<w:p><w:moveFrom w:id="1"><w:r><w:t>a</w:t><w:delText>b</w:delText></w:r></w:moveFrom><w:moveTo w:id="2"><w:r><w:t>c</w:t></w:r></w:moveTo><w:sdt><w:sdtContent><w:del w:id="3"><w:r><w:delText>d</w:delText></w:r></w:del></w:sdtContent></w:sdt></w:p>"#,
        );
        assert_eq!(rebuild(&moved).unwrap().total_len(), 4);

        let stray = body(
            r#"<w:p><w:moveTo w:id="2"><w:r><w:delText>c</w:delText></w:r></w:moveTo></w:p>"#,
        );
        assert!(matches!(rebuild(&stray), Err(Error::InconsistentTree(_))));
    }
}
