//! Offset index: maps flat offsets to the leaves holding them.

use crate::document::Leaf;

/// Anything whose descendants are leaves laid out in document order.
pub trait LeafContainer {
    /// Visit every descendant leaf in order, with the child-index path
    /// leading to it from `self`.
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf));

    /// Total length in the flat offset space
    fn flat_len(&self) -> usize {
        let mut len = 0;
        self.walk(&mut Vec::new(), &mut |_, leaf| len += leaf.len());
        len
    }

    /// Text as one string: tabs as `'\t'`, breaks as `'\n'`, deleted text included
    fn flatten(&self) -> String {
        let mut out = String::new();
        self.walk(&mut Vec::new(), &mut |_, leaf| leaf.push_text(&mut out));
        out
    }

    /// Visit the leaves left once every tracked change is accepted
    fn walk_live<'a>(&'a self, visit: &mut dyn FnMut(&'a Leaf)) {
        self.walk(&mut Vec::new(), &mut |_, leaf| {
            if !matches!(leaf, Leaf::DeletedText(_)) {
                visit(leaf);
            }
        });
    }

    /// Like [`flatten`](Self::flatten) but without deleted or moved-away text
    fn live_text(&self) -> String {
        let mut out = String::new();
        self.walk_live(&mut |leaf| leaf.push_text(&mut out));
        out
    }
}

impl LeafContainer for Leaf {
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf)) {
        visit(path.as_slice(), self);
    }
}

impl<T: LeafContainer> LeafContainer for [T] {
    fn walk<'a>(&'a self, path: &mut Vec<usize>, visit: &mut dyn FnMut(&[usize], &'a Leaf)) {
        for (i, child) in self.iter().enumerate() {
            path.push(i);
            child.walk(path, visit);
            path.pop();
        }
    }

    fn walk_live<'a>(&'a self, visit: &mut dyn FnMut(&'a Leaf)) {
        for child in self {
            child.walk_live(visit);
        }
    }
}

/// One indexed leaf, owning the offsets `(start, end]`
#[derive(Clone, Debug)]
pub struct IndexEntry<'a> {
    pub start: usize,
    pub end: usize,
    /// Child indices from the container down to the leaf
    pub path: Vec<usize>,
    pub leaf: &'a Leaf,
}

/// Ordered `(end offset, leaf)` table for one container
#[derive(Clone, Debug, Default)]
pub struct OffsetIndex<'a> {
    entries: Vec<IndexEntry<'a>>,
}

impl<'a> OffsetIndex<'a> {
    /// Index the non-empty leaves of `container`, offsets relative to its start
    pub fn build<C: LeafContainer + ?Sized>(container: &'a C) -> Self {
        let mut entries = Vec::new();
        let mut end = 0;
        container.walk(&mut Vec::new(), &mut |path, leaf| {
            let len = leaf.len();
            if len == 0 {
                return;
            }
            log::trace!("indexing leaf at {:?}: ({}, {}]", path, end, end + len);
            entries.push(IndexEntry {
                start: end,
                end: end + len,
                path: path.to_vec(),
                leaf,
            });
            end += len;
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[IndexEntry<'a>] {
        &self.entries
    }

    /// End offset of the last leaf
    pub fn flat_len(&self) -> usize {
        self.entries.last().map_or(0, |e| e.end)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First leaf whose end offset exceeds `offset`
    pub fn find(&self, offset: usize) -> Option<&IndexEntry<'a>> {
        let pos = self.entries.partition_point(|e| e.end <= offset);
        self.entries.get(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BreakType, Run};
    use crate::xml::RawXmlElement;

    fn sample() -> Vec<Run> {
        vec![
            Run::new("AB"),
            Run::from_leaves(vec![
                Leaf::Opaque(RawXmlElement::new("w:lastRenderedPageBreak")),
                Leaf::Tab,
            ]),
            Run::from_leaves(vec![Leaf::text("CD"), Leaf::line_break(BreakType::TextWrapping)]),
        ]
    }

    #[test]
    fn test_empty_container() {
        let runs: Vec<Run> = Vec::new();
        let index = OffsetIndex::build(runs.as_slice());
        assert!(index.is_empty());
        assert!(index.find(0).is_none());
        assert_eq!(index.flat_len(), 0);
    }

    #[test]
    fn test_zero_length_leaves_not_indexed() {
        let runs = sample();
        let index = OffsetIndex::build(runs.as_slice());

        let paths: Vec<_> = index.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![vec![0, 0], vec![1, 1], vec![2, 0], vec![2, 1]]);
        assert_eq!(index.flat_len(), 6);
        assert_eq!(runs.as_slice().flatten(), "AB\tCD\n");
    }

    #[test]
    fn test_end_offsets_strictly_increase() {
        let runs = sample();
        let index = OffsetIndex::build(runs.as_slice());
        let ends: Vec<_> = index.entries().iter().map(|e| e.end).collect();
        assert_eq!(ends, vec![2, 3, 5, 6]);
        assert!(ends.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_find_uses_exclusive_start() {
        let runs = sample();
        let index = OffsetIndex::build(runs.as_slice());

        assert_eq!(index.find(0).unwrap().path, vec![0, 0]);
        assert_eq!(index.find(1).unwrap().path, vec![0, 0]);
        // offset 2 is the end of "AB", so the tab owns the next position
        assert_eq!(index.find(2).unwrap().path, vec![1, 1]);
        assert_eq!(index.find(5).unwrap().path, vec![2, 1]);
        assert!(index.find(6).is_none());
    }
}
