//! In-memory folding annotation model.

use crate::interval::RegionId;
use crate::{AnnotationDiff, AnnotationSink, TextEdit};
use std::collections::HashMap;
use std::ops::Range;

/// The editor side of folding: which annotation covers which range.
///
/// Mirrors what a projection annotation model keeps for a document. Ranges
/// follow text edits through [`apply_edit`](Self::apply_edit) with the same
/// mapping the region registry uses.
#[derive(Debug, Clone, Default)]
pub struct FoldingModel {
    annotations: HashMap<RegionId, Range<usize>>,
    diffs_applied: usize,
}

impl FoldingModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<Range<usize>> {
        self.annotations.get(&id).cloned()
    }

    /// Annotations sorted by range start.
    pub fn ranges(&self) -> Vec<(RegionId, Range<usize>)> {
        let mut ranges: Vec<_> = self
            .annotations
            .iter()
            .map(|(&id, range)| (id, range.clone()))
            .collect();
        ranges.sort_by_key(|(id, range)| (range.start, range.end, *id));
        ranges
    }

    /// Number of diffs received since creation or the last [`clear`](Self::clear).
    pub fn diffs_applied(&self) -> usize {
        self.diffs_applied
    }

    /// Moves annotation ranges along with a text edit and drops the ones that
    /// collapse. Returns the dropped ids.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Vec<RegionId> {
        let mut dropped = Vec::new();
        self.annotations.retain(|&id, range| match edit.map_range(range.clone()) {
            Some(mapped) => {
                *range = mapped;
                true
            }
            None => {
                dropped.push(id);
                false
            }
        });
        dropped.sort();
        dropped
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
        self.diffs_applied = 0;
    }
}

impl AnnotationSink for FoldingModel {
    fn apply_diff(&mut self, diff: &AnnotationDiff) {
        for id in &diff.retired {
            self.annotations.remove(id);
        }
        self.annotations
            .extend(diff.added.iter().map(|(&id, range)| (id, range.clone())));
        self.diffs_applied += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::RegionIdAllocator;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    #[test]
    fn test_apply_diff_retires_then_adds() {
        let mut ids = RegionIdAllocator::new();
        let (a, b, c) = (ids.mint(), ids.mint(), ids.mint());
        let mut model = FoldingModel::new();

        model.apply_diff(&AnnotationDiff {
            retired: vec![],
            added: BTreeMap::from([(a, 0..10), (b, 20..30)]),
        });
        model.apply_diff(&AnnotationDiff {
            retired: vec![a, b],
            added: BTreeMap::from([(a, 0..10), (c, 15..30)]),
        });

        assert_eq!(model.ranges(), vec![(a, 0..10), (c, 15..30)]);
        assert_eq!(model.get(b), None);
        assert_eq!(model.diffs_applied(), 2);
    }

    #[test]
    fn test_apply_edit_shifts_and_drops() {
        let mut ids = RegionIdAllocator::new();
        let (a, b, c) = (ids.mint(), ids.mint(), ids.mint());
        let mut model = FoldingModel::new();
        model.apply_diff(&AnnotationDiff {
            retired: vec![],
            added: BTreeMap::from([(a, 0..10), (b, 20..28), (c, 40..45)]),
        });

        let dropped = model.apply_edit(&TextEdit::delete(18, 12));

        assert_eq!(dropped, vec![b]);
        assert_eq!(model.ranges(), vec![(a, 0..10), (c, 28..33)]);
    }
}
