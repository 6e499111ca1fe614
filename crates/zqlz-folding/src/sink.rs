//! Annotation diffs and the sink that renders them.

use crate::interval::RegionId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;

/// One atomic update of the folding annotations.
///
/// Every id in `retired` is removed, then every entry of `added` is
/// installed. An id may appear on both sides; that re-adds the same
/// annotation and is how reused regions flow through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationDiff {
    pub retired: Vec<RegionId>,
    pub added: BTreeMap<RegionId, Range<usize>>,
}

impl AnnotationDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.retired.is_empty() && self.added.is_empty()
    }

    /// Returns true if applying the diff changes nothing the sink can see.
    ///
    /// That holds when the retired ids are exactly the added ids, and the
    /// caller knows the ranges are unchanged (the reconciler only reuses an
    /// id for an equal key).
    pub fn is_noop(&self) -> bool {
        self.retired.len() == self.added.len()
            && self.retired.iter().all(|id| self.added.contains_key(id))
    }

    /// Ids that are both retired and added.
    pub fn retained(&self) -> Vec<RegionId> {
        self.retired
            .iter()
            .copied()
            .filter(|id| self.added.contains_key(id))
            .collect()
    }

    /// Ids that are added without having been retired.
    pub fn minted(&self) -> Vec<RegionId> {
        self.added
            .keys()
            .copied()
            .filter(|id| !self.retired.contains(id))
            .collect()
    }

    /// Ids that are retired and not added back.
    pub fn dropped(&self) -> Vec<RegionId> {
        self.retired
            .iter()
            .copied()
            .filter(|id| !self.added.contains_key(id))
            .collect()
    }
}

/// Receiver of folding annotation updates, typically the editor's fold model.
pub trait AnnotationSink {
    /// Applies a diff as a single operation.
    fn apply_diff(&mut self, diff: &AnnotationDiff);
}
