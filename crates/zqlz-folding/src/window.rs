//! Investigation window planning.

use crate::{
    DocumentSnapshot, FoldingError, IntervalKey, RegionRegistry, Result, StatementExtractor,
    TrackedRegion, extract_with_retry,
};
use serde::Serialize;

/// The slice of the document a reconcile has to re-derive.
///
/// `left` and `right` are the nearest tracked regions that do not overlap the
/// damaged range. They bound the window and survive the reconcile untouched.
/// `right` is `None` when the window runs to the end of the document, even if
/// a region follows the damaged range: that region no longer holds a single
/// statement and is investigated along with everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvestigationWindow {
    pub offset: usize,
    pub length: usize,
    pub left: Option<TrackedRegion>,
    pub right: Option<TrackedRegion>,
}

impl InvestigationWindow {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn key(&self) -> IntervalKey {
        IntervalKey::new(self.offset, self.length)
    }

    /// Returns true if the window runs to the end of a document of `len`
    /// bytes.
    pub fn reaches_end(&self, len: usize) -> bool {
        self.end() >= len
    }
}

/// Computes investigation windows around damaged ranges.
pub struct WindowPlanner;

impl WindowPlanner {
    /// Plans the window for `damaged`.
    ///
    /// The window starts where the left neighbour ends. It stops at the right
    /// neighbour if that region still holds exactly one statement, and
    /// otherwise runs to the end of the document.
    pub fn plan(
        registry: &RegionRegistry,
        document: &dyn DocumentSnapshot,
        extractor: &mut dyn StatementExtractor,
        damaged: IntervalKey,
    ) -> Result<InvestigationWindow> {
        let len = document.len();
        let left = registry.predecessor(&damaged);
        let right = registry.successor(&damaged);

        let offset = left.map_or(0, |region| region.end());
        if offset > len {
            return Err(FoldingError::OutOfRange { offset, len });
        }

        let right_intact = match right {
            Some(region) => {
                if region.end() > len {
                    return Err(FoldingError::OutOfRange {
                        offset: region.end(),
                        len,
                    });
                }
                extract_with_retry(extractor, document, region.offset(), region.length())?.len()
                    == 1
            }
            None => false,
        };

        let (length, right) = match right {
            Some(region) if right_intact => (region.offset() - offset, Some(region)),
            _ => (len - offset, None),
        };

        let window = InvestigationWindow {
            offset,
            length,
            left,
            right,
        };
        tracing::debug!(
            damaged = %damaged,
            window = %window.key(),
            left = ?left.map(|r| r.key),
            right = ?right.map(|r| r.key),
            "planned investigation window"
        );
        Ok(window)
    }
}
