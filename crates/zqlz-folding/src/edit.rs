//! Text edits and the dirty regions they leave behind.
//!
//! Folding regions are stored as plain offsets, so every edit to the document
//! has to move them. [`TextEdit::map_range`] does that the same way for the
//! region registry and for the annotation model, keeping both in step.

use crate::IntervalKey;
use std::ops::Range;

/// A single replace operation on the document, in byte offsets of the text
/// before the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// Where the edit starts
    pub offset: usize,
    /// Number of bytes removed at `offset`
    pub removed: usize,
    /// Number of bytes inserted at `offset`
    pub inserted: usize,
}

impl TextEdit {
    pub fn insert(offset: usize, inserted: usize) -> Self {
        Self {
            offset,
            removed: 0,
            inserted,
        }
    }

    pub fn delete(offset: usize, removed: usize) -> Self {
        Self {
            offset,
            removed,
            inserted: 0,
        }
    }

    pub fn replace(offset: usize, removed: usize, inserted: usize) -> Self {
        Self {
            offset,
            removed,
            inserted,
        }
    }

    /// End of the removed span in the old text.
    pub fn removed_end(&self) -> usize {
        self.offset + self.removed
    }

    /// End of the inserted span in the new text.
    pub fn inserted_end(&self) -> usize {
        self.offset + self.inserted
    }

    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.inserted == 0
    }

    /// Maps an offset of the old text into the new text.
    ///
    /// Offsets inside the removed span collapse onto the edit. `after` picks
    /// which side of the inserted text they land on: `true` moves them past
    /// it, `false` keeps them in front of it.
    pub fn map_offset(&self, offset: usize, after: bool) -> usize {
        if offset < self.offset {
            offset
        } else if offset > self.removed_end() {
            offset - self.removed + self.inserted
        } else if after {
            self.inserted_end()
        } else {
            self.offset
        }
    }

    /// Maps a range of the old text into the new text.
    ///
    /// Insertions at the start of the range push it forward and insertions at
    /// its end do not extend it. Returns `None` when nothing of the range
    /// survives.
    pub fn map_range(&self, range: Range<usize>) -> Option<Range<usize>> {
        let start = self.map_offset(range.start, true);
        let end = self.map_offset(range.end, false);
        (start < end).then_some(start..end)
    }

    /// The dirty region a reconciler should look at after this edit.
    pub fn dirty_region(&self) -> DirtyRegion {
        if self.inserted > 0 {
            DirtyRegion::Insert {
                offset: self.offset,
                length: self.inserted,
            }
        } else {
            DirtyRegion::Remove {
                offset: self.offset,
                length: self.removed,
            }
        }
    }
}

/// A region reported changed by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyRegion {
    /// Text of `length` bytes now lives at `offset`
    Insert { offset: usize, length: usize },
    /// `length` bytes were removed at `offset`
    Remove { offset: usize, length: usize },
}

impl DirtyRegion {
    /// The damaged key used to plan an investigation window.
    ///
    /// Removed text no longer exists, so a removal damages an empty range at
    /// its offset.
    pub fn damaged_key(&self) -> IntervalKey {
        match *self {
            DirtyRegion::Insert { offset, length } => IntervalKey::new(offset, length),
            DirtyRegion::Remove { offset, .. } => IntervalKey::new(offset, 0),
        }
    }
}
