//! Read-only access to the document being folded.

use crate::Result;
use std::ops::Range;

/// A read-only view of the document for the duration of one reconcile.
///
/// All offsets are byte offsets. The reconciler never keeps a reference past
/// the call it was given one for, so hosts are free to mutate their text
/// between calls.
pub trait DocumentSnapshot {
    /// Length of the document in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the character starting at `offset`.
    ///
    /// # Errors
    ///
    /// Fails with [`FoldingError::OutOfRange`](crate::FoldingError::OutOfRange)
    /// unless `offset` lies in `[0, len())` on a character boundary.
    fn char_at(&self, offset: usize) -> Result<char>;

    /// Returns the 0-based line containing `offset`.
    ///
    /// `offset == len()` is valid and names the last line.
    fn line_of_offset(&self, offset: usize) -> Result<usize>;

    /// Returns the text of a byte range.
    fn slice(&self, range: Range<usize>) -> Result<String>;
}
