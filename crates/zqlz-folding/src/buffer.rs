//! Text buffer implementation using rope data structure.
//!
//! Folding needs three things from the text: its length, the character at an
//! offset and the line of an offset. A rope answers all three in O(log n),
//! and edits stay cheap on large scripts.
//!
//! We use the `ropey` crate. Ropey indexes by characters internally; this
//! buffer exposes UTF-8 byte offsets throughout and rejects offsets that do
//! not fall on a character boundary.

use crate::{DocumentSnapshot, FoldingError, Result, TextEdit};
use ropey::Rope;
use std::ops::Range;

/// An editable SQL document.
///
/// Every mutation returns the [`TextEdit`] it performed, which callers use to
/// move folding regions along with the text.
///
/// # Examples
///
/// ```
/// use zqlz_folding::TextBuffer;
///
/// let mut buffer = TextBuffer::new("SELECT 1;\nSELECT 2;");
/// assert_eq!(buffer.line_count(), 2);
///
/// let edit = buffer.insert(7, "42, ").unwrap();
/// assert_eq!(buffer.text(), "SELECT 42, 1;\nSELECT 2;");
/// assert_eq!(edit.inserted, 4);
/// assert_eq!(buffer.revision(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
    revision: u64,
}

impl TextBuffer {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            rope: Rope::from_str(text.as_ref()),
            revision: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the entire text content as a `String`.
    ///
    /// Note: This allocates. Prefer `slice()` for specific ranges.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Number of edits applied since the buffer was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with a newline counts
    /// that last empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the text of a line including its line ending, or `None` if
    /// the line index is out of bounds.
    pub fn line(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line(line_idx).to_string())
    }

    /// Returns the byte offset of the start of a line.
    pub fn line_to_byte(&self, line_idx: usize) -> Option<usize> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line_to_byte(line_idx))
    }

    /// Returns the line containing the given byte offset.
    pub fn byte_to_line(&self, offset: usize) -> Option<usize> {
        if offset > self.rope.len_bytes() {
            return None;
        }
        Some(self.rope.byte_to_line(offset))
    }

    /// Inserts text at the given byte offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is past the end of the buffer or splits
    /// a character.
    pub fn insert(&mut self, offset: usize, text: impl AsRef<str>) -> Result<TextEdit> {
        self.replace(offset..offset, text)
    }

    /// Deletes text in the given byte range.
    pub fn delete(&mut self, range: Range<usize>) -> Result<TextEdit> {
        self.replace(range, "")
    }

    /// Replaces a byte range with new text.
    ///
    /// # Examples
    ///
    /// ```
    /// use zqlz_folding::TextBuffer;
    ///
    /// let mut buffer = TextBuffer::new("SELECT a FROM t;");
    /// let edit = buffer.replace(7..8, "b, c").unwrap();
    /// assert_eq!(buffer.text(), "SELECT b, c FROM t;");
    /// assert_eq!((edit.offset, edit.removed, edit.inserted), (7, 1, 4));
    /// ```
    pub fn replace(&mut self, range: Range<usize>, text: impl AsRef<str>) -> Result<TextEdit> {
        if range.start > range.end {
            return Err(FoldingError::InvalidEdit(format!(
                "range {:?} has start > end",
                range
            )));
        }
        if range.end > self.rope.len_bytes() {
            return Err(FoldingError::InvalidEdit(format!(
                "range {:?} is out of bounds (buffer length: {})",
                range,
                self.rope.len_bytes()
            )));
        }

        let start_char = self.char_index(range.start).ok_or_else(|| {
            FoldingError::InvalidEdit(format!("offset {} splits a character", range.start))
        })?;
        let end_char = self.char_index(range.end).ok_or_else(|| {
            FoldingError::InvalidEdit(format!("offset {} splits a character", range.end))
        })?;

        let text = text.as_ref();
        if start_char < end_char {
            self.rope.remove(start_char..end_char);
        }
        if !text.is_empty() {
            self.rope.insert(start_char, text);
        }
        self.revision += 1;

        Ok(TextEdit::replace(range.start, range.len(), text.len()))
    }

    /// Returns the character starting at the given byte offset.
    pub fn get_char(&self, offset: usize) -> Option<char> {
        if offset >= self.rope.len_bytes() {
            return None;
        }
        let char_idx = self.char_index(offset)?;
        self.rope.get_char(char_idx)
    }

    /// Converts a byte offset into a char index, or `None` if the offset is
    /// out of bounds or inside a multi-byte character.
    fn char_index(&self, offset: usize) -> Option<usize> {
        if offset > self.rope.len_bytes() {
            return None;
        }
        let char_idx = self.rope.byte_to_char(offset);
        (self.rope.char_to_byte(char_idx) == offset).then_some(char_idx)
    }

    fn out_of_range(&self, offset: usize) -> FoldingError {
        FoldingError::OutOfRange {
            offset,
            len: self.rope.len_bytes(),
        }
    }
}

impl DocumentSnapshot for TextBuffer {
    fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    fn char_at(&self, offset: usize) -> Result<char> {
        self.get_char(offset).ok_or_else(|| self.out_of_range(offset))
    }

    fn line_of_offset(&self, offset: usize) -> Result<usize> {
        self.byte_to_line(offset)
            .ok_or_else(|| self.out_of_range(offset))
    }

    fn slice(&self, range: Range<usize>) -> Result<String> {
        let start = self
            .char_index(range.start)
            .ok_or_else(|| self.out_of_range(range.start))?;
        let end = self
            .char_index(range.end)
            .ok_or_else(|| self.out_of_range(range.end))?;
        if start > end {
            return Err(self.out_of_range(range.start));
        }
        Ok(self.rope.slice(start..end).to_string())
    }
}
