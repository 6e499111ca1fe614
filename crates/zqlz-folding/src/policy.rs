//! Statement folding policy.
//!
//! Decides which statements get a folding region and how far that region
//! reaches past the statement's last character.

use crate::settings::MIN_FOLDING_LINES;
use crate::{DocumentSnapshot, FoldingSettings, IntervalKey, Result, Statement};

/// Eligibility and extent rules for statement folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldingPolicy {
    min_lines: usize,
    absorb_trailing_whitespace: bool,
}

impl Default for FoldingPolicy {
    fn default() -> Self {
        Self {
            min_lines: MIN_FOLDING_LINES,
            absorb_trailing_whitespace: true,
        }
    }
}

impl FoldingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &FoldingSettings) -> Self {
        Self {
            min_lines: settings.effective_min_lines(),
            absorb_trailing_whitespace: settings.absorb_trailing_whitespace,
        }
    }

    /// Sets the line threshold. Values below 2 are raised to 2.
    pub fn with_min_lines(mut self, min_lines: usize) -> Self {
        self.min_lines = min_lines.max(MIN_FOLDING_LINES);
        self
    }

    pub fn with_absorb_trailing_whitespace(mut self, absorb: bool) -> Self {
        self.absorb_trailing_whitespace = absorb;
        self
    }

    pub fn min_lines(&self) -> usize {
        self.min_lines
    }

    /// Number of lines between the statement's start and its end offset,
    /// both inclusive.
    pub fn number_of_lines(
        &self,
        document: &dyn DocumentSnapshot,
        statement: &Statement,
    ) -> Result<usize> {
        let first = document.line_of_offset(statement.offset)?;
        let last = document.line_of_offset(statement.end())?;
        Ok(last - first + 1)
    }

    /// Length of the statement once it absorbs the whitespace after it.
    ///
    /// Whitespace is absorbed up to and including the first line break, as
    /// long as something follows that line break. If real content shows up
    /// before that, the raw length is kept.
    pub fn expand_query_length(
        &self,
        document: &dyn DocumentSnapshot,
        statement: &Statement,
    ) -> Result<usize> {
        if !self.absorb_trailing_whitespace {
            return Ok(statement.length);
        }

        let len = document.len();
        let mut position = statement.end();
        while position < len {
            let c = document.char_at(position)?;
            if c == '\n' && position + 1 < len {
                position += 1;
                break;
            }
            if !c.is_whitespace() {
                return Ok(statement.length);
            }
            position += c.len_utf8();
        }
        Ok(position - statement.offset)
    }

    /// Returns true if the statement should get a folding region.
    pub fn deserves_folding(
        &self,
        document: &dyn DocumentSnapshot,
        statement: &Statement,
    ) -> Result<bool> {
        Ok(self.fold_candidate(document, statement)?.is_some())
    }

    /// The key a fold for `statement` would have, or `None` if the statement
    /// does not deserve one.
    ///
    /// A statement folds when it spans at least `min_lines` lines. If there
    /// is no trailing whitespace for it to absorb, it must span strictly more
    /// than that.
    pub fn fold_candidate(
        &self,
        document: &dyn DocumentSnapshot,
        statement: &Statement,
    ) -> Result<Option<IntervalKey>> {
        let lines = self.number_of_lines(document, statement)?;
        if lines < self.min_lines {
            tracing::trace!(offset = statement.offset, lines, "statement too short to fold");
            return Ok(None);
        }

        let expanded = self.expand_query_length(document, statement)?;
        if expanded == statement.length && lines <= self.min_lines {
            tracing::trace!(
                offset = statement.offset,
                lines,
                "statement has nothing to absorb and too few lines to fold"
            );
            return Ok(None);
        }

        Ok(Some(IntervalKey::new(statement.offset, expanded)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TextBuffer;
    use pretty_assertions::assert_eq;

    fn first_statement(text: &str) -> Statement {
        let end = text.find(';').map_or(text.len(), |i| i + 1);
        Statement::new(0, end)
    }

    #[test]
    fn test_single_line_statement_never_folds() {
        let buffer = TextBuffer::new("SELECT 1;\n\nSELECT 2;");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        assert_eq!(policy.number_of_lines(&buffer, &statement).unwrap(), 1);
        assert!(!policy.deserves_folding(&buffer, &statement).unwrap());
    }

    #[test]
    fn test_two_lines_with_blank_line_after_fold() {
        let buffer = TextBuffer::new("SELECT *\nFROM t;\n\nSELECT 2;");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        assert_eq!(statement, Statement::new(0, 16));
        assert_eq!(policy.number_of_lines(&buffer, &statement).unwrap(), 2);
        assert_eq!(policy.expand_query_length(&buffer, &statement).unwrap(), 17);
        assert_eq!(
            policy.fold_candidate(&buffer, &statement).unwrap(),
            Some(IntervalKey::new(0, 17))
        );
    }

    #[test]
    fn test_two_lines_at_document_end_do_not_fold() {
        let buffer = TextBuffer::new("SELECT *\nFROM t;");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        assert_eq!(policy.expand_query_length(&buffer, &statement).unwrap(), 16);
        assert!(!policy.deserves_folding(&buffer, &statement).unwrap());
    }

    #[test]
    fn test_three_lines_at_document_end_fold() {
        let buffer = TextBuffer::new("SELECT *\nFROM t\nWHERE x = 1;");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        assert_eq!(
            policy.fold_candidate(&buffer, &statement).unwrap(),
            Some(IntervalKey::new(0, 28))
        );
    }

    #[test]
    fn test_two_lines_followed_by_content_do_not_fold() {
        let buffer = TextBuffer::new("SELECT *\nFROM t; SELECT 2;");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        assert_eq!(policy.expand_query_length(&buffer, &statement).unwrap(), 16);
        assert!(!policy.deserves_folding(&buffer, &statement).unwrap());
    }

    #[test]
    fn test_expansion_stops_after_one_line_break() {
        let buffer = TextBuffer::new("SELECT *\nFROM t;  \t\n\n\nSELECT 2;");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        // Spaces, tab and the first line break are absorbed.
        assert_eq!(policy.expand_query_length(&buffer, &statement).unwrap(), 20);
    }

    #[test]
    fn test_expansion_absorbs_final_line_break() {
        let buffer = TextBuffer::new("SELECT *\nFROM t;\n");
        let policy = FoldingPolicy::new();
        let statement = first_statement(&buffer.text());

        assert_eq!(policy.expand_query_length(&buffer, &statement).unwrap(), 17);
        assert!(policy.deserves_folding(&buffer, &statement).unwrap());
    }

    #[test]
    fn test_absorption_disabled_keeps_raw_length() {
        let buffer = TextBuffer::new("SELECT *\nFROM t;\n\nSELECT 2;");
        let policy = FoldingPolicy::new().with_absorb_trailing_whitespace(false);
        let statement = first_statement(&buffer.text());

        assert_eq!(policy.expand_query_length(&buffer, &statement).unwrap(), 16);
        assert!(!policy.deserves_folding(&buffer, &statement).unwrap());
    }

    #[test]
    fn test_higher_min_lines() {
        let buffer = TextBuffer::new("SELECT *\nFROM t\nWHERE x = 1;\n\nSELECT 2;");
        let statement = first_statement(&buffer.text());

        let policy = FoldingPolicy::new().with_min_lines(3);
        assert!(policy.deserves_folding(&buffer, &statement).unwrap());

        let policy = FoldingPolicy::new().with_min_lines(4);
        assert!(!policy.deserves_folding(&buffer, &statement).unwrap());
        assert_eq!(FoldingPolicy::new().with_min_lines(1).min_lines(), 2);
    }

    #[test]
    fn test_statement_past_document_end_is_out_of_range() {
        let buffer = TextBuffer::new("SELECT 1;");
        let policy = FoldingPolicy::new();

        let err = policy
            .deserves_folding(&buffer, &Statement::new(0, 40))
            .unwrap_err();
        assert!(err.is_out_of_range());
    }
}
