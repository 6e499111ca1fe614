//! Statement extraction.
//!
//! The reconciler does not parse SQL itself. It asks a [`StatementExtractor`]
//! for the statements inside a byte range and folds whatever comes back.
//! [`SqlStatementExtractor`] is the extractor used by the editor: it splits on
//! the statement delimiter while skipping quoted text and comments.

use crate::{DocumentSnapshot, FoldingError, IntervalKey, Result};

/// A top-level statement span, `[offset, offset + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    pub offset: usize,
    pub length: usize,
}

impl Statement {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn key(&self) -> IntervalKey {
        IntervalKey::new(self.offset, self.length)
    }
}

/// Produces statements for a range of the document.
pub trait StatementExtractor {
    /// Returns the statements that start inside `[offset, offset + length)`,
    /// in offset order.
    ///
    /// `Ok(None)` means the extractor's parsing context is stale and has to be
    /// rebuilt before it can answer.
    fn extract_statements(
        &mut self,
        document: &dyn DocumentSnapshot,
        offset: usize,
        length: usize,
    ) -> Result<Option<Vec<Statement>>>;

    /// Rebuilds the parsing context after a stale answer.
    fn rebuild_context(&mut self);
}

/// Extracts statements, rebuilding a stale context at most once.
///
/// # Errors
///
/// Returns [`FoldingError::StaleContext`] if the extractor is still stale
/// after the rebuild, and propagates document access errors.
pub fn extract_with_retry(
    extractor: &mut dyn StatementExtractor,
    document: &dyn DocumentSnapshot,
    offset: usize,
    length: usize,
) -> Result<Vec<Statement>> {
    if let Some(statements) = extractor.extract_statements(document, offset, length)? {
        return Ok(statements);
    }

    tracing::warn!(offset, length, "statement extraction context is stale, rebuilding");
    extractor.rebuild_context();

    extractor
        .extract_statements(document, offset, length)?
        .ok_or(FoldingError::StaleContext { offset, length })
}

/// Parsing context of the SQL extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScriptContext {
    delimiter: char,
}

/// Splits SQL scripts into statements.
///
/// A statement starts at its first non-whitespace character (comments
/// included) and ends right after its delimiter. A trailing statement without
/// a delimiter ends after its last non-whitespace character. Delimiters inside
/// `'...'`, `"..."` and `` `...` `` literals, `-- ...` line comments and
/// `/* ... */` block comments are ignored. Doubled quotes are escapes.
///
/// Changing the delimiter invalidates the parsing context; the next
/// extraction reports it as stale until [`rebuild_context`] is called.
///
/// [`rebuild_context`]: StatementExtractor::rebuild_context
///
/// # Examples
///
/// ```
/// use zqlz_folding::{SqlStatementExtractor, Statement};
///
/// let extractor = SqlStatementExtractor::new();
/// let statements = extractor.split("SELECT ';';\n\nSELECT 2");
/// assert_eq!(statements, vec![Statement::new(0, 11), Statement::new(13, 8)]);
/// ```
#[derive(Debug, Clone)]
pub struct SqlStatementExtractor {
    delimiter: char,
    context: Option<ScriptContext>,
    rebuilds: usize,
}

impl Default for SqlStatementExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlStatementExtractor {
    pub fn new() -> Self {
        Self::with_delimiter(';')
    }

    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter,
            context: Some(ScriptContext { delimiter }),
            rebuilds: 0,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Changes the statement delimiter. The context becomes stale.
    pub fn set_delimiter(&mut self, delimiter: char) {
        if delimiter != self.delimiter {
            self.delimiter = delimiter;
            self.context = None;
        }
    }

    /// Drops the parsing context without changing any configuration.
    pub fn invalidate(&mut self) {
        self.context = None;
    }

    pub fn is_stale(&self) -> bool {
        self.context.is_none()
    }

    /// Number of times the context was rebuilt.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Splits `text` with the configured delimiter, ignoring staleness.
    ///
    /// Offsets are relative to the start of `text`.
    pub fn split(&self, text: &str) -> Vec<Statement> {
        split_with(text, self.delimiter)
    }
}

impl StatementExtractor for SqlStatementExtractor {
    fn extract_statements(
        &mut self,
        document: &dyn DocumentSnapshot,
        offset: usize,
        length: usize,
    ) -> Result<Option<Vec<Statement>>> {
        let Some(context) = self.context else {
            return Ok(None);
        };

        let text = document.slice(offset..offset + length)?;
        let statements = split_with(&text, context.delimiter)
            .into_iter()
            .map(|statement| Statement::new(statement.offset + offset, statement.length))
            .collect::<Vec<_>>();

        tracing::trace!(
            offset,
            length,
            statements = statements.len(),
            "extracted statements"
        );
        Ok(Some(statements))
    }

    fn rebuild_context(&mut self) {
        self.context = Some(ScriptContext {
            delimiter: self.delimiter,
        });
        self.rebuilds += 1;
        tracing::debug!(delimiter = %self.delimiter, "rebuilt statement extraction context");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    LineComment,
    BlockComment,
    Quoted(char),
}

/// Accumulates the span of the statement being scanned.
#[derive(Debug, Default)]
struct SpanBuilder {
    start: Option<usize>,
    content_end: usize,
    statements: Vec<Statement>,
}

impl SpanBuilder {
    fn mark(&mut self, from: usize, to: usize) {
        self.start.get_or_insert(from);
        self.content_end = to;
    }

    fn finish(&mut self, end: usize) {
        if let Some(start) = self.start.take() {
            self.statements.push(Statement::new(start, end - start));
        }
    }
}

fn split_with(text: &str, delimiter: char) -> Vec<Statement> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = SpanBuilder::default();
    let mut state = ScanState::Code;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);
        let end = pos + c.len_utf8();

        match state {
            ScanState::Code => {
                if c == delimiter {
                    spans.finish(end);
                    i += 1;
                    continue;
                }
                if c == '-' && next == Some('-') {
                    state = ScanState::LineComment;
                    spans.mark(pos, end + 1);
                    i += 2;
                    continue;
                }
                if c == '/' && next == Some('*') {
                    state = ScanState::BlockComment;
                    spans.mark(pos, end + 1);
                    i += 2;
                    continue;
                }
                if matches!(c, '\'' | '"' | '`') {
                    state = ScanState::Quoted(c);
                }
            }
            ScanState::LineComment => {
                if c == '\n' {
                    state = ScanState::Code;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && next == Some('/') {
                    state = ScanState::Code;
                    spans.mark(pos, end + 1);
                    i += 2;
                    continue;
                }
            }
            ScanState::Quoted(quote) => {
                if c == quote {
                    if next == Some(quote) {
                        spans.mark(pos, end + quote.len_utf8());
                        i += 2;
                        continue;
                    }
                    state = ScanState::Code;
                }
            }
        }

        if !c.is_whitespace() {
            spans.mark(pos, end);
        }
        i += 1;
    }

    let content_end = spans.content_end;
    spans.finish(content_end);
    spans.statements
}
