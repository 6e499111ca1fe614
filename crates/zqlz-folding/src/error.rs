//! Error types for folding reconciliation

use thiserror::Error;

/// Result type alias for folding operations
pub type Result<T> = std::result::Result<T, FoldingError>;

/// Errors raised while reconciling folding regions.
///
/// A sink missing when a reconcile starts is not represented here: it turns
/// the reconcile into a no-op instead of failing it.
#[derive(Debug, Error)]
pub enum FoldingError {
    /// A document offset fell outside the current text. The window or the
    /// registry was computed from offsets that no longer match the document.
    #[error("Offset {offset} is out of range (document length: {len})")]
    OutOfRange { offset: usize, len: usize },

    /// The statement extractor stayed stale after its context was rebuilt.
    #[error("Statement extraction context is stale for range {offset}+{length} after rebuild")]
    StaleContext { offset: usize, length: usize },

    /// The host detached its annotation sink while a reconcile was running.
    #[error("Annotation sink was detached during reconcile")]
    SinkDetached,

    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FoldingError {
    /// Returns true if the error means a document offset was stale.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    /// Returns true if the extractor could not recover its context.
    pub fn is_stale_context(&self) -> bool {
        matches!(self, Self::StaleContext { .. })
    }
}
