//! ZQLZ Folding - Incremental statement folding for the SQL editor
//!
//! This crate keeps the editor's statement folds in step with the text:
//! - An ordered registry of folded intervals with neighbour queries
//! - Investigation windows that bound how much text an edit re-derives
//! - A policy deciding which statements fold and how far
//! - A reconciler that reuses annotation ids for folds that did not change
//!
//! [`FoldingSession`] wires a rope buffer, the SQL statement extractor and an
//! in-memory fold model around the reconciler.

pub mod buffer;
pub mod document;
pub mod edit;
mod error;
pub mod extractor;
pub mod interval;
pub mod model;
pub mod policy;
pub mod reconciler;
pub mod registry;
pub mod session;
pub mod settings;
pub mod sink;
pub mod window;

pub use buffer::TextBuffer;
pub use document::DocumentSnapshot;
pub use edit::{DirtyRegion, TextEdit};
pub use error::{FoldingError, Result};
pub use extractor::{SqlStatementExtractor, Statement, StatementExtractor, extract_with_retry};
pub use interval::{IntervalKey, RegionId, RegionIdAllocator, TrackedRegion};
pub use model::FoldingModel;
pub use policy::FoldingPolicy;
pub use reconciler::{
    FoldingHost, FoldingReconciler, ReconcileOutcome, ReconcileReport, SkipReason,
};
pub use registry::RegionRegistry;
pub use session::FoldingSession;
pub use settings::FoldingSettings;
pub use sink::{AnnotationDiff, AnnotationSink};
pub use window::{InvestigationWindow, WindowPlanner};
