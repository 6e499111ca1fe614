//! Folding state for one open SQL document.

use crate::{
    AnnotationSink, FoldingHost, FoldingModel, FoldingPolicy, FoldingReconciler, FoldingSettings,
    ReconcileOutcome, Result, SqlStatementExtractor, StatementExtractor, TextBuffer, TrackedRegion,
};
use std::ops::Range;

/// A document together with its folds.
///
/// Every edit goes through the session so the text, the tracked regions and
/// the fold model move together, followed by a reconcile of the damaged
/// range.
///
/// # Examples
///
/// ```
/// use zqlz_folding::{FoldingSession, FoldingSettings};
///
/// let mut session =
///     FoldingSession::open("SELECT *\nFROM t;\n\nSELECT 1;", FoldingSettings::default()).unwrap();
/// assert_eq!(session.regions().len(), 1);
///
/// session.insert(8, ", id").unwrap();
/// assert_eq!(session.regions()[0].range(), 0..21);
/// ```
#[derive(Debug)]
pub struct FoldingSession {
    buffer: TextBuffer,
    extractor: SqlStatementExtractor,
    model: Option<FoldingModel>,
    settings: FoldingSettings,
    reconciler: FoldingReconciler,
}

impl FoldingSession {
    /// Opens a document and folds it completely.
    pub fn open(text: impl AsRef<str>, settings: FoldingSettings) -> Result<Self> {
        let mut session = Self {
            buffer: TextBuffer::new(text),
            extractor: SqlStatementExtractor::new(),
            model: Some(FoldingModel::new()),
            reconciler: FoldingReconciler::new(FoldingPolicy::from_settings(&settings)),
            settings,
        };
        session.reconcile_all()?;
        Ok(session)
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn settings(&self) -> &FoldingSettings {
        &self.settings
    }

    pub fn model(&self) -> Option<&FoldingModel> {
        self.model.as_ref()
    }

    pub fn reconciler(&self) -> &FoldingReconciler {
        &self.reconciler
    }

    /// Gives access to the extractor, e.g. to change the delimiter.
    pub fn extractor_mut(&mut self) -> &mut SqlStatementExtractor {
        &mut self.extractor
    }

    /// Tracked folds in offset order.
    pub fn regions(&self) -> Vec<TrackedRegion> {
        self.reconciler.registry().iter().collect()
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<ReconcileOutcome> {
        self.replace(offset..offset, text)
    }

    pub fn delete(&mut self, range: Range<usize>) -> Result<ReconcileOutcome> {
        self.replace(range, "")
    }

    /// Replaces a byte range, moves the folds along and reconciles the
    /// damaged range.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<ReconcileOutcome> {
        let edit = self.buffer.replace(range, text)?;

        let dropped = self.reconciler.apply_edit(&edit);
        if let Some(model) = self.model.as_mut() {
            model.apply_edit(&edit);
        }
        if !dropped.is_empty() {
            tracing::debug!(dropped = dropped.len(), "folds deleted by edit");
        }

        let dirty = edit.dirty_region();
        self.with_host(|reconciler, host, buffer| {
            reconciler.reconcile_dirty_region(host, buffer, dirty)
        })
    }

    /// Re-derives every fold of the document.
    pub fn reconcile_all(&mut self) -> Result<ReconcileOutcome> {
        self.with_host(|reconciler, host, buffer| reconciler.reconcile_all(host, buffer))
    }

    /// Applies new settings and refolds the document.
    ///
    /// Disabling folding removes every fold.
    pub fn set_settings(&mut self, settings: FoldingSettings) -> Result<ReconcileOutcome> {
        self.reconciler
            .set_policy(FoldingPolicy::from_settings(&settings));
        self.settings = settings;

        if !self.settings.enabled {
            self.reconciler.reset();
            if let Some(model) = self.model.as_mut() {
                model.clear();
            }
        }
        self.reconcile_all()
    }

    /// Detaches the fold model. Reconciles are skipped until a model is
    /// attached again.
    pub fn detach_sink(&mut self) -> Option<FoldingModel> {
        self.model.take()
    }

    /// Attaches a fold model, replacing its content with a full reconcile.
    pub fn attach_sink(&mut self, mut model: FoldingModel) -> Result<ReconcileOutcome> {
        model.clear();
        self.model = Some(model);
        self.reconciler.reset();
        self.reconcile_all()
    }

    fn with_host<F>(&mut self, f: F) -> Result<ReconcileOutcome>
    where
        F: FnOnce(
            &mut FoldingReconciler,
            &mut dyn FoldingHost,
            &TextBuffer,
        ) -> Result<ReconcileOutcome>,
    {
        let mut host = SessionHost {
            enabled: self.settings.enabled,
            extractor: &mut self.extractor,
            model: &mut self.model,
        };
        f(&mut self.reconciler, &mut host, &self.buffer)
    }
}

struct SessionHost<'a> {
    enabled: bool,
    extractor: &'a mut SqlStatementExtractor,
    model: &'a mut Option<FoldingModel>,
}

impl FoldingHost for SessionHost<'_> {
    fn is_folding_enabled(&self) -> bool {
        self.enabled
    }

    fn extractor(&mut self) -> &mut dyn StatementExtractor {
        &mut *self.extractor
    }

    fn annotation_sink(&mut self) -> Option<&mut dyn AnnotationSink> {
        self.model
            .as_mut()
            .map(|model| model as &mut dyn AnnotationSink)
    }
}
