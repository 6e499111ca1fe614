//! Incremental folding reconciliation.
//!
//! After an edit, only the statements between the nearest untouched folds
//! around the damaged range are re-derived. Folds whose range did not change
//! keep their annotation id so the editor does not redraw or unfold them.

use crate::interval::{RegionId, RegionIdAllocator};
use crate::{
    AnnotationDiff, AnnotationSink, DirtyRegion, DocumentSnapshot, FoldingError, FoldingPolicy,
    IntervalKey, InvestigationWindow, RegionRegistry, Result, Statement, StatementExtractor,
    TextEdit, TrackedRegion, WindowPlanner, extract_with_retry,
};
use serde::Serialize;

/// What a reconciler needs from the editor hosting the document.
pub trait FoldingHost {
    fn is_folding_enabled(&self) -> bool;

    fn extractor(&mut self) -> &mut dyn StatementExtractor;

    /// The sink folding annotations go to, if the editor has one attached.
    fn annotation_sink(&mut self) -> Option<&mut dyn AnnotationSink>;
}

/// Why a reconcile did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    FoldingDisabled,
    NoAnnotationSink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReconcileOutcome {
    Skipped(SkipReason),
    Applied(ReconcileReport),
}

impl ReconcileOutcome {
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            ReconcileOutcome::Applied(report) => Some(report),
            ReconcileOutcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ReconcileOutcome::Skipped(_))
    }
}

/// Summary of one applied reconcile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub window: InvestigationWindow,
    /// Statements extracted from the window
    pub statements: usize,
    /// Ids that kept their annotation
    pub retained: Vec<RegionId>,
    /// Ids created for new or changed folds
    pub minted: Vec<RegionId>,
    /// Ids whose annotation was removed for good
    pub retired: Vec<RegionId>,
    pub diff: AnnotationDiff,
}

impl ReconcileReport {
    /// Returns true if the reconcile changed nothing visible.
    pub fn is_noop(&self) -> bool {
        self.diff.is_noop()
    }
}

/// Keeps a document's folding regions in step with its text.
#[derive(Debug, Clone, Default)]
pub struct FoldingReconciler {
    registry: RegionRegistry,
    ids: RegionIdAllocator,
    policy: FoldingPolicy,
}

impl FoldingReconciler {
    pub fn new(policy: FoldingPolicy) -> Self {
        Self {
            registry: RegionRegistry::new(),
            ids: RegionIdAllocator::new(),
            policy,
        }
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &FoldingPolicy {
        &self.policy
    }

    /// Replaces the policy. Existing folds stay until the next reconcile
    /// covers them.
    pub fn set_policy(&mut self, policy: FoldingPolicy) {
        self.policy = policy;
    }

    /// Forgets every tracked region. Ids are not reused afterwards.
    pub fn reset(&mut self) {
        self.registry.clear();
    }

    /// Moves tracked regions along with a text edit and returns the ones the
    /// edit deleted.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Vec<TrackedRegion> {
        self.registry.apply_edit(edit)
    }

    /// Re-derives the whole document.
    pub fn reconcile_all(
        &mut self,
        host: &mut dyn FoldingHost,
        document: &dyn DocumentSnapshot,
    ) -> Result<ReconcileOutcome> {
        self.reconcile(host, document, 0, document.len())
    }

    /// Reconciles the region a document change reported.
    pub fn reconcile_dirty_region(
        &mut self,
        host: &mut dyn FoldingHost,
        document: &dyn DocumentSnapshot,
        dirty: DirtyRegion,
    ) -> Result<ReconcileOutcome> {
        let damaged = dirty.damaged_key();
        self.reconcile(host, document, damaged.offset, damaged.length)
    }

    /// Reconciles folds after `[offset, offset + length)` was damaged.
    ///
    /// Either the whole update lands (sink diff and registry commit) or, on
    /// error, neither does.
    #[tracing::instrument(skip(self, host, document), fields(len = document.len()))]
    pub fn reconcile(
        &mut self,
        host: &mut dyn FoldingHost,
        document: &dyn DocumentSnapshot,
        offset: usize,
        length: usize,
    ) -> Result<ReconcileOutcome> {
        if !host.is_folding_enabled() {
            return Ok(ReconcileOutcome::Skipped(SkipReason::FoldingDisabled));
        }
        if host.annotation_sink().is_none() {
            tracing::debug!("no annotation sink attached, skipping folding update");
            return Ok(ReconcileOutcome::Skipped(SkipReason::NoAnnotationSink));
        }

        let damaged = IntervalKey::new(offset, length);
        let window = WindowPlanner::plan(&self.registry, document, host.extractor(), damaged)?;
        let investigation = self
            .registry
            .sub_range_exclusive(window.left.as_ref(), window.right.as_ref());

        let statements =
            extract_with_retry(host.extractor(), document, window.offset, window.length)?;
        let candidates = self.survivors(document, &window, &investigation, &statements)?;

        let Some(sink) = host.annotation_sink() else {
            return Err(FoldingError::SinkDetached);
        };

        let survivors: Vec<TrackedRegion> = candidates
            .into_iter()
            .map(|(key, reused)| {
                TrackedRegion::new(key, reused.unwrap_or_else(|| self.ids.mint()))
            })
            .collect();

        let diff = AnnotationDiff {
            retired: investigation.iter().map(|region| region.id).collect(),
            added: survivors
                .iter()
                .map(|region| (region.id, region.range()))
                .collect(),
        };
        sink.apply_diff(&diff);

        self.registry.remove_all(&investigation);
        self.registry.insert_all(survivors.iter().copied());

        let report = ReconcileReport {
            window,
            statements: statements.len(),
            retained: diff.retained(),
            minted: diff.minted(),
            retired: diff.dropped(),
            diff,
        };
        tracing::debug!(
            investigated = investigation.len(),
            statements = report.statements,
            retained = report.retained.len(),
            minted = report.minted.len(),
            retired = report.retired.len(),
            "reconciled folding regions"
        );
        Ok(ReconcileOutcome::Applied(report))
    }

    /// Applies the policy to the extracted statements and pairs each fold
    /// with the id it can reuse, if any.
    fn survivors(
        &self,
        document: &dyn DocumentSnapshot,
        window: &InvestigationWindow,
        investigation: &[TrackedRegion],
        statements: &[Statement],
    ) -> Result<Vec<(IntervalKey, Option<RegionId>)>> {
        let mut survivors: Vec<(IntervalKey, Option<RegionId>)> = Vec::new();

        for statement in statements {
            let Some(key) = self.policy.fold_candidate(document, statement)? else {
                continue;
            };

            let clashes = survivors
                .last()
                .map(|(previous, _)| previous.overlaps(&key))
                .unwrap_or(false)
                || window.left.is_some_and(|left| left.key.overlaps(&key))
                || window.right.is_some_and(|right| right.key.overlaps(&key));
            if clashes {
                tracing::warn!(candidate = %key, "skipping fold that overlaps a neighbouring fold");
                continue;
            }

            let reused = RegionRegistry::lookup_equal(investigation, &key).map(|region| region.id);
            survivors.push((key, reused));
        }

        Ok(survivors)
    }
}
