use crate::view_model::{FunnelViewModel, LastBatchStats, SubmissionSummary};
use crate::{
    FieldUpdate, FunnelForm, FunnelSnapshot, ImageCollection, InputSource, NormalizedImage,
    SubmissionOutcome,
};

pub type BatchId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunnelStep {
    #[default]
    Upload,
    Details,
    Submitting,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingBatch {
    batch_id: BatchId,
    source: InputSource,
    requested: usize,
}

/// Per-session funnel state: the image collection, the form fields and the
/// step bookkeeping. Created at entry, replaced on restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    step: FunnelStep,
    images: ImageCollection,
    form: FunnelForm,
    next_batch_id: BatchId,
    pending: Vec<PendingBatch>,
    last_batch: Option<LastBatchStats>,
    submitted: Option<FunnelSnapshot>,
    outcome: Option<SubmissionOutcome>,
    dirty: bool,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            step: FunnelStep::Upload,
            images: ImageCollection::new(),
            form: FunnelForm::default(),
            next_batch_id: 1,
            pending: Vec::new(),
            last_batch: None,
            submitted: None,
            outcome: None,
            dirty: false,
        }
    }
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FunnelStep {
        self.step
    }

    pub fn images(&self) -> &ImageCollection {
        &self.images
    }

    /// Mutates the image collection in place. Every caller sees the same list,
    /// so previews and the submitted images cannot drift apart.
    pub fn set_images<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut ImageCollection),
    {
        updater(&mut self.images);
        self.dirty = true;
    }

    pub fn form(&self) -> &FunnelForm {
        &self.form
    }

    pub fn set_field(&mut self, update: FieldUpdate) {
        self.form.apply(update);
        self.dirty = true;
    }

    pub fn snapshot(&self) -> FunnelSnapshot {
        FunnelSnapshot {
            form: self.form.clone(),
            images: self.images.to_list(),
        }
    }

    /// Snapshot handed to the store, kept for the completion view.
    pub fn submitted(&self) -> Option<&FunnelSnapshot> {
        self.submitted.as_ref()
    }

    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    pub fn has_pending_batches(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn view(&self) -> FunnelViewModel {
        FunnelViewModel {
            step: self.step,
            image_count: self.images.len(),
            previews: self
                .images
                .iter()
                .map(|image| image.data_url().to_string())
                .collect(),
            can_continue: self.step == FunnelStep::Upload && !self.images.is_empty(),
            pending_batches: self.pending.len(),
            last_batch: self.last_batch.clone(),
            form: self.form.clone(),
            budget_inverted: self.form.budget_inverted(),
            summary: self.submitted.as_ref().map(SubmissionSummary::from_snapshot),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_step(&mut self, step: FunnelStep) {
        if self.step != step {
            self.step = step;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_batch(&mut self, source: InputSource, requested: usize) -> BatchId {
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;
        self.pending.push(PendingBatch {
            batch_id,
            source,
            requested,
        });
        self.dirty = true;
        batch_id
    }

    /// Appends a finished batch. Returns false (and drops the images) when the
    /// batch is unknown, e.g. it was started before a restart.
    pub(crate) fn finish_batch(
        &mut self,
        batch_id: BatchId,
        images: Vec<NormalizedImage>,
        skipped: usize,
    ) -> bool {
        let Some(pos) = self.pending.iter().position(|b| b.batch_id == batch_id) else {
            return false;
        };
        let batch = self.pending.remove(pos);
        self.dirty = true;
        if !matches!(self.step, FunnelStep::Upload | FunnelStep::Details) {
            return false;
        }
        self.last_batch = Some(LastBatchStats {
            source: batch.source,
            requested: batch.requested,
            accepted: images.len(),
            skipped,
        });
        self.set_images(|collection| collection.append(images));
        true
    }

    pub(crate) fn record_submission(&mut self, snapshot: FunnelSnapshot) {
        self.submitted = Some(snapshot);
        self.outcome = None;
        self.dirty = true;
    }

    pub(crate) fn record_outcome(&mut self, outcome: SubmissionOutcome) {
        self.outcome = Some(outcome);
        self.dirty = true;
    }

    /// Fresh state for a new session. Batch ids keep counting so results of
    /// batches started before the restart are recognized as stale.
    pub(crate) fn restarted(&self) -> Self {
        Self {
            next_batch_id: self.next_batch_id,
            dirty: true,
            ..Self::default()
        }
    }
}
