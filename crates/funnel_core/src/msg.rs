use crate::{BatchId, FieldUpdate, InputSource, NormalizedImage, RawImageInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked one or more files (file picker or camera).
    ImagesPicked {
        source: InputSource,
        inputs: Vec<RawImageInput>,
    },
    /// Engine finished normalizing a batch. Failed inputs are already dropped.
    BatchNormalized {
        batch_id: BatchId,
        images: Vec<NormalizedImage>,
        skipped: usize,
    },
    /// User removed a preview.
    RemoveImage(usize),
    /// User clicked Continue on the upload step.
    ContinueClicked,
    /// User edited one form field.
    FieldChanged(FieldUpdate),
    /// User submitted the details step.
    SubmitClicked,
    /// Store finished handling the commit.
    SubmissionFinished { outcome: SubmissionOutcome },
    /// The completion view was opened (possibly directly, without a submission).
    CompletionRequested,
    /// User clicked "back to home".
    RestartClicked,
    /// Render tick.
    Tick,
}

/// What the store did with a submission. The user-visible flow is the same
/// for all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted { id: String },
    DuplicateSkipped,
    Failed,
}
