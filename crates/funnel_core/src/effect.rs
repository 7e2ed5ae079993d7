use crate::{BatchId, FunnelSnapshot, InputSource, RawImageInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    NormalizeBatch {
        batch_id: BatchId,
        source: InputSource,
        inputs: Vec<RawImageInput>,
    },
    CommitSubmission { snapshot: FunnelSnapshot },
    Navigate(Route),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Landing page with the image picker.
    Entry,
    /// Contact and budget steps.
    Funnel,
    /// Confirmation and summary.
    Success,
}
