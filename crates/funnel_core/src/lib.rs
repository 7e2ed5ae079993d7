//! Funnel core: pure state machine for the lead-capture flow and view-model helpers.
mod effect;
mod form;
mod images;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Route};
pub use form::{DedupKey, DueDateKind, FieldUpdate, FunnelForm, FunnelSnapshot, UnknownDueDate};
pub use images::{ImageCollection, InputSource, NormalizedImage, RawImageInput};
pub use msg::{Msg, SubmissionOutcome};
pub use state::{BatchId, FlowState, FunnelStep};
pub use update::update;
pub use view_model::{FunnelViewModel, LastBatchStats, SubmissionSummary};
