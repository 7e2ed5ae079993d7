use funnel_core::{BatchId, NormalizedImage};

use crate::{PersistError, SubmissionRecord};

/// A single image could not be turned into a normalized image. The batch it
/// belongs to carries on without it.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unsupported media type {media_type}")]
    UnsupportedMediaType { media_type: String },
    #[error("failed to decode {label}: {message}")]
    Decode { label: String, message: String },
    #[error("failed to encode {label}: {message}")]
    Encode { label: String, message: String },
    #[error("normalizer worker failed: {message}")]
    Worker { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to serialize submission log: {0}")]
    Serialize(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Result of committing a snapshot. Neither variant is a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Accepted(SubmissionRecord),
    /// A record with the same first name, last name and phone number exists.
    DuplicateSkipped { existing_id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position of the failed input within the batch.
    pub index: usize,
    pub label: String,
    pub error: DecodeError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchOutcome {
    /// Successfully normalized images, in input order.
    pub images: Vec<NormalizedImage>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug)]
pub enum EngineEvent {
    BatchNormalized {
        batch_id: BatchId,
        outcome: BatchOutcome,
    },
    Committed(Result<CommitOutcome, StoreError>),
}
