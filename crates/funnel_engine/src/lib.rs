//! Funnel engine: image normalization, submission persistence and effect execution.
mod batch;
mod engine;
mod kv;
mod normalize;
mod persist;
mod record;
mod store;
mod types;

pub use batch::normalize_batch;
pub use engine::{EngineConfig, EngineHandle};
pub use kv::{FileKvStore, KvStore, MemoryKvStore};
pub use normalize::{
    normalize_bytes, target_dimensions, ImageNormalizer, JpegNormalizer, NormalizerSettings,
    JPEG_DATA_URL_PREFIX,
};
pub use persist::{ensure_store_dir, AtomicFileWriter, PersistError};
pub use record::{LogEntry, SubmissionRecord};
pub use store::{Clock, SubmissionStore, DEFAULT_STORE_KEY};
pub use types::{BatchFailure, BatchOutcome, CommitOutcome, DecodeError, EngineEvent, StoreError};
