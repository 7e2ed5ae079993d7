use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use funnel_core::{BatchId, FunnelSnapshot, RawImageInput};
use funnel_logging::funnel_debug;
use tokio::sync::mpsc as async_mpsc;

use crate::{
    normalize_batch, Clock, EngineEvent, FileKvStore, ImageNormalizer, JpegNormalizer, KvStore,
    NormalizerSettings, SubmissionStore, DEFAULT_STORE_KEY,
};

#[derive(Clone)]
pub struct EngineConfig {
    pub normalizer: NormalizerSettings,
    pub store_dir: PathBuf,
    pub store_key: String,
    pub clock: Clock,
}

impl EngineConfig {
    pub fn default_with_store(store_dir: PathBuf) -> Self {
        Self {
            normalizer: NormalizerSettings::default(),
            store_dir,
            store_key: DEFAULT_STORE_KEY.to_string(),
            clock: Arc::new(Utc::now),
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("normalizer", &self.normalizer)
            .field("store_dir", &self.store_dir)
            .field("store_key", &self.store_key)
            .finish_non_exhaustive()
    }
}

enum EngineCommand {
    NormalizeBatch {
        batch_id: BatchId,
        inputs: Vec<RawImageInput>,
    },
    Commit {
        snapshot: FunnelSnapshot,
    },
}

/// Runs engine work on a background thread with a single-threaded runtime.
///
/// Batches are normalized concurrently; commits run one at a time in arrival
/// order, so the log's read-modify-write never overlaps within a process.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let normalizer: Arc<dyn ImageNormalizer> = Arc::new(JpegNormalizer::new(config.normalizer));
        let store = SubmissionStore::new(FileKvStore::new(config.store_dir), config.store_key)
            .with_clock(config.clock);
        Self::spawn(normalizer, store)
    }

    pub fn spawn<S>(normalizer: Arc<dyn ImageNormalizer>, store: SubmissionStore<S>) -> Self
    where
        S: KvStore + 'static,
    {
        let (cmd_tx, mut cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("tokio runtime");
            runtime.block_on(async move {
                while let Some(command) = cmd_rx.recv().await {
                    match command {
                        EngineCommand::NormalizeBatch { batch_id, inputs } => {
                            let normalizer = normalizer.clone();
                            let event_tx = event_tx.clone();
                            tokio::spawn(async move {
                                let outcome = normalize_batch(normalizer.as_ref(), inputs).await;
                                let _ = event_tx.send(EngineEvent::BatchNormalized {
                                    batch_id,
                                    outcome,
                                });
                            });
                        }
                        EngineCommand::Commit { snapshot } => {
                            let result = store.commit(&snapshot);
                            let _ = event_tx.send(EngineEvent::Committed(result));
                        }
                    }
                }
                funnel_debug!("Engine command channel closed");
            });
        });

        Self { cmd_tx, event_rx }
    }

    pub fn normalize(&self, batch_id: BatchId, inputs: Vec<RawImageInput>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::NormalizeBatch { batch_id, inputs });
    }

    pub fn commit(&self, snapshot: FunnelSnapshot) {
        let _ = self.cmd_tx.send(EngineCommand::Commit { snapshot });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event, or `None` after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
