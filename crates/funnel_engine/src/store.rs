use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use funnel_core::FunnelSnapshot;
use funnel_logging::{funnel_info, funnel_warn};

use crate::{CommitOutcome, KvStore, LogEntry, StoreError, SubmissionRecord};

/// Storage key holding the serialized submission log.
pub const DEFAULT_STORE_KEY: &str = "funnelData";

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Append-only, deduplicating log of completed submissions.
///
/// Every commit reads the whole log, appends, and writes the whole log back.
/// Concurrent writers from several processes are not coordinated.
pub struct SubmissionStore<S> {
    kv: S,
    key: String,
    clock: Clock,
}

impl<S: KvStore> SubmissionStore<S> {
    pub fn new(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Typed records currently in the log, oldest first.
    pub fn records(&self) -> Vec<SubmissionRecord> {
        self.load_log()
            .iter()
            .filter_map(|entry| entry.as_record().cloned())
            .collect()
    }

    /// Number of entries in the log, including ones that are not typed records.
    pub fn len(&self) -> usize {
        self.load_log().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the snapshot unless a submission with the same first name,
    /// last name and phone number is already logged.
    pub fn commit(&self, snapshot: &FunnelSnapshot) -> Result<CommitOutcome, StoreError> {
        let mut log = self.load_log();
        let now = (self.clock)();
        let candidate = SubmissionRecord::from_snapshot(snapshot, next_id(now, &log), now);

        let key = candidate.dedup_key();
        if let Some(existing) = log
            .iter()
            .find(|entry| entry.dedup_key() == Some(&key))
        {
            funnel_info!(
                "Duplicate submission skipped (existing id {:?})",
                existing.id()
            );
            return Ok(CommitOutcome::DuplicateSkipped {
                existing_id: existing.id().map(ToOwned::to_owned),
            });
        }

        // Existing entries are written back as read; only the new one is encoded.
        let entry =
            LogEntry::from_record(&candidate).map_err(|err| StoreError::Serialize(err.to_string()))?;
        log.push(entry);
        let content =
            serde_json::to_string(&log).map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.kv.set(&self.key, &content)?;

        funnel_info!(
            "Stored submission id={} images={} log_len={}",
            candidate.id,
            candidate.images.len(),
            log.len()
        );
        Ok(CommitOutcome::Accepted(candidate))
    }

    /// Missing, unreadable and malformed logs all read as empty.
    fn load_log(&self) -> Vec<LogEntry> {
        let content = match self.kv.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                funnel_info!("No submission log under {:?}; starting empty", self.key);
                return Vec::new();
            }
            Err(err) => {
                funnel_warn!("Failed to read submission log {:?}: {}", self.key, err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<LogEntry>>(&content) {
            Ok(log) => log,
            Err(err) => {
                funnel_warn!(
                    "Failed to parse submission log {:?}; treating as empty: {}",
                    self.key,
                    err
                );
                Vec::new()
            }
        }
    }
}

impl<S> fmt::Debug for SubmissionStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionStore")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Millisecond timestamp id, bumped past the largest numeric id already in
/// the log so ids stay unique even when the clock repeats or goes back.
///
/// Ids that cannot be bumped (at `i64::MAX`) are ignored for the bump.
fn next_id(now: DateTime<Utc>, log: &[LogEntry]) -> String {
    let candidate = now.timestamp_millis();
    let bumped = log
        .iter()
        .filter_map(|entry| entry.id()?.parse::<i64>().ok())
        .filter_map(|id| id.checked_add(1))
        .max();
    match bumped {
        Some(bumped) if bumped > candidate => bumped.to_string(),
        _ => candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::next_id;
    use crate::LogEntry;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn entries(log: Value) -> Vec<LogEntry> {
        serde_json::from_str(&log.to_string()).unwrap()
    }

    #[test]
    fn id_is_millisecond_timestamp() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(next_id(now, &[]), "1700000000123");
    }

    #[test]
    fn id_is_bumped_past_existing() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let log = entries(json!([{ "id": "1000" }, { "id": "not-a-number" }]));
        assert_eq!(next_id(now, &log), "1001");
    }

    #[test]
    fn largest_possible_id_does_not_overflow() {
        let now = Utc.timestamp_millis_opt(5_000).unwrap();
        let log = entries(json!([{ "id": i64::MAX.to_string() }, { "id": "7000" }]));
        assert_eq!(next_id(now, &log), "7001");

        let only_max = entries(json!([{ "id": i64::MAX.to_string() }]));
        assert_eq!(next_id(now, &only_max), "5000");
    }
}
