use chrono::{DateTime, Utc};
use funnel_core::{DedupKey, DueDateKind, FunnelSnapshot};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;

/// One accepted submission, as persisted in the log.
///
/// Field names follow the log's camelCase shape; the aliases read entries
/// written with the older field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[serde(alias = "lowerBound")]
    pub budget_lower: u64,
    #[serde(alias = "upperBound")]
    pub budget_upper: u64,
    #[serde(alias = "dueDate", with = "due_date_name")]
    pub due_date_kind: DueDateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_date: Option<String>,
    #[serde(default, alias = "uploadedImages")]
    pub images: Vec<String>,
    pub id: String,
    #[serde(alias = "timestamp")]
    pub submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn from_snapshot(snapshot: &FunnelSnapshot, id: String, submitted_at: DateTime<Utc>) -> Self {
        let form = &snapshot.form;
        Self {
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
            phone_number: form.phone_number.clone(),
            budget_lower: form.budget_lower,
            budget_upper: form.budget_upper,
            due_date_kind: form.due_date,
            specific_date: form.specific_date.clone(),
            images: snapshot
                .images
                .iter()
                .map(|image| image.data_url().to_string())
                .collect(),
            id,
            submitted_at,
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(
            self.first_name.clone(),
            self.last_name.clone(),
            self.phone_number.clone(),
        )
    }
}

/// An entry of the persisted log, kept as the exact JSON text it was read
/// from. Writing the log back emits that text unchanged, so older or unknown
/// entries are never reshaped or trimmed.
#[derive(Debug, Clone)]
pub struct LogEntry {
    raw: Box<RawValue>,
    record: Option<SubmissionRecord>,
    dedup_key: Option<DedupKey>,
    id: Option<String>,
}

impl LogEntry {
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        let value: Value = serde_json::from_str(raw.get()).unwrap_or(Value::Null);
        let record = SubmissionRecord::deserialize(&value).ok();
        let field = |name: &str| value.get(name).and_then(Value::as_str);
        let dedup_key = match (field("firstName"), field("lastName"), field("phoneNumber")) {
            (Some(first), Some(last), Some(phone)) => Some(DedupKey::new(first, last, phone)),
            _ => None,
        };
        let id = field("id").map(ToOwned::to_owned);
        Self {
            raw,
            record,
            dedup_key,
            id,
        }
    }

    pub fn from_record(record: &SubmissionRecord) -> Result<Self, serde_json::Error> {
        serde_json::value::to_raw_value(record).map(Self::from_raw)
    }

    /// The entry's JSON exactly as stored.
    pub fn raw_json(&self) -> &str {
        self.raw.get()
    }

    pub fn as_record(&self) -> Option<&SubmissionRecord> {
        self.record.as_ref()
    }

    /// Duplicate identity; present when all three fields are strings.
    pub fn dedup_key(&self) -> Option<&DedupKey> {
        self.dedup_key.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl PartialEq for LogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.raw.get() == other.raw.get()
    }
}

impl Serialize for LogEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LogEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(Self::from_raw)
    }
}

mod due_date_name {
    use funnel_core::DueDateKind;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(kind: &DueDateKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(kind.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DueDateKind, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
