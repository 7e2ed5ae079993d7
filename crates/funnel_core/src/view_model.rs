use crate::{DueDateKind, FunnelForm, FunnelSnapshot, FunnelStep, InputSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastBatchStats {
    pub source: InputSource,
    pub requested: usize,
    pub accepted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunnelViewModel {
    pub step: FunnelStep,
    pub image_count: usize,
    pub previews: Vec<String>,
    pub can_continue: bool,
    pub pending_batches: usize,
    pub last_batch: Option<LastBatchStats>,
    pub form: FunnelForm,
    /// Lower budget bound exceeds the upper one. Informational only.
    pub budget_inverted: bool,
    pub summary: Option<SubmissionSummary>,
    pub dirty: bool,
}

/// What the confirmation view shows about a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSummary {
    pub full_name: String,
    pub phone_number: String,
    pub budget_lower: u64,
    pub budget_upper: u64,
    pub due_date: DueDateKind,
    pub specific_date: Option<String>,
    pub image_count: usize,
}

impl SubmissionSummary {
    pub fn from_snapshot(snapshot: &FunnelSnapshot) -> Self {
        Self {
            full_name: snapshot.full_name(),
            phone_number: snapshot.form.phone_number.clone(),
            budget_lower: snapshot.form.budget_lower,
            budget_upper: snapshot.form.budget_upper,
            due_date: snapshot.form.due_date,
            specific_date: snapshot.form.specific_date.clone(),
            image_count: snapshot.images.len(),
        }
    }
}
