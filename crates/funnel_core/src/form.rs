use std::fmt;
use std::str::FromStr;

use crate::NormalizedImage;

/// When the customer needs the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum DueDateKind {
    #[default]
    Immediate,
    WithinWeek,
    WithinMonth,
    Specific,
}

impl DueDateKind {
    /// Name used in the persisted submission log.
    pub fn as_str(self) -> &'static str {
        match self {
            DueDateKind::Immediate => "immediate",
            DueDateKind::WithinWeek => "within_week",
            DueDateKind::WithinMonth => "within_month",
            DueDateKind::Specific => "specific",
        }
    }
}

impl fmt::Display for DueDateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDueDate(pub String);

impl fmt::Display for UnknownDueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown due date {:?} (expected immediate, within_week, within_month or specific)",
            self.0
        )
    }
}

impl std::error::Error for UnknownDueDate {}

impl FromStr for DueDateKind {
    type Err = UnknownDueDate;

    /// Accepts the persisted names and the short names older logs used
    /// (`now`, `week`, `month`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "immediate" | "now" => Ok(DueDateKind::Immediate),
            "within_week" | "week" => Ok(DueDateKind::WithinWeek),
            "within_month" | "month" => Ok(DueDateKind::WithinMonth),
            "specific" => Ok(DueDateKind::Specific),
            other => Err(UnknownDueDate(other.to_string())),
        }
    }
}

/// Contact and budget fields captured across the funnel steps.
///
/// No validation happens here: budget ordering and phone format are taken as
/// entered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunnelForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub budget_lower: u64,
    pub budget_upper: u64,
    pub due_date: DueDateKind,
    pub specific_date: Option<String>,
}

impl FunnelForm {
    /// Applies a single field edit without touching the other fields.
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::FirstName(value) => self.first_name = value,
            FieldUpdate::LastName(value) => self.last_name = value,
            FieldUpdate::PhoneNumber(value) => self.phone_number = value,
            FieldUpdate::BudgetLower(value) => self.budget_lower = value,
            FieldUpdate::BudgetUpper(value) => self.budget_upper = value,
            FieldUpdate::DueDate(value) => self.due_date = value,
            FieldUpdate::SpecificDate(value) => self.specific_date = value,
        }
    }

    /// Lower bound above upper bound. Reported, never enforced.
    pub fn budget_inverted(&self) -> bool {
        self.budget_lower > self.budget_upper
    }
}

/// One edit to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    FirstName(String),
    LastName(String),
    PhoneNumber(String),
    BudgetLower(u64),
    BudgetUpper(u64),
    DueDate(DueDateKind),
    SpecificDate(Option<String>),
}

/// Identity of a submission for duplicate detection: exact, case-sensitive
/// match on first name, last name and phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl DedupKey {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
        }
    }
}

/// Immutable copy of the flow taken at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelSnapshot {
    pub form: FunnelForm,
    pub images: Vec<NormalizedImage>,
}

impl FunnelSnapshot {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(
            self.form.first_name.clone(),
            self.form.last_name.clone(),
            self.form.phone_number.clone(),
        )
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.form.first_name, self.form.last_name)
    }
}
