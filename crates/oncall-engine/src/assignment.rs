//! On-call assignments as read back from storage.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Priority flag set in the admin dialog. Informational; coverage math ignores it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// One on-call shift.
///
/// `end > start` is expected but not enforced here: rows come straight from
/// storage, and the coverage detector decides what to do with bad ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub assignee_id: String,
    pub assignee_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl AssignmentInterval {
    /// Create a normal-priority assignment with no contact details.
    pub fn new(
        assignee_id: impl Into<String>,
        assignee_name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            start,
            end,
            assignee_id: assignee_id.into(),
            assignee_name: assignee_name.into(),
            assignee_phone: None,
            assignee_email: None,
            priority: Priority::Normal,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Is the assignment active at `at`? Intervals are half-open: `[start, end)`.
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }
}

/// Length of `[start, end)` in fractional hours, keeping sub-second precision.
pub(crate) fn hours_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let span = end - start;
    match span.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 3_600_000_000_000.0,
        // Spans over ~292 years overflow i64 nanoseconds.
        None => span.num_milliseconds() as f64 / 3_600_000.0,
    }
}

/// Assignments active at `at`: high priority first, then by start time.
pub fn on_call_at(
    intervals: &[AssignmentInterval],
    at: NaiveDateTime,
) -> Vec<&AssignmentInterval> {
    let mut active: Vec<&AssignmentInterval> =
        intervals.iter().filter(|a| a.is_active_at(at)).collect();
    active.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.start.cmp(&b.start))
    });
    active
}
