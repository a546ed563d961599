//! On-call coverage gaps over a scheduling window.
//!
//! Assignments are clipped to the window, sorted, and merged into maximal
//! covered runs; the gaps are whatever the runs leave uncovered. Touching
//! assignments (one ends exactly when the next starts) count as continuous
//! coverage, since back-to-back shifts are stored with identical boundary
//! timestamps.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assignment::{hours_between, AssignmentInterval};
use crate::error::{Result, ScheduleError};

/// Length of the rolling coverage window used by the on-call screens.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// The half-open span `[start, end)` being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CoverageWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// A window of `days` whole days starting at `start`.
    pub fn rolling(start: NaiveDateTime, days: i64) -> Result<Self> {
        if days <= 0 {
            return Err(ScheduleError::InvalidWindow(format!(
                "window must span at least one day, got {}",
                days
            )));
        }
        let out_of_range = || {
            ScheduleError::InvalidWindow(format!(
                "{} days after {} is out of range",
                days, start
            ))
        };
        let span = Duration::try_days(days).ok_or_else(out_of_range)?;
        let end = start.checked_add_signed(span).ok_or_else(out_of_range)?;
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end <= self.start {
            return Err(ScheduleError::InvalidWindow(format!(
                "end {} is not after start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn hours(&self) -> f64 {
        hours_between(self.start, self.end)
    }
}

/// What to do with an assignment whose `end` is not after its `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole call with `ScheduleError::InvalidInterval`.
    Reject,
    /// Leave the assignment out, log a warning, and record its index in
    /// [`CoverageReport::skipped`].
    #[default]
    Skip,
}

/// An uncovered sub-interval of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageGap {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub hours: f64,
}

/// A maximal covered sub-interval of the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveredRun {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Number of assignments that contributed to this run.
    pub assignment_count: usize,
}

/// Coverage of a window by a set of assignments.
///
/// Serialized in camelCase, like [`AssignmentInterval`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub window: CoverageWindow,
    /// Uncovered spans, sorted by start, non-overlapping.
    pub gaps: Vec<CoverageGap>,
    /// Covered spans, sorted by start, non-overlapping.
    pub covered: Vec<CoveredRun>,
    /// Share of the window covered, 0.0 to 100.0.
    pub coverage_percent: f64,
    /// Input indices of malformed assignments left out under [`MalformedPolicy::Skip`].
    pub skipped: Vec<usize>,
}

impl CoverageReport {
    pub fn is_fully_covered(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn gap_hours(&self) -> f64 {
        self.gaps.iter().map(|g| g.hours).sum()
    }

    /// Coverage with one decimal place, e.g. `96.7%`.
    pub fn coverage_display(&self) -> String {
        format!("{:.1}%", self.coverage_percent)
    }
}

/// Merge assignments into sorted, non-overlapping runs clipped to the window.
///
/// Intervals are merged when `next.start <= run.end`, so touching assignments
/// produce one run. Each run counts the assignments merged into it. Callers must
/// pass only well-formed assignments.
fn merge_covered_runs(
    intervals: &[&AssignmentInterval],
    window: &CoverageWindow,
) -> Vec<CoveredRun> {
    let mut clipped: Vec<(NaiveDateTime, NaiveDateTime)> = intervals
        .iter()
        .filter(|a| a.start < window.end && a.end > window.start)
        .map(|a| (a.start.max(window.start), a.end.min(window.end)))
        .collect();

    // Ties on start are broken by end so equal inputs always merge the same way.
    clipped.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<CoveredRun> = Vec::new();
    for (start, end) in clipped {
        if let Some(last) = merged.last_mut() {
            if start <= last.end {
                last.end = last.end.max(end);
                last.assignment_count += 1;
                continue;
            }
        }
        merged.push(CoveredRun {
            start,
            end,
            assignment_count: 1,
        });
    }

    merged
}

fn gap(start: NaiveDateTime, end: NaiveDateTime) -> CoverageGap {
    CoverageGap {
        start,
        end,
        hours: hours_between(start, end),
    }
}

/// Find the uncovered parts of `window` given a set of on-call assignments.
///
/// Malformed assignments (`end <= start`) are handled per `policy`.
///
/// # Errors
/// Returns `ScheduleError::InvalidWindow` if the window is empty or inverted, and
/// `ScheduleError::InvalidInterval` for the first malformed assignment when
/// `policy` is [`MalformedPolicy::Reject`].
pub fn find_gaps(
    window: &CoverageWindow,
    intervals: &[AssignmentInterval],
    policy: MalformedPolicy,
) -> Result<CoverageReport> {
    window.validate()?;

    let mut valid: Vec<&AssignmentInterval> = Vec::with_capacity(intervals.len());
    let mut skipped = Vec::new();
    for (index, interval) in intervals.iter().enumerate() {
        if interval.is_well_formed() {
            valid.push(interval);
            continue;
        }
        match policy {
            MalformedPolicy::Reject => {
                return Err(ScheduleError::InvalidInterval {
                    index,
                    reason: format!(
                        "end {} is not after start {}",
                        interval.end, interval.start
                    ),
                });
            }
            MalformedPolicy::Skip => {
                warn!(
                    index,
                    assignee_id = %interval.assignee_id,
                    start = %interval.start,
                    end = %interval.end,
                    "skipping malformed on-call assignment"
                );
                skipped.push(index);
            }
        }
    }

    let covered = merge_covered_runs(&valid, window);

    let mut gaps = Vec::new();
    let mut cursor = window.start;
    for run in &covered {
        if cursor < run.start {
            gaps.push(gap(cursor, run.start));
        }
        cursor = cursor.max(run.end);
    }
    if cursor < window.end {
        gaps.push(gap(cursor, window.end));
    }

    let gap_hours: f64 = gaps.iter().map(|g| g.hours).sum();
    let mut coverage_percent = ((1.0 - gap_hours / window.hours()) * 100.0).clamp(0.0, 100.0);
    // Any gap, however short, keeps the percentage below 100.
    if !gaps.is_empty() {
        coverage_percent = coverage_percent.min(100.0_f64.next_down());
    }

    debug!(
        window_start = %window.start,
        window_end = %window.end,
        assignments = valid.len(),
        skipped = skipped.len(),
        gaps = gaps.len(),
        coverage_percent,
        "computed on-call coverage"
    );

    Ok(CoverageReport {
        window: *window,
        gaps,
        covered,
        coverage_percent,
        skipped,
    })
}

/// [`find_gaps`] with the default [`MalformedPolicy`].
pub fn find_gaps_default(
    window: &CoverageWindow,
    intervals: &[AssignmentInterval],
) -> Result<CoverageReport> {
    find_gaps(window, intervals, MalformedPolicy::default())
}
