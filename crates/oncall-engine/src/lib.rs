//! # oncall-engine
//!
//! Scheduling logic behind the case-management app's appointment and on-call
//! screens. Everything here is a pure function over in-memory data; callers
//! load assignments from storage and persist generated appointments themselves.
//!
//! ## Modules
//!
//! - [`rule`] -- Weekday-ordinal recurrence rules and form-request parsing
//! - [`expander`] -- Recurrence rule → list of concrete appointment occurrences
//! - [`assignment`] -- On-call assignments and "who is on call now"
//! - [`coverage`] -- Coverage gaps and percentage over a scheduling window
//! - [`overlap`] -- Detect double-booked assignments
//! - [`error`] -- Error types

pub mod assignment;
pub mod coverage;
pub mod error;
pub mod expander;
pub mod overlap;
pub mod rule;

pub use assignment::{on_call_at, AssignmentInterval, Priority};
pub use coverage::{
    find_gaps, find_gaps_default, CoverageGap, CoverageReport, CoverageWindow, CoveredRun,
    MalformedPolicy, DEFAULT_WINDOW_DAYS,
};
pub use error::{Result, ScheduleError};
pub use expander::{expand, Occurrence};
pub use overlap::{find_overlaps, Overlap};
pub use rule::{Ordinal, RecurrenceRequest, RecurrenceRule};
