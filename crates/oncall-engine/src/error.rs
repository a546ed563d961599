//! Error types for oncall-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// The recurrence rule (or the form data it was parsed from) is malformed.
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    /// An assignment interval does not satisfy `end > start`.
    #[error("Invalid assignment interval at index {index}: {reason}")]
    InvalidInterval { index: usize, reason: String },

    #[error("Invalid coverage window: {0}")]
    InvalidWindow(String),

    /// The generated RRULE was rejected by the `rrule` crate.
    #[error("Expansion error: {0}")]
    Expansion(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
