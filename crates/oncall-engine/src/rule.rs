//! Recurrence rules for repeating appointments ("first Monday of every month").
//!
//! A [`RecurrenceRule`] is the validated, statically-typed form. Form submissions
//! arrive as a [`RecurrenceRequest`] with free-text fields and are converted with
//! `TryFrom`, so nothing downstream ever sees an unchecked weekday or ordinal.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Earliest year accepted in a rule's year range.
pub const MIN_YEAR: i32 = 1;
/// Latest year accepted in a rule's year range.
pub const MAX_YEAR: i32 = 9999;

/// Which matching weekday of the month a rule selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Ordinal {
    pub const ALL: [Ordinal; 5] = [
        Ordinal::First,
        Ordinal::Second,
        Ordinal::Third,
        Ordinal::Fourth,
        Ordinal::Last,
    ];

    /// The RFC 5545 `BYSETPOS` value for this ordinal.
    pub fn setpos(self) -> i32 {
        match self {
            Ordinal::First => 1,
            Ordinal::Second => 2,
            Ordinal::Third => 3,
            Ordinal::Fourth => 4,
            Ordinal::Last => -1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ordinal::First => "first",
            Ordinal::Second => "second",
            Ordinal::Third => "third",
            Ordinal::Fourth => "fourth",
            Ordinal::Last => "last",
        }
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ordinal {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Ordinal::ALL
            .into_iter()
            .find(|o| o.as_str() == normalized)
            .ok_or_else(|| ScheduleError::InvalidRule(format!("unknown ordinal '{}'", s)))
    }
}

/// Weekdays a rule may target. Weekend appointments are not scheduled.
pub const WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Parse a weekday name ("Monday", "mon", "MONDAY") restricted to Monday-Friday.
pub fn parse_workday(s: &str) -> Result<Weekday> {
    let weekday: Weekday = s
        .trim()
        .parse()
        .map_err(|_| ScheduleError::InvalidRule(format!("unknown weekday '{}'", s)))?;
    ensure_workday(weekday)?;
    Ok(weekday)
}

fn ensure_workday(weekday: Weekday) -> Result<()> {
    if WORKDAYS.contains(&weekday) {
        Ok(())
    } else {
        Err(ScheduleError::InvalidRule(format!(
            "weekday {} is not a workday (Monday-Friday)",
            weekday_name(weekday)
        )))
    }
}

/// The RFC 5545 `BYDAY` code for a weekday.
pub(crate) fn byday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a time of day in `HH:mm` (or `HH:mm:ss`) form.
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::InvalidRule(format!("invalid time of day '{}'", s)))
}

/// A validated monthly weekday-ordinal recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub ordinal: Ordinal,
    pub weekday: Weekday,
    /// Local wall-clock start time of each occurrence.
    pub time_of_day: NaiveTime,
    /// Length of each occurrence. Zero is allowed and yields zero-length occurrences.
    pub duration_minutes: u32,
    /// First year to expand (inclusive).
    pub start_year: i32,
    /// Last year to expand (inclusive). A range with `start_year > end_year` is empty.
    pub end_year: i32,
}

impl RecurrenceRule {
    /// Build a rule, validating the weekday and year bounds.
    pub fn new(
        ordinal: Ordinal,
        weekday: Weekday,
        time_of_day: NaiveTime,
        duration_minutes: u32,
        start_year: i32,
        end_year: i32,
    ) -> Result<Self> {
        let rule = Self {
            ordinal,
            weekday,
            time_of_day,
            duration_minutes,
            start_year,
            end_year,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Check the invariants a rule must satisfy before expansion.
    ///
    /// Fields are public, so [`crate::expand`] calls this again rather than
    /// trusting that the rule came from [`RecurrenceRule::new`].
    pub fn validate(&self) -> Result<()> {
        ensure_workday(self.weekday)?;
        for year in [self.start_year, self.end_year] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(ScheduleError::InvalidRule(format!(
                    "year {} is outside {}..={}",
                    year, MIN_YEAR, MAX_YEAR
                )));
            }
        }
        Ok(())
    }

    /// Does `date` fall on this rule's weekday ordinal within its month?
    ///
    /// The year range is not considered.
    pub fn matches(&self, date: NaiveDate) -> bool {
        if date.weekday() != self.weekday {
            return false;
        }
        match self.ordinal {
            Ordinal::Last => (date + Duration::days(7)).month() != date.month(),
            nth => (date.day() - 1) / 7 + 1 == nth.setpos() as u32,
        }
    }

    /// The RFC 5545 RRULE body for this rule, without DTSTART or UNTIL.
    pub fn to_rrule(&self) -> String {
        format!(
            "FREQ=MONTHLY;BYDAY={};BYSETPOS={}",
            byday_code(self.weekday),
            self.ordinal.setpos()
        )
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} of every month at {}",
            self.ordinal,
            weekday_name(self.weekday),
            self.time_of_day.format("%H:%M")
        )
    }
}

/// A recurrence as submitted by the scheduling form, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRequest {
    pub ordinal: String,
    pub weekday: String,
    pub time_of_day: String,
    pub duration_minutes: i64,
    pub start_year: i32,
    pub end_year: i32,
}

impl TryFrom<RecurrenceRequest> for RecurrenceRule {
    type Error = ScheduleError;

    fn try_from(req: RecurrenceRequest) -> Result<Self> {
        RecurrenceRule::try_from(&req)
    }
}

impl TryFrom<&RecurrenceRequest> for RecurrenceRule {
    type Error = ScheduleError;

    fn try_from(req: &RecurrenceRequest) -> Result<Self> {
        let ordinal: Ordinal = req.ordinal.parse()?;
        let weekday = parse_workday(&req.weekday)?;
        let time_of_day = parse_time_of_day(&req.time_of_day)?;
        let duration_minutes = u32::try_from(req.duration_minutes).map_err(|_| {
            ScheduleError::InvalidRule(format!(
                "duration must be between 0 and {} minutes, got {}",
                u32::MAX,
                req.duration_minutes
            ))
        })?;
        RecurrenceRule::new(
            ordinal,
            weekday,
            time_of_day,
            duration_minutes,
            req.start_year,
            req.end_year,
        )
    }
}
