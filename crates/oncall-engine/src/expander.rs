//! Recurrence expansion -- converts a [`RecurrenceRule`] into concrete appointment
//! occurrences.
//!
//! Wraps the `rrule` crate (v0.13): the rule is rendered as a monthly RFC 5545
//! RRULE with `BYSETPOS`, expanded in UTC, and read back as naive wall-clock
//! times. UTC stands in for "no timezone" so no DST adjustment ever applies.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::rule::RecurrenceRule;

/// One concrete appointment produced by expanding a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Expand a recurrence rule into one occurrence per matching month, in
/// chronological order.
///
/// Months without an Nth matching weekday are skipped. An inverted year range
/// yields an empty list.
///
/// # Errors
/// Returns `ScheduleError::InvalidRule` if the rule fails validation or the year
/// range is too large to expand, and `ScheduleError::Expansion` if the generated
/// RRULE is rejected. Nothing is generated when an error is returned.
pub fn expand(rule: &RecurrenceRule) -> Result<Vec<Occurrence>> {
    rule.validate()?;

    if rule.start_year > rule.end_year {
        return Ok(Vec::new());
    }

    // At most one instance per month. One extra leaves room for a DTSTART
    // that the rrule crate yields without it matching the rule.
    let months = (rule.end_year - rule.start_year + 1) as u64 * 12;
    let max_count = u16::try_from(months + 1).map_err(|_| {
        ScheduleError::InvalidRule(format!(
            "year range {}..={} is too large to expand",
            rule.start_year, rule.end_year
        ))
    })?;

    let rrule_text = format!(
        "DTSTART;TZID=UTC:{:04}0101T{}\nRRULE:{};UNTIL={:04}1231T235959Z",
        rule.start_year,
        rule.time_of_day.format("%H%M%S"),
        rule.to_rrule(),
        rule.end_year
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| ScheduleError::Expansion(format!("{}", e)))?;

    let instances = rrule_set.all(max_count);
    let duration = Duration::minutes(i64::from(rule.duration_minutes));

    let occurrences: Vec<Occurrence> = instances
        .dates
        .into_iter()
        .map(|dt| dt.naive_local())
        .filter(|start| rule.matches(start.date()))
        .map(|start| Occurrence {
            date: start.date(),
            start,
            end: start + duration,
        })
        .collect();

    debug!(
        rule = %rule,
        start_year = rule.start_year,
        end_year = rule.end_year,
        count = occurrences.len(),
        "expanded recurrence rule"
    );

    Ok(occurrences)
}
