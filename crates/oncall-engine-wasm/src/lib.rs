//! WASM bindings for oncall-engine.
//!
//! Exposes recurrence expansion, coverage gap detection, and overlap detection
//! to the web app via `wasm-bindgen`. All complex types cross the boundary as
//! JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p oncall-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/oncall-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/oncall_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDateTime};
use oncall_engine::{
    AssignmentInterval, CoverageWindow, MalformedPolicy, Priority, RecurrenceRequest,
    RecurrenceRule,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Input DTOs
// ---------------------------------------------------------------------------

/// An assignment row as the web app sends it: timestamps are plain strings,
/// either naive local time or RFC 3339 from `Date.toISOString()`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentInput {
    start: String,
    end: String,
    assignee_id: String,
    assignee_name: String,
    #[serde(default)]
    assignee_phone: Option<String>,
    #[serde(default)]
    assignee_email: Option<String>,
    #[serde(default)]
    priority: Priority,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse a timestamp into local wall-clock time.
///
/// RFC 3339 input keeps the wall-clock time in its own offset; the offset itself
/// is dropped. Naive input is accepted with or without seconds.
fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_assignments_json(json: &str) -> Result<Vec<AssignmentInterval>, String> {
    let inputs: Vec<AssignmentInput> =
        serde_json::from_str(json).map_err(|e| format!("Invalid assignments JSON: {}", e))?;

    inputs
        .into_iter()
        .map(|input| {
            Ok(AssignmentInterval {
                start: parse_datetime(&input.start)?,
                end: parse_datetime(&input.end)?,
                assignee_id: input.assignee_id,
                assignee_name: input.assignee_name,
                assignee_phone: input.assignee_phone,
                assignee_email: input.assignee_email,
                priority: input.priority,
            })
        })
        .collect()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn expand_recurrence_impl(request_json: &str) -> Result<String, String> {
    let request: RecurrenceRequest = serde_json::from_str(request_json)
        .map_err(|e| format!("Invalid recurrence JSON: {}", e))?;
    let rule = RecurrenceRule::try_from(&request).map_err(|e| e.to_string())?;
    let occurrences = oncall_engine::expand(&rule).map_err(|e| e.to_string())?;
    to_json(&occurrences)
}

fn find_coverage_gaps_impl(
    window_start: &str,
    window_end: &str,
    assignments_json: &str,
    strict: bool,
) -> Result<String, String> {
    let window = CoverageWindow::new(parse_datetime(window_start)?, parse_datetime(window_end)?)
        .map_err(|e| e.to_string())?;
    let assignments = parse_assignments_json(assignments_json)?;
    let policy = if strict {
        MalformedPolicy::Reject
    } else {
        MalformedPolicy::Skip
    };
    let report =
        oncall_engine::find_gaps(&window, &assignments, policy).map_err(|e| e.to_string())?;
    to_json(&report)
}

fn find_assignment_overlaps_impl(assignments_json: &str) -> Result<String, String> {
    let assignments = parse_assignments_json(assignments_json)?;
    to_json(&oncall_engine::find_overlaps(&assignments))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand a recurrence form submission into appointment occurrences.
///
/// `request_json` is a `RecurrenceRequest` object
/// (`{ordinal, weekday, timeOfDay, durationMinutes, startYear, endYear}`).
/// Returns a JSON array of `{date, start, end}` objects.
#[wasm_bindgen(js_name = "expandRecurrence")]
pub fn expand_recurrence(request_json: &str) -> Result<String, JsValue> {
    expand_recurrence_impl(request_json).map_err(|e| JsValue::from_str(&e))
}

/// Compute on-call coverage gaps for the window `[window_start, window_end)`.
///
/// `assignments_json` is a JSON array of assignment rows. When `strict` is true a
/// malformed assignment fails the call; otherwise it is skipped and its index is
/// listed under `skipped` in the returned report.
#[wasm_bindgen(js_name = "findCoverageGaps")]
pub fn find_coverage_gaps(
    window_start: &str,
    window_end: &str,
    assignments_json: &str,
    strict: bool,
) -> Result<String, JsValue> {
    find_coverage_gaps_impl(window_start, window_end, assignments_json, strict)
        .map_err(|e| JsValue::from_str(&e))
}

/// Find pairs of overlapping assignments. Returns a JSON array of overlap objects.
#[wasm_bindgen(js_name = "findAssignmentOverlaps")]
pub fn find_assignment_overlaps(assignments_json: &str) -> Result<String, JsValue> {
    find_assignment_overlaps_impl(assignments_json).map_err(|e| JsValue::from_str(&e))
}
