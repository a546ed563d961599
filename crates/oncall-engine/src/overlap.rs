//! Detect double-booked on-call coverage.
//!
//! Adjacent assignments (one ends exactly when another starts) are NOT overlaps.

use serde::{Deserialize, Serialize};

use crate::assignment::AssignmentInterval;

/// Two assignments whose time ranges intersect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlap {
    /// Input index of the earlier-listed assignment.
    pub first_index: usize,
    pub second_index: usize,
    pub first: AssignmentInterval,
    pub second: AssignmentInterval,
    pub overlap_minutes: i64,
}

/// Find every pair of assignments whose time ranges overlap.
///
/// Pairs are reported once, in input order (`first_index < second_index`).
/// Malformed assignments (`end <= start`) never overlap anything.
pub fn find_overlaps(intervals: &[AssignmentInterval]) -> Vec<Overlap> {
    let mut overlaps = Vec::new();

    for (i, a) in intervals.iter().enumerate() {
        if !a.is_well_formed() {
            continue;
        }
        for (j, b) in intervals.iter().enumerate().skip(i + 1) {
            if !b.is_well_formed() {
                continue;
            }
            if a.start < b.end && b.start < a.end {
                let overlap_start = a.start.max(b.start);
                let overlap_end = a.end.min(b.end);
                overlaps.push(Overlap {
                    first_index: i,
                    second_index: j,
                    first: a.clone(),
                    second: b.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    overlaps
}
