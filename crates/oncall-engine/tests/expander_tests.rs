//! Tests for recurring appointment expansion.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use oncall_engine::{expand, Ordinal, RecurrenceRequest, RecurrenceRule, ScheduleError};

fn rule(
    ordinal: Ordinal,
    weekday: Weekday,
    hh: u32,
    mm: u32,
    duration: u32,
    years: (i32, i32),
) -> RecurrenceRule {
    RecurrenceRule::new(
        ordinal,
        weekday,
        NaiveTime::from_hms_opt(hh, mm, 0).unwrap(),
        duration,
        years.0,
        years.1,
    )
    .expect("valid rule")
}

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hh, mm, 0)
        .unwrap()
}

fn dates(occurrences: &[oncall_engine::Occurrence]) -> Vec<(i32, u32, u32)> {
    occurrences
        .iter()
        .map(|o| (o.date.year(), o.date.month(), o.date.day()))
        .collect()
}

// ---------------------------------------------------------------------------
// First Monday of every month, 16:00-17:00, 2026
// ---------------------------------------------------------------------------

#[test]
fn first_monday_2026_yields_twelve_occurrences() {
    let result = expand(&rule(Ordinal::First, Weekday::Mon, 16, 0, 60, (2026, 2026)))
        .expect("should expand successfully");

    assert_eq!(result.len(), 12, "one occurrence per month");
    assert_eq!(
        dates(&result),
        vec![
            (2026, 1, 5),
            (2026, 2, 2),
            (2026, 3, 2),
            (2026, 4, 6),
            (2026, 5, 4),
            (2026, 6, 1),
            (2026, 7, 6),
            (2026, 8, 3),
            (2026, 9, 7),
            (2026, 10, 5),
            (2026, 11, 2),
            (2026, 12, 7),
        ]
    );

    for occ in &result {
        assert_eq!(occ.date.weekday(), Weekday::Mon);
        assert_eq!(occ.start, occ.date.and_hms_opt(16, 0, 0).unwrap());
        assert_eq!(occ.end, occ.date.and_hms_opt(17, 0, 0).unwrap());
    }
}

#[test]
fn expansion_is_idempotent() {
    let r = rule(Ordinal::Third, Weekday::Wed, 9, 30, 45, (2026, 2027));
    let a = expand(&r).unwrap();
    let b = expand(&r).unwrap();
    assert_eq!(a, b);
}

#[test]
fn multi_year_range_is_chronological() {
    let result = expand(&rule(Ordinal::First, Weekday::Mon, 16, 0, 60, (2026, 2027))).unwrap();

    assert_eq!(result.len(), 24);
    assert!(result.windows(2).all(|w| w[0].start < w[1].start));
    assert_eq!(dates(&result)[12], (2027, 1, 4));
}

// ---------------------------------------------------------------------------
// Ordinals
// ---------------------------------------------------------------------------

#[test]
fn fourth_friday_in_four_friday_february() {
    // February 2026 has exactly four Fridays: 6, 13, 20, 27.
    let result = expand(&rule(Ordinal::Fourth, Weekday::Fri, 10, 0, 30, (2026, 2026))).unwrap();

    let feb: Vec<_> = result.iter().filter(|o| o.date.month() == 2).collect();
    assert_eq!(feb.len(), 1, "exactly one occurrence in February");
    assert_eq!(feb[0].date, NaiveDate::from_ymd_opt(2026, 2, 27).unwrap());
}

#[test]
fn last_friday_picks_final_match_regardless_of_count() {
    let result = expand(&rule(Ordinal::Last, Weekday::Fri, 15, 0, 60, (2026, 2026))).unwrap();

    assert_eq!(result.len(), 12);
    // January 2026 has five Fridays; the last one is the 30th.
    assert_eq!(dates(&result)[0], (2026, 1, 30));
    // February has four; last and fourth coincide.
    assert_eq!(dates(&result)[1], (2026, 2, 27));
    for occ in &result {
        assert_eq!(occ.date.weekday(), Weekday::Fri);
        assert!(occ.date.day() > 21, "last Friday is always in the final week");
    }
}

#[test]
fn third_tuesday_matches_calendar() {
    let result = expand(&rule(Ordinal::Third, Weekday::Tue, 14, 0, 60, (2026, 2026))).unwrap();

    assert_eq!(dates(&result)[..3], [(2026, 1, 20), (2026, 2, 17), (2026, 3, 17)]);
    assert_eq!(result[1].start, at(2026, 2, 17, 14, 0));
}

#[test]
fn dtstart_on_matching_day_is_kept() {
    // 2024-01-01 is a Monday, so the first Monday of January is the expansion anchor itself.
    let result = expand(&rule(Ordinal::First, Weekday::Mon, 16, 0, 60, (2024, 2024))).unwrap();

    assert_eq!(result.len(), 12);
    assert_eq!(result[0].start, at(2024, 1, 1, 16, 0));
}

#[test]
fn dtstart_on_non_matching_day_never_leaks() {
    // 2024-01-01 is the first Monday, not the second.
    let result = expand(&rule(Ordinal::Second, Weekday::Mon, 16, 0, 60, (2024, 2024))).unwrap();

    assert_eq!(result.len(), 12);
    assert_eq!(result[0].start, at(2024, 1, 8, 16, 0));
    assert!(result.iter().all(|o| o.date.day() >= 8 && o.date.day() <= 14));
}

// ---------------------------------------------------------------------------
// Edge cases
// ---------------------------------------------------------------------------

#[test]
fn inverted_year_range_is_empty() {
    let result = expand(&rule(Ordinal::First, Weekday::Mon, 16, 0, 60, (2027, 2026))).unwrap();
    assert!(result.is_empty());
}

#[test]
fn zero_duration_yields_zero_length_occurrences() {
    let result = expand(&rule(Ordinal::Last, Weekday::Thu, 8, 15, 0, (2026, 2026))).unwrap();

    assert_eq!(result.len(), 12);
    assert!(result.iter().all(|o| o.start == o.end));
}

#[test]
fn long_duration_crosses_midnight() {
    let result = expand(&rule(Ordinal::First, Weekday::Mon, 23, 0, 120, (2026, 2026))).unwrap();
    assert_eq!(result[0].end, at(2026, 1, 6, 1, 0));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn weekend_rule_built_by_hand_is_rejected() {
    let r = RecurrenceRule {
        ordinal: Ordinal::First,
        weekday: Weekday::Sat,
        time_of_day: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        duration_minutes: 60,
        start_year: 2026,
        end_year: 2026,
    };
    assert!(matches!(expand(&r), Err(ScheduleError::InvalidRule(_))));
}

#[test]
fn out_of_range_year_is_rejected() {
    let r = RecurrenceRule {
        ordinal: Ordinal::First,
        weekday: Weekday::Mon,
        time_of_day: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        duration_minutes: 60,
        start_year: 0,
        end_year: 2026,
    };
    assert!(matches!(expand(&r), Err(ScheduleError::InvalidRule(_))));
}

#[test]
fn request_round_trips_into_rule() {
    let req: RecurrenceRequest = serde_json::from_str(
        r#"{"ordinal":"first","weekday":"Monday","timeOfDay":"16:00","durationMinutes":60,"startYear":2026,"endYear":2026}"#,
    )
    .unwrap();

    let r = RecurrenceRule::try_from(req).expect("valid request");
    assert_eq!(r.ordinal, Ordinal::First);
    assert_eq!(r.weekday, Weekday::Mon);
    assert_eq!(r.time_of_day, NaiveTime::from_hms_opt(16, 0, 0).unwrap());
    assert_eq!(expand(&r).unwrap().len(), 12);
}

#[test]
fn request_with_bad_fields_is_rejected() {
    let base = RecurrenceRequest {
        ordinal: "first".into(),
        weekday: "Monday".into(),
        time_of_day: "16:00".into(),
        duration_minutes: 60,
        start_year: 2026,
        end_year: 2026,
    };

    let bad_ordinal = RecurrenceRequest {
        ordinal: "fifth".into(),
        ..base.clone()
    };
    let bad_weekday = RecurrenceRequest {
        weekday: "Funday".into(),
        ..base.clone()
    };
    let weekend = RecurrenceRequest {
        weekday: "Sunday".into(),
        ..base.clone()
    };
    let bad_time = RecurrenceRequest {
        time_of_day: "25:00".into(),
        ..base.clone()
    };

    for req in [bad_ordinal, bad_weekday, weekend, bad_time] {
        assert!(
            matches!(RecurrenceRule::try_from(&req), Err(ScheduleError::InvalidRule(_))),
            "{:?} should be rejected",
            req
        );
    }
}
