//! Consecutive-day streak calculation.
//!
//! Everything here is a pure function of a completion history and an
//! explicit reference date. Nothing reads the clock or touches storage, so
//! callers can evaluate many habits concurrently from immutable snapshots.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::zone::CalendarZone;

/// Derived streak statistics for one habit as of a reference date.
///
/// Markers dated after `as_of` are ignored by every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    /// Reference date the summary was computed for
    pub as_of: NaiveDate,
    /// Unbroken run of completed days ending at `as_of` (0 if `as_of` is not completed)
    pub current_streak: u32,
    /// Longest unbroken run anywhere up to `as_of`
    pub longest_streak: u32,
    /// Distinct completed days up to `as_of`
    pub total_completed_days: u32,
    /// Most recent completed day on or before `as_of`
    pub last_completed_on: Option<NaiveDate>,
}

/// Normalize markers to calendar days in `zone`, collapsing same-day duplicates.
pub fn completed_days(markers: &[DateTime<Utc>], zone: CalendarZone) -> BTreeSet<NaiveDate> {
    markers.iter().map(|ts| zone.calendar_day(*ts)).collect()
}

/// Whether any marker falls on `as_of`.
pub fn is_completed_on(markers: &[DateTime<Utc>], as_of: NaiveDate, zone: CalendarZone) -> bool {
    markers.iter().any(|ts| zone.calendar_day(*ts) == as_of)
}

/// Current streak as of `as_of`.
///
/// Returns 0 when `as_of` itself has no marker, however long the history
/// before it. Otherwise counts backwards from `as_of` until the first
/// missing day.
pub fn compute_streak(markers: &[DateTime<Utc>], as_of: NaiveDate, zone: CalendarZone) -> u32 {
    let days = completed_days(markers, zone);
    run_ending_at(&days, as_of)
}

fn run_ending_at(days: &BTreeSet<NaiveDate>, end: NaiveDate) -> u32 {
    let mut streak = 0u32;
    let mut cursor = Some(end);
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Full streak statistics as of `as_of`.
pub fn summarize(markers: &[DateTime<Utc>], as_of: NaiveDate, zone: CalendarZone) -> StreakSummary {
    let days = completed_days(markers, zone);
    let past: Vec<NaiveDate> = days.range(..=as_of).copied().collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in &past {
        run = match prev {
            Some(p) if p.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*day);
    }

    StreakSummary {
        as_of,
        current_streak: run_ending_at(&days, as_of),
        longest_streak: longest,
        total_completed_days: u32::try_from(past.len()).unwrap_or(u32::MAX),
        last_completed_on: past.last().copied(),
    }
}

/// Display text for a streak: nothing at 0, singular for exactly one day.
pub fn streak_label(streak: u32) -> Option<String> {
    match streak {
        0 => None,
        1 => Some("1 day streak".to_string()),
        n => Some(format!("{n} days streak")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveTime};
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Marker at `secs` past UTC midnight of `day`.
    fn at(day: NaiveDate, secs: u32) -> DateTime<Utc> {
        day.and_time(NaiveTime::MIN).and_utc() + Duration::seconds(i64::from(secs))
    }

    fn markers(days: &[&str]) -> Vec<DateTime<Utc>> {
        days.iter().map(|d| at(date(d), 9 * 3600)).collect()
    }

    fn days_before(as_of: NaiveDate, offset: i64) -> NaiveDate {
        as_of - Duration::days(offset)
    }

    const UTC: CalendarZone = CalendarZone::Utc;

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(compute_streak(&[], date("2024-01-10"), UTC), 0);
    }

    #[test]
    fn three_day_run_ending_today() {
        let m = markers(&["2024-01-10", "2024-01-09", "2024-01-08", "2024-01-05"]);
        assert_eq!(compute_streak(&m, date("2024-01-10"), UTC), 3);
    }

    #[test]
    fn missing_today_resets_to_zero() {
        let m = markers(&["2024-01-09", "2024-01-08"]);
        assert_eq!(compute_streak(&m, date("2024-01-10"), UTC), 0);
    }

    #[test]
    fn stops_at_first_gap() {
        let m = markers(&["2024-01-10", "2024-01-09", "2024-01-07"]);
        assert_eq!(compute_streak(&m, date("2024-01-10"), UTC), 2);
    }

    #[test]
    fn walk_crosses_month_and_year_boundaries() {
        let m = markers(&["2024-01-01", "2023-12-31", "2023-12-30"]);
        assert_eq!(compute_streak(&m, date("2024-01-01"), UTC), 3);

        let leap = markers(&["2024-03-01", "2024-02-29", "2024-02-28"]);
        assert_eq!(compute_streak(&leap, date("2024-03-01"), UTC), 3);
    }

    #[test]
    fn same_day_markers_count_once() {
        let day = date("2024-01-10");
        let m = vec![at(day, 0), at(day, 3600), at(day, 86_399), at(day - Duration::days(1), 10)];
        assert_eq!(compute_streak(&m, day, UTC), 2);
    }

    #[test]
    fn future_markers_are_ignored() {
        let m = markers(&["2024-01-12", "2024-01-11", "2024-01-10"]);
        assert_eq!(compute_streak(&m, date("2024-01-10"), UTC), 1);

        let only_future = markers(&["2024-01-11"]);
        assert_eq!(compute_streak(&only_future, date("2024-01-10"), UTC), 0);
    }

    #[test]
    fn zone_decides_which_day_a_marker_counts_for() {
        // 23:30 UTC on the 9th is already the 10th at +01:00.
        let m = vec![
            DateTime::parse_from_rfc3339("2024-01-09T23:30:00Z").unwrap().with_timezone(&Utc),
            DateTime::parse_from_rfc3339("2024-01-09T08:00:00Z").unwrap().with_timezone(&Utc),
        ];
        let plus_one = CalendarZone::fixed(60).unwrap();
        assert_eq!(compute_streak(&m, date("2024-01-10"), plus_one), 2);
        assert_eq!(compute_streak(&m, date("2024-01-10"), UTC), 0);
    }

    #[test]
    fn walk_terminates_at_minimum_date() {
        let m = vec![at(NaiveDate::MIN, 0)];
        assert_eq!(compute_streak(&m, NaiveDate::MIN, UTC), 1);
    }

    #[test]
    fn is_completed_on_agrees_with_streak_being_nonzero() {
        let m = markers(&["2024-01-10", "2024-01-08"]);
        assert!(is_completed_on(&m, date("2024-01-10"), UTC));
        assert!(!is_completed_on(&m, date("2024-01-09"), UTC));
        assert_eq!(compute_streak(&m, date("2024-01-09"), UTC), 0);
    }

    #[test]
    fn summary_reports_longest_and_totals() {
        let m = markers(&[
            "2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04",
            "2024-01-07", "2024-01-09", "2024-01-10", "2024-01-10",
            "2024-01-15",
        ]);
        let summary = summarize(&m, date("2024-01-10"), UTC);
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.longest_streak, 4);
        assert_eq!(summary.total_completed_days, 7);
        assert_eq!(summary.last_completed_on, Some(date("2024-01-10")));
    }

    #[test]
    fn summary_of_empty_history() {
        let summary = summarize(&[], date("2024-01-10"), UTC);
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.longest_streak, 0);
        assert_eq!(summary.total_completed_days, 0);
        assert_eq!(summary.last_completed_on, None);
    }

    #[test]
    fn labels_pluralize() {
        assert_eq!(streak_label(0), None);
        assert_eq!(streak_label(1).as_deref(), Some("1 day streak"));
        assert_eq!(streak_label(2).as_deref(), Some("2 days streak"));
        assert_eq!(streak_label(31).as_deref(), Some("31 days streak"));
    }

    fn history() -> impl Strategy<Value = Vec<(i64, u32)>> {
        prop::collection::vec((0i64..90, 0u32..86_400), 0..60)
    }

    fn build(as_of: NaiveDate, entries: &[(i64, u32)]) -> Vec<DateTime<Utc>> {
        entries
            .iter()
            .map(|(offset, secs)| at(days_before(as_of, *offset), *secs))
            .collect()
    }

    fn reference_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..20_000).prop_map(|d| date("1990-01-01") + Duration::days(d))
    }

    proptest! {
        #[test]
        fn prop_absent_as_of_means_zero(as_of in reference_date(), entries in history()) {
            let entries: Vec<_> = entries.into_iter().filter(|(offset, _)| *offset != 0).collect();
            prop_assert_eq!(compute_streak(&build(as_of, &entries), as_of, UTC), 0);
        }

        #[test]
        fn prop_zero_iff_as_of_missing(as_of in reference_date(), entries in history()) {
            let m = build(as_of, &entries);
            let streak = compute_streak(&m, as_of, UTC);
            prop_assert_eq!(streak == 0, !is_completed_on(&m, as_of, UTC));
        }

        #[test]
        fn prop_exact_run_length(
            as_of in reference_date(),
            k in 0i64..120,
            older in prop::collection::vec(0i64..200, 0..20),
            secs in 0u32..86_400,
        ) {
            let mut entries: Vec<(i64, u32)> = (0..=k).map(|o| (o, secs)).collect();
            entries.extend(older.into_iter().map(|o| (o + k + 2, secs)));
            prop_assert_eq!(compute_streak(&build(as_of, &entries), as_of, UTC), (k + 1) as u32);
        }

        #[test]
        fn prop_duplicates_do_not_inflate(
            as_of in reference_date(),
            entries in history(),
            extra_secs in prop::collection::vec(0u32..86_400, 1..5),
        ) {
            let base = build(as_of, &entries);
            let mut duplicated = base.clone();
            for (offset, _) in &entries {
                for secs in &extra_secs {
                    duplicated.push(at(days_before(as_of, *offset), *secs));
                }
            }
            prop_assert_eq!(
                compute_streak(&base, as_of, UTC),
                compute_streak(&duplicated, as_of, UTC)
            );
        }

        #[test]
        fn prop_order_independent(
            as_of in reference_date(),
            (original, shuffled) in history().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        ) {
            prop_assert_eq!(
                compute_streak(&build(as_of, &original), as_of, UTC),
                compute_streak(&build(as_of, &shuffled), as_of, UTC)
            );
        }

        #[test]
        fn prop_extending_run_backwards_adds_one(
            as_of in reference_date(),
            k in 0i64..60,
            older in prop::collection::vec(0i64..100, 0..10),
        ) {
            let mut entries: Vec<(i64, u32)> = (0..=k).map(|o| (o, 0)).collect();
            entries.extend(older.into_iter().map(|o| (o + k + 3, 0)));
            let mut m = build(as_of, &entries);
            let before = compute_streak(&m, as_of, UTC);
            m.push(at(days_before(as_of, i64::from(before)), 43_200));
            prop_assert_eq!(compute_streak(&m, as_of, UTC), before + 1);
        }

        #[test]
        fn prop_future_markers_ignored(
            as_of in reference_date(),
            entries in history(),
            future in prop::collection::vec((1i64..30, 0u32..86_400), 1..10),
        ) {
            let mut m = build(as_of, &entries);
            let before = compute_streak(&m, as_of, UTC);
            m.extend(future.iter().map(|(ahead, secs)| at(as_of + Duration::days(*ahead), *secs)));
            prop_assert_eq!(compute_streak(&m, as_of, UTC), before);
            prop_assert_eq!(summarize(&m, as_of, UTC).current_streak, before);
        }

        #[test]
        fn prop_summary_is_consistent(as_of in reference_date(), entries in history()) {
            let m = build(as_of, &entries);
            let summary = summarize(&m, as_of, UTC);
            prop_assert_eq!(summary.current_streak, compute_streak(&m, as_of, UTC));
            prop_assert!(summary.longest_streak >= summary.current_streak);
            prop_assert!(summary.total_completed_days >= summary.longest_streak);
            prop_assert_eq!(summary.last_completed_on.is_none(), summary.total_completed_days == 0);
        }
    }
}
