// Commit activity bucketing.
// Buckets commit timestamps by weekday and by calendar date.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};

use crate::github::CommitTimestamp;

/// Label used when there is no commit data.
pub const UNKNOWN_DAY: &str = "Unknown";

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Start of the trailing `days` window ending at `now`.
///
/// Saturates at the earliest representable instant instead of overflowing.
pub fn window_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Weekday (UTC) with the most commits.
///
/// Ties go to the earliest weekday, Monday first. Returns "Unknown" for no commits.
pub fn most_active_day(commits: &[CommitTimestamp]) -> String {
    let mut buckets = [0u64; 7];
    for commit in commits {
        buckets[commit.weekday().num_days_from_monday() as usize] += 1;
    }

    let mut best: Option<(usize, u64)> = None;
    for (day, &count) in buckets.iter().enumerate() {
        if count > 0 && best.is_none_or(|(_, top)| count > top) {
            best = Some((day, count));
        }
    }

    best.map(|(day, _)| WEEKDAY_NAMES[day].to_string())
        .unwrap_or_else(|| UNKNOWN_DAY.to_string())
}

/// Commits per calendar date (UTC) within the trailing `days` ending at `now`.
pub fn daily_commit_counts(
    commits: &[CommitTimestamp],
    now: DateTime<Utc>,
    days: i64,
) -> BTreeMap<NaiveDate, u64> {
    let since = window_start(now, days);
    let mut counts = BTreeMap::new();
    for commit in commits.iter().filter(|c| **c >= since && **c <= now) {
        *counts.entry(commit.date_naive()).or_insert(0) += 1;
    }
    counts
}
