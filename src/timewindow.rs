use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use crate::models::TimeWindow;

static RELATIVE_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(last|past|next)\s+(\d{1,3})\s+days?$").expect("valid relative-days regex")
});

// Weeks start on Monday.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn last_week(today: NaiveDate) -> TimeWindow {
    let start = week_start(today) - Duration::days(7);
    TimeWindow {
        start,
        end: start + Duration::days(6),
    }
}

pub fn this_week(today: NaiveDate) -> TimeWindow {
    let start = week_start(today);
    TimeWindow {
        start,
        end: start + Duration::days(6),
    }
}

pub fn next_week(today: NaiveDate) -> TimeWindow {
    let start = week_start(today) + Duration::days(7);
    TimeWindow {
        start,
        end: start + Duration::days(6),
    }
}

pub fn last_days(today: NaiveDate, days: i64) -> TimeWindow {
    TimeWindow {
        start: today - Duration::days(days.max(1)),
        end: today,
    }
}

pub fn next_days(today: NaiveDate, days: i64) -> TimeWindow {
    TimeWindow {
        start: today,
        end: today + Duration::days(days.max(1)),
    }
}

fn single_day(date: NaiveDate) -> TimeWindow {
    TimeWindow {
        start: date,
        end: date,
    }
}

/// Resolve a relative expression such as "last week" against `today`.
/// Returns `None` for expressions outside the supported set.
pub fn resolve(expression: &str, today: NaiveDate) -> Option<TimeWindow> {
    let normalized = expression
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ");
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    match normalized.as_str() {
        "last week" | "past week" | "previous week" => return Some(last_week(today)),
        "this week" | "current week" => return Some(this_week(today)),
        "next week" | "coming week" => return Some(next_week(today)),
        "today" => return Some(single_day(today)),
        "yesterday" => return Some(single_day(today - Duration::days(1))),
        "tomorrow" => return Some(single_day(today + Duration::days(1))),
        _ => {}
    }

    let caps = RELATIVE_DAYS.captures(&normalized)?;
    let days: i64 = caps[2].parse().ok()?;
    if days == 0 {
        return None;
    }

    match &caps[1] {
        "next" => Some(next_days(today, days)),
        _ => Some(last_days(today, days)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_week_is_previous_monday_to_sunday() {
        // 2025-07-16 is a Wednesday.
        let window = resolve("last week", date(2025, 7, 16)).unwrap();
        assert_eq!(window.start, date(2025, 7, 7));
        assert_eq!(window.end, date(2025, 7, 13));
    }

    #[test]
    fn next_week_is_following_monday_to_sunday() {
        let window = resolve("next week", date(2025, 7, 16)).unwrap();
        assert_eq!(window.start, date(2025, 7, 21));
        assert_eq!(window.end, date(2025, 7, 27));
    }

    #[test]
    fn monday_belongs_to_its_own_week() {
        let monday = date(2025, 7, 14);
        assert_eq!(this_week(monday).start, monday);
        assert_eq!(last_week(monday).end, date(2025, 7, 13));
        assert_eq!(next_week(monday).start, date(2025, 7, 21));
    }

    #[test]
    fn sunday_still_points_back_one_week() {
        let sunday = date(2025, 7, 20);
        assert_eq!(last_week(sunday).start, date(2025, 7, 7));
        assert_eq!(next_week(sunday).start, date(2025, 7, 21));
    }

    #[test]
    fn resolution_is_deterministic() {
        let today = date(2025, 7, 18);
        assert_eq!(resolve("last week", today), resolve("Last_Week", today));
        assert_eq!(resolve("next week", today), resolve("  NEXT   week ", today));
    }

    #[test]
    fn relative_days_follow_cutoff_convention() {
        let today = date(2025, 7, 18);
        let window = resolve("last 14 days", today).unwrap();
        assert_eq!(window.start, date(2025, 7, 4));
        assert_eq!(window.end, today);

        let window = resolve("next 3 days", today).unwrap();
        assert_eq!(window.start, today);
        assert_eq!(window.end, date(2025, 7, 21));
    }

    #[test]
    fn single_day_expressions() {
        let today = date(2025, 7, 18);
        assert_eq!(resolve("yesterday", today).unwrap().start, date(2025, 7, 17));
        assert_eq!(resolve("tomorrow", today).unwrap().end, date(2025, 7, 19));
        assert!(resolve("today", today).unwrap().contains(today));
    }

    #[test]
    fn unknown_expressions_do_not_resolve() {
        let today = date(2025, 7, 18);
        assert!(resolve("sometime soon", today).is_none());
        assert!(resolve("last 0 days", today).is_none());
    }
}
