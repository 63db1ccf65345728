// src/ranking/sort_key.rs

use chrono::{DateTime, Datelike, Month, NaiveDate, Utc};

use super::{
    month_index,
    parser::{ParsedExamDate, RawExamDate, parse},
};

/// Comparable position of an exam on the timeline.
///
/// Variant order matters: every `At` sorts before `Unbounded`, which stands
/// in for "no usable date".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortKey {
    /// Milliseconds since the Unix epoch.
    At(i64),
    Unbounded,
}

/// Resolves a parsed date against `now`.
///
/// * `Exact` keeps its own instant, even when already past.
/// * `MonthRange` is passed when its year is behind `now`, or it is this year
///   and the midpoint month (rounded down) is strictly before the current
///   month. A passed range moves to its start month next year; otherwise it
///   keeps its start month in the stated year.
/// * `MonthOnly` is passed when it is the current month or earlier, and then
///   moves to next year.
/// * `Unknown` is `Unbounded`.
///
/// Month starts are midnight UTC on the 1st.
pub fn resolve(parsed: &ParsedExamDate, now: DateTime<Utc>) -> SortKey {
    let current_year = now.year();
    let current_month = now.month0();

    match *parsed {
        ParsedExamDate::Exact(at) => SortKey::At(at.timestamp_millis()),
        ParsedExamDate::MonthRange { start, end, year } => {
            let mid = (month_index(start) + month_index(end)) / 2;
            let passed = (year == current_year && mid < current_month) || year < current_year;
            let target_year = if passed { current_year + 1 } else { year };
            month_start(target_year, start)
        }
        ParsedExamDate::MonthOnly(month) => {
            let passed = month_index(month) <= current_month;
            let target_year = if passed { current_year + 1 } else { current_year };
            month_start(target_year, month)
        }
        ParsedExamDate::Unknown => SortKey::Unbounded,
    }
}

/// Parses then resolves.
pub fn sort_key(raw: &RawExamDate, now: DateTime<Utc>) -> SortKey {
    resolve(&parse(raw), now)
}

fn month_start(year: i32, month: Month) -> SortKey {
    NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| SortKey::At(at.and_utc().timestamp_millis()))
        .unwrap_or(SortKey::Unbounded)
}
