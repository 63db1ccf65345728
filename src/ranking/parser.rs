// src/ranking/parser.rs

use std::sync::OnceLock;

use chrono::{DateTime, Month, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{month_alternation, month_from_name};

/// An exam date as it is stored: a calendar instant, free text typed by a
/// contributor, or nothing.
///
/// Serializes untagged: an RFC 3339 string, the raw text, or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawExamDate {
    #[default]
    Absent,
    Calendar(DateTime<Utc>),
    Text(String),
}

impl RawExamDate {
    /// Normalizes a submitted date string.
    ///
    /// RFC 3339 timestamps and `YYYY-MM-DD` dates (midnight UTC) become
    /// [`RawExamDate::Calendar`]; blank input is [`RawExamDate::Absent`];
    /// anything else is kept verbatim (trimmed) as text.
    pub fn from_input(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return RawExamDate::Absent;
        }

        if let Ok(at) = DateTime::parse_from_rfc3339(input) {
            return RawExamDate::Calendar(at.with_timezone(&Utc));
        }

        if let Some(at) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return RawExamDate::Calendar(at.and_utc());
        }

        RawExamDate::Text(input.to_string())
    }

    /// Splits into the two nullable columns used by the SQL store.
    pub fn into_columns(self) -> (Option<DateTime<Utc>>, Option<String>) {
        match self {
            RawExamDate::Absent => (None, None),
            RawExamDate::Calendar(at) => (Some(at), None),
            RawExamDate::Text(text) => (None, Some(text)),
        }
    }

    /// Inverse of [`RawExamDate::into_columns`]. A calendar value wins if both are set.
    pub fn from_columns(at: Option<DateTime<Utc>>, text: Option<String>) -> Self {
        match (at, text) {
            (Some(at), _) => RawExamDate::Calendar(at),
            (None, Some(text)) => RawExamDate::Text(text),
            (None, None) => RawExamDate::Absent,
        }
    }
}

/// Typed reading of a [`RawExamDate`].
///
/// Carries no ordering by itself: `MonthOnly` and `MonthRange` need a
/// reference instant to decide which year they fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedExamDate {
    Exact(DateTime<Utc>),
    /// Inclusive range of whole months in `year`.
    MonthRange { start: Month, end: Month, year: i32 },
    /// A month with no year.
    MonthOnly(Month),
    Unknown,
}

struct Patterns {
    /// `<Month> to <Month> <YYYY>`
    month_range: Regex,
    /// Any month name, anywhere.
    any_month: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let months = month_alternation();
        Patterns {
            month_range: Regex::new(&format!(
                r"(?i)\b({months})\s+to\s+({months})\s+([0-9]{{4}})"
            ))
            .expect("month range pattern is valid"),
            any_month: Regex::new(&format!("(?i)(?:{months})"))
                .expect("month name pattern is valid"),
        }
    })
}

/// Classifies a raw exam date. Never fails; unrecognized input is `Unknown`.
pub fn parse(raw: &RawExamDate) -> ParsedExamDate {
    match raw {
        RawExamDate::Calendar(at) => ParsedExamDate::Exact(*at),
        RawExamDate::Text(text) => parse_text(text),
        RawExamDate::Absent => ParsedExamDate::Unknown,
    }
}

/// Classifies free text.
///
/// The `"<Month> to <Month> <Year>"` form yields a range. Otherwise the first
/// month name found anywhere in the text wins, so "April or May" reads as
/// April and "Mayor's exam" reads as May.
pub fn parse_text(text: &str) -> ParsedExamDate {
    let patterns = patterns();

    if let Some(caps) = patterns.month_range.captures(text) {
        let start = month_from_name(&caps[1]);
        let end = month_from_name(&caps[2]);
        let year = caps[3].parse::<i32>().ok();
        if let (Some(start), Some(end), Some(year)) = (start, end, year) {
            return ParsedExamDate::MonthRange { start, end, year };
        }
    }

    patterns
        .any_month
        .find(text)
        .and_then(|m| month_from_name(m.as_str()))
        .map(ParsedExamDate::MonthOnly)
        .unwrap_or(ParsedExamDate::Unknown)
}
