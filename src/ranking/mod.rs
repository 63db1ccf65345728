// src/ranking/mod.rs

//! Exam-date normalization and ranking.
//!
//! Raw exam dates arrive as calendar instants, loosely formatted text
//! ("March to May 2025", "Expected in September") or nothing at all.
//! [`parser`] classifies them, [`sort_key`] turns a classification plus a
//! reference instant into a comparable key, and [`ranker`] orders and pages a
//! collection by that key. Nothing here reads the system clock: callers pass
//! `now` explicitly.

pub mod parser;
pub mod ranker;
pub mod sort_key;

pub use parser::{ParsedExamDate, RawExamDate, parse};
pub use ranker::{Dated, Page, PageRequest, RankError, rank, rank_keyed, rank_page};
pub use sort_key::{SortKey, resolve, sort_key};

use chrono::Month;

/// English month names (lower-case) in calendar order.
/// Shared by the parser and the resolver so both agree on month indices.
pub(crate) const MONTHS: [(&str, Month); 12] = [
    ("january", Month::January),
    ("february", Month::February),
    ("march", Month::March),
    ("april", Month::April),
    ("may", Month::May),
    ("june", Month::June),
    ("july", Month::July),
    ("august", Month::August),
    ("september", Month::September),
    ("october", Month::October),
    ("november", Month::November),
    ("december", Month::December),
];

/// Looks up a full English month name, ignoring ASCII case.
pub(crate) fn month_from_name(name: &str) -> Option<Month> {
    MONTHS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, month)| *month)
}

/// Zero-based month index (January = 0).
pub(crate) fn month_index(month: Month) -> u32 {
    month.number_from_month() - 1
}

/// Regex alternation matching any month name, e.g. `january|february|...`.
pub(crate) fn month_alternation() -> String {
    MONTHS
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_table_is_in_calendar_order() {
        for (i, (_, month)) in MONTHS.iter().enumerate() {
            assert_eq!(month_index(*month), i as u32);
        }
    }

    #[test]
    fn month_lookup_ignores_case() {
        assert_eq!(month_from_name("SePtEmBeR"), Some(Month::September));
        assert_eq!(month_from_name("sept"), None);
    }
}
