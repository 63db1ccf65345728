// tests/ranking_props.rs
//
// Properties of the timeline ranking that must hold for any input.

use aspirants_club::ranking::{
    Dated, PageRequest, ParsedExamDate, RawExamDate, SortKey, parse, rank, rank_keyed, rank_page,
    sort_key,
};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

#[derive(Debug, Clone, PartialEq)]
struct Row {
    seq: usize,
    date: RawExamDate,
}

impl Dated for Row {
    fn exam_date(&self) -> &RawExamDate {
        &self.date
    }
}

fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    // 2020-01-01 .. 2030-01-01
    (1_577_836_800i64..1_893_456_000i64).prop_map(|s| Utc.timestamp_opt(s, 0).unwrap())
}

fn arb_raw() -> impl Strategy<Value = RawExamDate> {
    prop_oneof![
        (1_577_836_800i64..1_893_456_000i64)
            .prop_map(|s| RawExamDate::Calendar(Utc.timestamp_opt(s, 0).unwrap())),
        (0usize..12, 0usize..12, 2018i32..2032).prop_map(|(a, b, y)| {
            RawExamDate::Text(format!("{} to {} {}", MONTHS[a], MONTHS[b], y))
        }),
        (0usize..12).prop_map(|m| RawExamDate::Text(format!("Expected in {}", MONTHS[m]))),
        "[a-z ]{0,12}".prop_map(RawExamDate::Text),
    ]
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(arb_raw(), 0..40).prop_map(|dates| {
        dates
            .into_iter()
            .enumerate()
            .map(|(seq, date)| Row { seq, date })
            .collect()
    })
}

proptest! {
    #[test]
    fn ranking_is_idempotent(rows in arb_rows(), now in arb_now()) {
        prop_assert_eq!(rank_keyed(rows.clone(), now), rank_keyed(rows, now));
    }

    #[test]
    fn keys_ascend_and_equal_keys_keep_input_order(rows in arb_rows(), now in arb_now()) {
        let ranked = rank_keyed(rows, now);
        for pair in ranked.windows(2) {
            let (ka, a) = &pair[0];
            let (kb, b) = &pair[1];
            prop_assert!(ka <= kb);
            if ka == kb {
                prop_assert!(a.seq < b.seq);
            }
        }
    }

    #[test]
    fn unknown_sorts_after_every_dated_record(rows in arb_rows(), now in arb_now()) {
        let ranked = rank(rows, now);
        let unknown_at = ranked
            .iter()
            .position(|r| parse(&r.date) == ParsedExamDate::Unknown);
        if let Some(first_unknown) = unknown_at {
            for row in &ranked[first_unknown..] {
                prop_assert_eq!(sort_key(&row.date, now), SortKey::Unbounded);
            }
        }
    }

    #[test]
    fn month_only_keys_fall_within_the_next_year(m in 0usize..12, now in arb_now()) {
        let key = sort_key(&RawExamDate::Text(MONTHS[m].to_string()), now);
        let SortKey::At(millis) = key else {
            return Err(TestCaseError::fail(format!("{} resolved to {:?}", MONTHS[m], key)));
        };
        prop_assert!(millis > now.timestamp_millis());
        prop_assert!(millis <= (now + chrono::Duration::days(366)).timestamp_millis());
    }

    #[test]
    fn parsing_never_panics(text in ".{0,40}") {
        let _ = parse(&RawExamDate::Text(text));
    }

    #[test]
    fn pages_partition_the_ranked_collection(rows in arb_rows(), now in arb_now(), limit in 1i64..8) {
        let ranked = rank(rows.clone(), now);
        let first = rank_page(rows.clone(), now, PageRequest::new(1, limit).unwrap());
        let total_pages = first.total_pages;
        prop_assert_eq!(first.total_records, ranked.len());

        let mut collected = Vec::new();
        for page in 1..=total_pages as i64 {
            let page = rank_page(rows.clone(), now, PageRequest::new(page, limit).unwrap());
            prop_assert!(!page.items.is_empty());
            prop_assert!(page.items.len() <= limit as usize);
            collected.extend(page.items);
        }
        prop_assert_eq!(collected, ranked);
    }
}
