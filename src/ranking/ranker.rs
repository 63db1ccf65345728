// src/ranking/ranker.rs

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{
    parser::RawExamDate,
    sort_key::{SortKey, sort_key},
};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("invalid `{name}`: {reason}")]
    InvalidPaginationParameter { name: &'static str, reason: String },
}

/// Anything that carries a raw exam date.
pub trait Dated {
    fn exam_date(&self) -> &RawExamDate;
}

/// A validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Result<Self, RankError> {
        Ok(Self {
            page: positive("page", page)?,
            limit: positive("limit", limit)?,
        })
    }

    /// Builds a request from raw query-string values. Missing values take the
    /// defaults (page 1, limit 5); present values must be positive integers.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Result<Self, RankError> {
        Ok(Self {
            page: param("page", page, DEFAULT_PAGE)?,
            limit: param("limit", limit, DEFAULT_LIMIT)?,
        })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn param(name: &'static str, raw: Option<&str>, default: usize) -> Result<usize, RankError> {
    match raw {
        None => Ok(default),
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<i64>()
                .map_err(|_| RankError::InvalidPaginationParameter {
                    name,
                    reason: format!("`{raw}` is not an integer"),
                })?;
            positive(name, value)
        }
    }
}

fn positive(name: &'static str, value: i64) -> Result<usize, RankError> {
    if value < 1 {
        return Err(RankError::InvalidPaginationParameter {
            name,
            reason: format!("must be a positive integer, got {value}"),
        });
    }
    usize::try_from(value).map_err(|_| RankError::InvalidPaginationParameter {
        name,
        reason: format!("{value} is out of range"),
    })
}

/// One page of a ranked collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub per_page: usize,
}

/// Whether a record belongs on the upcoming-exams timeline at `now`:
/// calendar dates from `now` on, and any free text.
pub fn is_upcoming(date: &RawExamDate, now: DateTime<Utc>) -> bool {
    match date {
        RawExamDate::Calendar(at) => *at >= now,
        RawExamDate::Text(_) => true,
        RawExamDate::Absent => false,
    }
}

/// Filters to upcoming records and stable-sorts them by key, keeping the keys.
pub fn rank_keyed<T: Dated>(records: Vec<T>, now: DateTime<Utc>) -> Vec<(SortKey, T)> {
    let mut keyed: Vec<(SortKey, T)> = records
        .into_iter()
        .filter(|record| is_upcoming(record.exam_date(), now))
        .map(|record| (sort_key(record.exam_date(), now), record))
        .collect();

    // `sort_by_key` is stable: equal keys keep input order.
    keyed.sort_by_key(|(key, _)| *key);
    keyed
}

pub fn rank<T: Dated>(records: Vec<T>, now: DateTime<Utc>) -> Vec<T> {
    rank_keyed(records, now)
        .into_iter()
        .map(|(_, record)| record)
        .collect()
}

/// Slices an already ranked collection.
pub fn paginate<T>(ranked: Vec<T>, request: PageRequest) -> Page<T> {
    let total_records = ranked.len();
    let items = ranked
        .into_iter()
        .skip(request.offset())
        .take(request.limit)
        .collect();

    Page {
        items,
        current_page: request.page,
        total_pages: total_records.div_ceil(request.limit),
        total_records,
        per_page: request.limit,
    }
}

pub fn rank_page<T: Dated>(records: Vec<T>, now: DateTime<Utc>, request: PageRequest) -> Page<T> {
    paginate(rank(records, now), request)
}
