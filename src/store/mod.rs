// src/store/mod.rs

//! Storage seam. Handlers only see these traits; [`postgres::PgStore`] backs
//! them in production and [`memory::MemoryStore`] in tests and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{
    exam_record::{EditOutcome, ExamRecord, ExamUpsert},
    resource::{NameCount, NewResource, Resource},
    subscription::Subscription,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(sqlx::Error),

    /// No connection could be had: the pool timed out or was shut down.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait ExamStore: Send + Sync {
    /// Every exam, in insertion order.
    async fn list_exams(&self) -> Result<Vec<ExamRecord>, StoreError>;

    /// Exams that may belong on the timeline at `now`: a calendar date at or
    /// after `now`, or a free-text date. Insertion order.
    async fn list_timeline_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExamRecord>, StoreError>;

    async fn find_exam(&self, id: i64) -> Result<Option<ExamRecord>, StoreError>;

    /// Case-insensitive substring match on the exam name.
    async fn search_exams(&self, query: &str, limit: usize)
    -> Result<Vec<ExamRecord>, StoreError>;

    /// Atomically claims `user_id`'s edit for `day` and upserts the exam by
    /// name. Nothing is written when the day's edit is already used.
    async fn apply_edit(
        &self,
        user_id: &str,
        day: NaiveDate,
        upsert: ExamUpsert,
    ) -> Result<EditOutcome, StoreError>;

    async fn has_edited_on(&self, user_id: &str, day: NaiveDate) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_subscription(
        &self,
        user_id: &str,
        exam_id: i64,
    ) -> Result<Option<Subscription>, StoreError>;

    /// Inserts or replaces the (user, exam) subscription.
    async fn upsert_subscription(&self, subscription: Subscription) -> Result<(), StoreError>;

    async fn subscriptions_for_user(&self, user_id: &str)
    -> Result<Vec<Subscription>, StoreError>;

    async fn subscriptions_for_exam(&self, exam_id: i64) -> Result<Vec<Subscription>, StoreError>;
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Newest upload first.
    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError>;

    async fn insert_resource(&self, resource: NewResource) -> Result<i64, StoreError>;

    /// Case-insensitive substring match on title or exam name.
    async fn search_resources(&self, query: &str, limit: usize)
    -> Result<Vec<Resource>, StoreError>;

    /// Resource counts per category, most used first, ties by name.
    async fn count_by_category(&self) -> Result<Vec<NameCount>, StoreError>;

    /// Resource counts per exam name ("Unknown" when missing), most used first, ties by name.
    async fn count_by_exam_name(&self) -> Result<Vec<NameCount>, StoreError>;
}

/// Label used for resources uploaded without an exam name.
pub const UNKNOWN_EXAM_NAME: &str = "Unknown";
