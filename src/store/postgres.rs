// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use super::{ExamStore, ResourceStore, StoreError, SubscriptionStore, UNKNOWN_EXAM_NAME};
use crate::{
    models::{
        exam_record::{EditHistoryEntry, EditOutcome, ExamRecord, ExamUpsert},
        resource::{NameCount, NewResource, Resource},
        subscription::Subscription,
    },
    ranking::RawExamDate,
};

const EXAM_COLUMNS: &str = "id, exam_name, exam_date_at, exam_date_text, exam_details, source, \
     last_updated_by, last_updated_at, update_count, edit_history, created_at";

const RESOURCE_COLUMNS: &str = "id, user_id, user_name, exam_name, exam_title, exam_category, \
     file_name, file_url, upload_date";

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the `exams` table; the date is split over two columns.
#[derive(FromRow)]
struct ExamRow {
    id: i64,
    exam_name: String,
    exam_date_at: Option<DateTime<Utc>>,
    exam_date_text: Option<String>,
    exam_details: String,
    source: String,
    last_updated_by: Option<String>,
    last_updated_at: Option<DateTime<Utc>>,
    update_count: i64,
    edit_history: Json<Vec<EditHistoryEntry>>,
    created_at: Option<DateTime<Utc>>,
}

impl From<ExamRow> for ExamRecord {
    fn from(row: ExamRow) -> Self {
        Self {
            id: row.id,
            exam_name: row.exam_name,
            exam_date: RawExamDate::from_columns(row.exam_date_at, row.exam_date_text),
            exam_details: row.exam_details,
            source: row.source,
            last_updated_by: row.last_updated_by,
            last_updated_at: row.last_updated_at,
            update_count: row.update_count,
            edit_history: row.edit_history.0,
            created_at: row.created_at,
        }
    }
}

/// `%query%` for ILIKE, with LIKE metacharacters escaped.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn to_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl ExamStore for PgStore {
    async fn list_exams(&self) -> Result<Vec<ExamRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ExamRow>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExamRecord::from).collect())
    }

    async fn list_timeline_candidates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ExamRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ExamRow>(&format!(
            r#"
            SELECT {EXAM_COLUMNS}
            FROM exams
            WHERE exam_date_at >= $1 OR exam_date_text IS NOT NULL
            ORDER BY id
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExamRecord::from).collect())
    }

    async fn find_exam(&self, id: i64) -> Result<Option<ExamRecord>, StoreError> {
        let row = sqlx::query_as::<_, ExamRow>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ExamRecord::from))
    }

    async fn search_exams(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ExamRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ExamRow>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE exam_name ILIKE $1 ORDER BY id LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ExamRecord::from).collect())
    }

    async fn apply_edit(
        &self,
        user_id: &str,
        day: NaiveDate,
        upsert: ExamUpsert,
    ) -> Result<EditOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The unique (user_id, edit_day) index makes the claim race-free.
        let claimed = sqlx::query(
            r#"
            INSERT INTO exam_updates (user_id, exam_name, edit_day, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, edit_day) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&upsert.exam_name)
        .bind(day)
        .bind(upsert.edit.updated_at)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await?;
            return Ok(EditOutcome::DailyLimitReached);
        }

        let edited_at = upsert.edit.updated_at;
        let editor = upsert.edit.user_id.clone();
        let (exam_date_at, exam_date_text) = upsert.exam_date.into_columns();

        let exam_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO exams (
                exam_name, exam_date_at, exam_date_text, exam_details, source,
                last_updated_by, last_updated_at, update_count, edit_history, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $7)
            ON CONFLICT (exam_name) DO UPDATE SET
                exam_date_at = EXCLUDED.exam_date_at,
                exam_date_text = EXCLUDED.exam_date_text,
                exam_details = EXCLUDED.exam_details,
                source = EXCLUDED.source,
                last_updated_by = EXCLUDED.last_updated_by,
                last_updated_at = EXCLUDED.last_updated_at,
                update_count = exams.update_count + 1,
                edit_history = exams.edit_history || EXCLUDED.edit_history
            RETURNING id
            "#,
        )
        .bind(&upsert.exam_name)
        .bind(exam_date_at)
        .bind(exam_date_text)
        .bind(&upsert.exam_details)
        .bind(&upsert.source)
        .bind(editor)
        .bind(edited_at)
        .bind(Json(vec![upsert.edit]))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(EditOutcome::Applied { exam_id })
    }

    async fn has_edited_on(&self, user_id: &str, day: NaiveDate) -> Result<bool, StoreError> {
        let edited: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM exam_updates WHERE user_id = $1 AND edit_day = $2)",
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await?;

        Ok(edited)
    }
}

#[derive(FromRow)]
struct SubscriptionRow {
    user_id: String,
    exam_id: i64,
    fcm_token: Option<String>,
    email: Option<String>,
    phone_number: Option<String>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            user_id: row.user_id,
            exam_id: row.exam_id,
            fcm_token: row.fcm_token,
            email: row.email,
            phone_number: row.phone_number,
        }
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn find_subscription(
        &self,
        user_id: &str,
        exam_id: i64,
    ) -> Result<Option<Subscription>, StoreError> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, exam_id, fcm_token, email, phone_number
            FROM subscriptions
            WHERE user_id = $1 AND exam_id = $2
            "#,
        )
        .bind(user_id)
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn upsert_subscription(&self, subscription: Subscription) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, exam_id, fcm_token, email, phone_number)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, exam_id) DO UPDATE SET
                fcm_token = EXCLUDED.fcm_token,
                email = EXCLUDED.email,
                phone_number = EXCLUDED.phone_number
            "#,
        )
        .bind(subscription.user_id)
        .bind(subscription.exam_id)
        .bind(subscription.fcm_token)
        .bind(subscription.email)
        .bind(subscription.phone_number)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn subscriptions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Subscription>, StoreError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, exam_id, fcm_token, email, phone_number
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    async fn subscriptions_for_exam(&self, exam_id: i64) -> Result<Vec<Subscription>, StoreError> {
        let rows = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            SELECT user_id, exam_id, fcm_token, email, phone_number
            FROM subscriptions
            WHERE exam_id = $1
            ORDER BY id
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Subscription::from).collect())
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn list_resources(&self) -> Result<Vec<Resource>, StoreError> {
        let resources = sqlx::query_as::<_, Resource>(&format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources ORDER BY upload_date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(resources)
    }

    async fn insert_resource(&self, resource: NewResource) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO resources (
                user_id, user_name, exam_name, exam_title, exam_category,
                file_name, file_url, upload_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(resource.user_id)
        .bind(resource.user_name)
        .bind(resource.exam_name)
        .bind(resource.exam_title)
        .bind(resource.exam_category)
        .bind(resource.file_name)
        .bind(resource.file_url)
        .bind(resource.upload_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn search_resources(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Resource>, StoreError> {
        let resources = sqlx::query_as::<_, Resource>(&format!(
            r#"
            SELECT {RESOURCE_COLUMNS}
            FROM resources
            WHERE exam_title ILIKE $1 OR exam_name ILIKE $1
            ORDER BY id
            LIMIT $2
            "#
        ))
        .bind(like_pattern(query))
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(resources)
    }

    async fn count_by_category(&self) -> Result<Vec<NameCount>, StoreError> {
        let counts = sqlx::query_as::<_, NameCount>(
            r#"
            SELECT exam_category AS name, COUNT(*) AS count
            FROM resources
            GROUP BY exam_category
            ORDER BY count DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }

    async fn count_by_exam_name(&self) -> Result<Vec<NameCount>, StoreError> {
        let counts = sqlx::query_as::<_, NameCount>(
            r#"
            SELECT COALESCE(exam_name, $1) AS name, COUNT(*) AS count
            FROM resources
            GROUP BY 1
            ORDER BY count DESC, name
            "#,
        )
        .bind(UNKNOWN_EXAM_NAME)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
