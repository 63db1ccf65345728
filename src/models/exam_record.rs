// src/models/exam_record.rs

use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::ranking::{Dated, Page, RawExamDate};

/// An exam and its crowd-maintained schedule information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    pub id: i64,

    /// Unique; edits are upserted by name.
    pub exam_name: String,

    #[serde(default)]
    pub exam_date: RawExamDate,

    pub exam_details: String,

    /// Where the information came from (official notice URL).
    pub source: String,

    /// Identity id of the last editor.
    pub last_updated_by: Option<String>,
    pub last_updated_at: Option<chrono::DateTime<chrono::Utc>>,

    /// Number of accepted edits.
    pub update_count: i64,

    #[serde(default)]
    pub edit_history: Vec<EditHistoryEntry>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Dated for ExamRecord {
    fn exam_date(&self) -> &RawExamDate {
        &self.exam_date
    }
}

/// One accepted edit, appended to `ExamRecord::edit_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditHistoryEntry {
    pub user_id: String,
    pub username: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub changes: ExamChanges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamChanges {
    #[serde(default)]
    pub exam_date: RawExamDate,
    pub exam_details: String,
    pub source: String,
}

/// The fields shown for a subscribed exam.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSummary {
    pub id: i64,
    pub exam_name: String,
    pub exam_date: RawExamDate,
    pub exam_details: String,
    pub source: String,
}

impl From<ExamRecord> for ExamSummary {
    fn from(exam: ExamRecord) -> Self {
        Self {
            id: exam.id,
            exam_name: exam.exam_name,
            exam_date: exam.exam_date,
            exam_details: exam.exam_details,
            source: exam.source,
        }
    }
}

/// Write-side input for the store: the new state of an exam plus the history
/// entry describing it.
#[derive(Debug, Clone)]
pub struct ExamUpsert {
    pub exam_name: String,
    pub exam_date: RawExamDate,
    pub exam_details: String,
    pub source: String,
    pub edit: EditHistoryEntry,
}

/// DTO for an exam-info submission.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamInfoRequest {
    /// Exam whose subscribers are notified; defaults to the upserted exam.
    pub exam_id: Option<i64>,

    #[validate(length(min = 1, max = 200, message = "Exam name must be between 1 and 200 chars"))]
    pub exam_name: String,

    /// A calendar date (RFC 3339 or YYYY-MM-DD) or free text such as "March to May 2025".
    #[validate(length(min = 1, max = 100, message = "Exam date must be between 1 and 100 chars"))]
    pub exam_date: String,

    #[validate(length(min = 1, max = 10000, message = "Exam details must be between 1 and 10000 chars"))]
    pub exam_details: String,

    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub source: String,

    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 chars"))]
    pub username: String,
}

/// Validates that a string is a correctly formatted URL.
pub(crate) fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Query parameters for the exam timeline.
///
/// Kept as raw strings so malformed numbers surface as a pagination error.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineParams {
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_exams: usize,
    pub exams_per_page: usize,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub exams: Vec<ExamRecord>,
    pub pagination: Pagination,
}

impl From<Page<ExamRecord>> for TimelineResponse {
    fn from(page: Page<ExamRecord>) -> Self {
        Self {
            pagination: Pagination {
                current_page: page.current_page,
                total_pages: page.total_pages,
                total_exams: page.total_records,
                exams_per_page: page.per_page,
            },
            exams: page.items,
        }
    }
}

/// Result of applying an edit under the once-per-day rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied { exam_id: i64 },
    DailyLimitReached,
}
