// src/models/resource.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::exam_record::validate_url_string;

/// A shared study resource. The file itself lives in external blob storage.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: i64,
    pub user_id: String,
    pub user_name: String,
    pub exam_name: Option<String>,
    pub exam_title: String,
    pub exam_category: String,
    pub file_name: String,
    pub file_url: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
}

/// DTO for registering an uploaded resource.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 200))]
    pub exam_name: String,
    #[validate(length(min = 1, max = 200))]
    pub exam_title: String,
    #[validate(length(min = 1, max = 100))]
    pub exam_category: String,
    #[validate(length(min = 1, max = 100))]
    pub user_name: String,
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    #[validate(length(min = 1, max = 1000), custom(function = validate_url_string))]
    pub file_url: String,
}

/// Store input for a new resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub user_id: String,
    pub user_name: String,
    pub exam_name: Option<String>,
    pub exam_title: String,
    pub exam_category: String,
    pub file_name: String,
    pub file_url: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
}

/// Number of resources sharing a name (category or exam name).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct NameCount {
    pub name: String,
    pub count: i64,
}

/// A search result, tagged with where it came from.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    Resource(Resource),
    Exam(crate::models::exam_record::ExamRecord),
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
