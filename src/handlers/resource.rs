// src/handlers/resource.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::resource::{CreateResourceRequest, NewResource},
    state::AppState,
    utils::jwt::Claims,
};

/// Lists all resources, newest first.
pub async fn list_resources(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let resources = state.resources.list_resources().await?;
    Ok(Json(serde_json::json!({ "resources": resources })))
}

/// Registers metadata for a file already uploaded to blob storage.
pub async fn create_resource(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let resource_id = state
        .resources
        .insert_resource(NewResource {
            user_id: claims.sub.clone(),
            user_name: payload.user_name,
            exam_name: Some(payload.exam_name),
            exam_title: payload.exam_title,
            exam_category: payload.exam_category,
            file_name: payload.file_name,
            file_url: payload.file_url,
            upload_date: Utc::now(),
        })
        .await?;

    tracing::info!(resource_id, user = %claims.sub, "resource registered");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Resource uploaded successfully",
            "resourceId": resource_id,
        })),
    ))
}

/// Resource counts per category, most popular first.
pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = state.resources.count_by_category().await?;
    Ok(Json(serde_json::json!({ "categories": categories })))
}

/// Resource counts per exam name, most popular first.
pub async fn list_exam_names(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let exam_names = state.resources.count_by_exam_name().await?;
    Ok(Json(serde_json::json!({ "examNames": exam_names })))
}
