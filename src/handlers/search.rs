// src/handlers/search.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::resource::{SearchHit, SearchParams},
    state::AppState,
};

/// Maximum hits returned per collection.
const SEARCH_LIMIT: usize = 5;

/// Searches resources (title or exam name) and exams (name), case-insensitively.
/// Resources come first.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(AppError::BadRequest(
            "Query parameter is required".to_string(),
        ))?;

    let resources = state.resources.search_resources(query, SEARCH_LIMIT).await?;
    let exams = state.exams.search_exams(query, SEARCH_LIMIT).await?;

    tracing::debug!(
        resources = resources.len(),
        exams = exams.len(),
        "search for {:?}",
        query
    );

    let results: Vec<SearchHit> = resources
        .into_iter()
        .map(SearchHit::Resource)
        .chain(exams.into_iter().map(SearchHit::Exam))
        .collect();

    Ok(Json(results))
}
