// src/handlers/exam.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::exam_record::{
        EditHistoryEntry, EditOutcome, ExamChanges, ExamUpsert, TimelineParams, TimelineResponse,
        UpdateExamInfoRequest,
    },
    notify::Notification,
    ranking::{PageRequest, RawExamDate, rank_page},
    state::AppState,
    utils::{html::clean_html, jwt::Claims},
};

/// Lists every exam in store order.
pub async fn list_exams(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let exams = state.exams.list_exams().await?;
    Ok(Json(exams))
}

/// Retrieves a single exam by ID.
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = state
        .exams
        .find_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Upcoming exams in chronological order, paginated.
///
/// * Validates `page`/`limit` before touching the store.
/// * Fetches candidates under the configured timeout.
/// * Ranks them against the current instant and slices the requested page.
pub async fn list_exam_dates(
    State(state): State<AppState>,
    Query(params): Query<TimelineParams>,
) -> Result<Json<TimelineResponse>, AppError> {
    let request = PageRequest::from_query(params.page.as_deref(), params.limit.as_deref())?;
    let now = Utc::now();

    let candidates = tokio::time::timeout(
        state.config.fetch_timeout,
        state.exams.list_timeline_candidates(now),
    )
    .await
    .map_err(|_| {
        AppError::UpstreamFetchFailure(format!(
            "exam store did not answer within {:?}",
            state.config.fetch_timeout
        ))
    })??;

    let page = rank_page(candidates, now, request);
    tracing::debug!(
        page = page.current_page,
        total = page.total_records,
        "ranked exam timeline"
    );

    Ok(Json(TimelineResponse::from(page)))
}

/// Submits updated exam information.
///
/// * Validates the payload and normalizes the date and details.
/// * Applies the edit if the caller has not edited yet today (UTC).
/// * Notifies subscribers of the exam; delivery failures never fail the request.
pub async fn update_exam_info(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateExamInfoRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = Utc::now();
    let exam_date = RawExamDate::from_input(&payload.exam_date);
    let exam_details = clean_html(&payload.exam_details);

    let upsert = ExamUpsert {
        exam_name: payload.exam_name.clone(),
        exam_date: exam_date.clone(),
        exam_details: exam_details.clone(),
        source: payload.source.clone(),
        edit: EditHistoryEntry {
            user_id: claims.sub.clone(),
            username: payload.username.clone(),
            updated_at: now,
            changes: ExamChanges {
                exam_date,
                exam_details,
                source: payload.source.clone(),
            },
        },
    };

    // 2. Apply under the once-per-day rule
    let exam_id = match state
        .exams
        .apply_edit(&claims.sub, now.date_naive(), upsert)
        .await?
    {
        EditOutcome::Applied { exam_id } => exam_id,
        EditOutcome::DailyLimitReached => {
            return Err(AppError::Forbidden(
                "You can only update exam information once per day".to_string(),
            ));
        }
    };

    tracing::info!(
        exam_id,
        user = %claims.sub,
        "exam information updated: {}",
        payload.exam_name
    );

    // 3. Notify subscribers
    let notify_id = payload.exam_id.unwrap_or(exam_id);
    match state.subscriptions.subscriptions_for_exam(notify_id).await {
        Ok(subscribers) if !subscribers.is_empty() => {
            let notification = Notification::exam_updated(notify_id, &payload.exam_name);
            let report = state.notifier.notify(&notification, &subscribers).await;
            if !report.failed.is_empty() {
                tracing::warn!(
                    exam_id = notify_id,
                    "{} notification channel(s) failed",
                    report.failed.len()
                );
            }
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Failed to load subscribers for exam {}: {:?}", notify_id, e);
        }
    }

    Ok(Json(serde_json::json!({
        "message": "Exam information updated successfully",
        "examId": exam_id,
    })))
}

/// Whether the caller may still submit an exam edit today.
pub async fn can_update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let edited = state.exams.has_edited_on(&claims.sub, today).await?;

    Ok(Json(serde_json::json!({ "canUpdate": !edited })))
}
