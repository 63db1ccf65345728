// src/handlers/subscription.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam_record::ExamSummary,
        subscription::{SubscribeRequest, SubscribedExam, Subscription},
    },
    state::AppState,
    utils::jwt::Claims,
};

/// Whether the caller is subscribed to an exam.
pub async fn subscription_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = state
        .subscriptions
        .find_subscription(&claims.sub, exam_id)
        .await?;

    Ok(Json(
        serde_json::json!({ "isSubscribed": subscription.is_some() }),
    ))
}

/// Subscribe (or refresh contact points) for an exam's updates.
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<i64>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .subscriptions
        .upsert_subscription(Subscription {
            user_id: claims.sub.clone(),
            exam_id,
            fcm_token: payload.token,
            email: payload.email,
            phone_number: payload.phone_number,
        })
        .await?;

    tracing::info!(exam_id, user = %claims.sub, "subscribed to exam updates");

    Ok(Json(
        serde_json::json!({ "message": "Subscription successful" }),
    ))
}

/// The caller's subscriptions with exam names.
/// Exams that no longer exist are listed as "Unknown Exam".
pub async fn list_subscribed_exams(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let subscriptions = state.subscriptions.subscriptions_for_user(&claims.sub).await?;

    let mut subscribed_exams = Vec::with_capacity(subscriptions.len());
    for sub in subscriptions {
        let exam_name = match state.exams.find_exam(sub.exam_id).await {
            Ok(Some(exam)) => exam.exam_name,
            Ok(None) => "Unknown Exam".to_string(),
            Err(e) => {
                tracing::error!("Error fetching exam {}: {:?}", sub.exam_id, e);
                "Error: Unable to fetch exam".to_string()
            }
        };
        subscribed_exams.push(SubscribedExam {
            exam_id: sub.exam_id,
            exam_name,
        });
    }

    Ok(Json(
        serde_json::json!({ "subscribedExams": subscribed_exams }),
    ))
}

/// Full details of the caller's subscribed exams; missing exams are dropped.
pub async fn subscribed_exam_details(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let subscriptions = state.subscriptions.subscriptions_for_user(&claims.sub).await?;

    let mut details: Vec<ExamSummary> = Vec::with_capacity(subscriptions.len());
    for sub in subscriptions {
        match state.exams.find_exam(sub.exam_id).await {
            Ok(Some(exam)) => details.push(exam.into()),
            Ok(None) => tracing::warn!("Exam not found for subscription: {}", sub.exam_id),
            Err(e) => tracing::error!("Error fetching exam {}: {:?}", sub.exam_id, e),
        }
    }

    Ok(Json(serde_json::json!({ "subscribedExams": details })))
}
