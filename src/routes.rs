// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{exam, resource, search, subscription},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public reads: exams, the ranked timeline, resources, search.
/// * Identity-gated writes and per-user views behind `auth_middleware`.
/// * Global middleware (Trace, CORS) and shared state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let exam_routes = Router::new()
        .route("/", get(exam::list_exams))
        .route("/{id}", get(exam::get_exam))
        // Protected exam routes
        .merge(
            Router::new()
                .route("/update", post(exam::update_exam_info))
                .route("/can-update", get(exam::can_update))
                .layer(auth.clone()),
        );

    let subscription_routes = Router::new()
        .route("/", get(subscription::list_subscribed_exams))
        .route("/details", get(subscription::subscribed_exam_details))
        .route(
            "/{exam_id}",
            get(subscription::subscription_status).post(subscription::subscribe),
        )
        .layer(auth.clone());

    let resource_routes = Router::new()
        .route("/", get(resource::list_resources))
        .route("/categories", get(resource::list_categories))
        .route("/exam-names", get(resource::list_exam_names))
        .merge(
            Router::new()
                .route("/upload", post(resource::create_resource))
                .layer(auth),
        );

    Router::new()
        .nest("/api/exams", exam_routes)
        .route("/api/exam-dates", get(exam::list_exam_dates))
        .route("/api/search", get(search::search))
        .nest("/api/subscriptions", subscription_routes)
        .nest("/api/resources", resource_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
