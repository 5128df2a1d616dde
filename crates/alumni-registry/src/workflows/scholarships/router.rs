use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::intake::ScholarshipSubmission;
use super::service::{ScholarshipApplicationQuery, ScholarshipService};
use crate::workflows::approval::{Caller, RecordId, RejectRequest};
use crate::workflows::validation::JsonForm;

pub fn scholarship_router(service: Arc<ScholarshipService>) -> Router {
    Router::new()
        .route(
            "/api/scholarship-applications",
            post(submit_handler).get(list_handler),
        )
        .route("/api/scholarship-applications/:id", get(show_handler))
        .route(
            "/api/scholarship-applications/:id/approve",
            post(approve_handler),
        )
        .route(
            "/api/scholarship-applications/:id/reject",
            post(reject_handler),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<ScholarshipService>>,
    caller: Caller,
    JsonForm(submission): JsonForm<ScholarshipSubmission>,
) -> Response {
    match service.submit(&caller, submission, Utc::now()) {
        Ok(application) => {
            (StatusCode::CREATED, Json(json!({ "data": application }))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler(
    State(service): State<Arc<ScholarshipService>>,
    caller: Caller,
    Query(query): Query<ScholarshipApplicationQuery>,
) -> Response {
    match service.list(&caller, &query) {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn show_handler(
    State(service): State<Arc<ScholarshipService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.show(&caller, RecordId(id)) {
        Ok(application) => Json(json!({ "data": application })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler(
    State(service): State<Arc<ScholarshipService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.approve(&caller, RecordId(id), Utc::now()) {
        Ok(application) => Json(json!({
            "message": "Application approved successfully.",
            "data": application,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

/// The body is optional; an empty request rejects without a reason.
pub(crate) async fn reject_handler(
    State(service): State<Arc<ScholarshipService>>,
    caller: Caller,
    Path(id): Path<u64>,
    JsonForm(request): JsonForm<RejectRequest>,
) -> Response {
    match service.reject(&caller, RecordId(id), request, Utc::now()) {
        Ok(application) => Json(json!({
            "message": "Application rejected successfully.",
            "data": application,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}
