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

use super::intake::{MembershipSubmission, MembershipUpdate};
use super::service::MembershipService;
use crate::workflows::approval::{Caller, ListQuery, RecordId};
use crate::workflows::validation::JsonForm;

pub fn membership_router(service: Arc<MembershipService>) -> Router {
    Router::new()
        .route(
            "/api/membership-applications",
            post(submit_handler).get(list_handler),
        )
        .route(
            "/api/membership-applications/:id",
            get(show_handler).put(update_handler),
        )
        .route(
            "/api/membership-applications/:id/approve",
            post(approve_handler),
        )
        .route(
            "/api/membership-applications/:id/reject",
            post(reject_handler),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<MembershipService>>,
    JsonForm(submission): JsonForm<MembershipSubmission>,
) -> Response {
    match service.submit(submission, Utc::now()) {
        Ok(application) => {
            (StatusCode::CREATED, Json(json!({ "data": application }))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler(
    State(service): State<Arc<MembershipService>>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Response {
    match service.list(&caller, &query) {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn show_handler(
    State(service): State<Arc<MembershipService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.show(&caller, RecordId(id)) {
        Ok(application) => Json(json!({ "data": application })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_handler(
    State(service): State<Arc<MembershipService>>,
    caller: Caller,
    Path(id): Path<u64>,
    JsonForm(update): JsonForm<MembershipUpdate>,
) -> Response {
    match service.update(&caller, RecordId(id), update, Utc::now()) {
        Ok(application) => Json(json!({ "data": application })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler(
    State(service): State<Arc<MembershipService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.approve(&caller, RecordId(id), Utc::now()) {
        Ok(approved) => Json(json!({
            "message": "Application approved successfully. User account created.",
            "application": approved.application,
            "user": approved.user,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reject_handler(
    State(service): State<Arc<MembershipService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.reject(&caller, RecordId(id), Utc::now()) {
        Ok(application) => Json(json!({
            "message": "Application rejected successfully.",
            "application": application,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}
