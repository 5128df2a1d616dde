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

use super::intake::DeclarationSubmission;
use super::service::DeclarationService;
use crate::workflows::approval::{Caller, ListQuery, RecordId, RejectRequest};
use crate::workflows::validation::JsonForm;

pub fn declaration_router(service: Arc<DeclarationService>) -> Router {
    Router::new()
        .route(
            "/api/self-declarations",
            post(submit_handler).get(list_handler),
        )
        .route("/api/self-declarations/:id", get(show_handler))
        .route("/api/self-declarations/:id/approve", post(approve_handler))
        .route("/api/self-declarations/:id/reject", post(reject_handler))
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<DeclarationService>>,
    caller: Caller,
    JsonForm(submission): JsonForm<DeclarationSubmission>,
) -> Response {
    match service.submit(&caller, submission, Utc::now()) {
        Ok(declaration) => {
            (StatusCode::CREATED, Json(json!({ "data": declaration }))).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler(
    State(service): State<Arc<DeclarationService>>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Response {
    match service.list(&caller, &query) {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn show_handler(
    State(service): State<Arc<DeclarationService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.show(&caller, RecordId(id)) {
        Ok(declaration) => Json(json!({ "data": declaration })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler(
    State(service): State<Arc<DeclarationService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.approve(&caller, RecordId(id), Utc::now()) {
        Ok(approved) => Json(json!({
            "message": "Self-declaration approved successfully. Secondary member type assigned.",
            "self_declaration": approved.declaration,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reject_handler(
    State(service): State<Arc<DeclarationService>>,
    caller: Caller,
    Path(id): Path<u64>,
    JsonForm(request): JsonForm<RejectRequest>,
) -> Response {
    match service.reject(&caller, RecordId(id), request, Utc::now()) {
        Ok(declaration) => Json(json!({
            "message": "Self-declaration rejected successfully.",
            "self_declaration": declaration,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}
