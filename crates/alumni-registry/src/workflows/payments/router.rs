use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::intake::{PaymentSubmission, PaymentUpdate};
use super::service::{PaymentQuery, PaymentService};
use crate::workflows::approval::{Caller, RecordId};
use crate::workflows::validation::JsonForm;

pub fn payment_router(service: Arc<PaymentService>) -> Router {
    Router::new()
        .route("/api/payments", post(submit_handler).get(list_handler))
        .route("/api/payments/:id", get(show_handler).put(update_handler))
        .route("/api/payments/:id/approve", post(approve_handler))
        .route("/api/payments/:id/reject", post(reject_handler))
        .route("/api/payments/:id/receipt", get(receipt_handler))
        .with_state(service)
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    JsonForm(submission): JsonForm<PaymentSubmission>,
) -> Response {
    match service.submit(&caller, submission, Utc::now()) {
        Ok(payment) => (StatusCode::CREATED, Json(json!({ "data": payment }))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    Query(query): Query<PaymentQuery>,
) -> Response {
    match service.list(&caller, &query) {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn show_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.show(&caller, RecordId(id)) {
        Ok(payment) => Json(json!({ "data": payment })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    Path(id): Path<u64>,
    JsonForm(update): JsonForm<PaymentUpdate>,
) -> Response {
    match service.update(&caller, RecordId(id), update, Utc::now()) {
        Ok(payment) => Json(json!({ "data": payment })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.approve(&caller, RecordId(id), Utc::now()) {
        Ok(approved) => Json(json!({
            "message": "Payment approved successfully.",
            "payment": approved.payment,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reject_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.reject(&caller, RecordId(id), Utc::now()) {
        Ok(payment) => Json(json!({
            "message": "Payment rejected successfully.",
            "payment": payment,
        }))
        .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn receipt_handler(
    State(service): State<Arc<PaymentService>>,
    caller: Caller,
    Path(id): Path<u64>,
) -> Response {
    match service.receipt(&caller, RecordId(id)) {
        Ok(document) => (
            [(header::CONTENT_TYPE, document.content_type.to_string())],
            document.bytes,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
