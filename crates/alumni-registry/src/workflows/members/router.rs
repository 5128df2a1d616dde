use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::service::{MemberDirectory, MemberQuery, RenewRequest};
use crate::workflows::approval::{Caller, RecordId};
use crate::workflows::validation::JsonForm;

pub fn member_router(directory: Arc<MemberDirectory>) -> Router {
    Router::new()
        .route("/api/members", get(list_handler))
        .route("/api/members/:user_id", get(show_handler))
        .route("/api/members/:user_id/renew-membership", post(renew_handler))
        .route("/api/members/:user_id/resend-sms", post(resend_sms_handler))
        .route("/api/members/:user_id/disable", post(disable_handler))
        .route("/api/members/:user_id/enable", post(enable_handler))
        .route("/api/member-info/:member_id", get(member_info_handler))
        .with_state(directory)
}

pub(crate) async fn list_handler(
    State(directory): State<Arc<MemberDirectory>>,
    caller: Caller,
    Query(query): Query<MemberQuery>,
) -> Response {
    match directory.list(&caller, &query) {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn show_handler(
    State(directory): State<Arc<MemberDirectory>>,
    caller: Caller,
    Path(user_id): Path<u64>,
) -> Response {
    match directory.show(&caller, RecordId(user_id)) {
        Ok(member) => Json(json!({ "data": member })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn renew_handler(
    State(directory): State<Arc<MemberDirectory>>,
    caller: Caller,
    Path(user_id): Path<u64>,
    JsonForm(request): JsonForm<RenewRequest>,
) -> Response {
    match directory.renew(&caller, RecordId(user_id), &request, Utc::now()) {
        Ok(member) => Json(json!({ "data": member })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn resend_sms_handler(
    State(directory): State<Arc<MemberDirectory>>,
    caller: Caller,
    Path(user_id): Path<u64>,
) -> Response {
    match directory.resend_credentials(&caller, RecordId(user_id)) {
        Ok(()) => Json(json!({ "message": "SMS sent successfully." })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn disable_handler(
    State(directory): State<Arc<MemberDirectory>>,
    caller: Caller,
    Path(user_id): Path<u64>,
) -> Response {
    match directory.set_disabled(&caller, RecordId(user_id), true, Utc::now()) {
        Ok(member) => Json(json!({ "data": member })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn enable_handler(
    State(directory): State<Arc<MemberDirectory>>,
    caller: Caller,
    Path(user_id): Path<u64>,
) -> Response {
    match directory.set_disabled(&caller, RecordId(user_id), false, Utc::now()) {
        Ok(member) => Json(json!({ "data": member })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn member_info_handler(
    State(directory): State<Arc<MemberDirectory>>,
    Path(member_id): Path<String>,
) -> Response {
    match directory.member_info(&member_id) {
        Ok(info) => Json(info).into_response(),
        Err(err) => err.into_response(),
    }
}
