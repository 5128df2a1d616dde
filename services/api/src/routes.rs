use crate::infra::{AppState, Registry};
use alumni_registry::workflows::approval::SharedIdentity;
use alumni_registry::workflows::catalog::catalog_router;
use alumni_registry::workflows::declarations::declaration_router;
use alumni_registry::workflows::members::member_router;
use alumni_registry::workflows::membership::membership_router;
use alumni_registry::workflows::payments::payment_router;
use alumni_registry::workflows::scholarships::scholarship_router;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

/// Every workflow router plus the operational endpoints. The caller layers
/// [`AppState`] on top.
pub(crate) fn registry_routes(registry: &Registry) -> Router {
    let identity: SharedIdentity = registry.identity.clone();

    Router::new()
        .merge(membership_router(registry.membership.clone()))
        .merge(member_router(registry.members.clone()))
        .merge(payment_router(registry.payments.clone()))
        .merge(scholarship_router(registry.scholarships.clone()))
        .merge(declaration_router(registry.declarations.clone()))
        .merge(catalog_router(registry.catalog.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(identity))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
