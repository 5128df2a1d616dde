use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::approval::RepositoryError;
use crate::workflows::ServiceError;

/// Failures surfaced by the binary: startup, seeding and maintenance commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot data is malformed: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("seeding failed: {0}")]
    Seed(#[from] RepositoryError),
    #[error("registry error: {0}")]
    Service(#[from] ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Service(err) => err.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
