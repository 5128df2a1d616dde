use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use super::approval::{RepositoryError, TransitionError};
use super::members::CredentialError;
use super::validation::ValidationErrors;
use crate::outbound::DocumentError;

/// Error raised by the workflow services; each variant maps to one HTTP answer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("the given data was invalid")]
    Validation(ValidationErrors),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("unauthorized action")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("{0}")]
    Rule(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ServiceError {
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_)
            | ServiceError::Transition(_)
            | ServiceError::Rule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Repository(_)
            | ServiceError::Credential(_)
            | ServiceError::Document(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ServiceError::Validation(errors) => json!({
                "message": "The given data was invalid.",
                "errors": errors,
            }),
            ServiceError::Unauthenticated => json!({ "message": "Unauthenticated." }),
            ServiceError::Forbidden => json!({ "message": "Unauthorized action." }),
            ServiceError::NotFound(message) => json!({ "message": message }),
            ServiceError::Transition(err) => json!({ "message": err.kind().not_pending_message() }),
            ServiceError::Rule(message) => json!({ "message": message }),
            other => {
                error!(error = %other, "request failed");
                json!({ "message": "Server Error", "error": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
