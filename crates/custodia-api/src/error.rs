//! Request-level errors and their HTTP rendering.

use axum::Json;
use axum::response::{IntoResponse, Response};
use custodia_auth::AuthError;
use custodia_entity::EntityError;
use custodia_workflow::WorkflowError;
use http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;

/// Body message for authorization failures.
pub const ACCESS_DENIED: &str = "Access denied";

/// Body message for refused transitions.
pub const TRANSITION_NOT_ALLOWED: &str = "Transition is not allowed";

/// Body message for server-side faults.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Everything a resource call can fail with.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Authentication or authorization failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Validation, lookup, or storage failed.
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// The workflow refused or could not run the transition.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The entity could not be rendered as JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Entity(EntityError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Entity(EntityError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Workflow(err) if err.is_transition_rejection() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body this error renders as.
    pub fn body(&self) -> Value {
        match self {
            ApiError::Auth(_) => json!({ "message": ACCESS_DENIED }),
            ApiError::Entity(EntityError::Validation(errors)) => json!({ "errors": errors }),
            ApiError::Entity(err @ EntityError::NotFound { .. }) => {
                json!({ "message": err.to_string() })
            }
            ApiError::Workflow(err) if err.is_transition_rejection() => {
                json!({ "message": TRANSITION_NOT_ALLOWED })
            }
            _ => json!({ "message": INTERNAL_ERROR }),
        }
    }

    /// Returns `true` for 4xx errors.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}
