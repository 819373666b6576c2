use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub const USER_NOT_FOUND: &str = "user-not-found";
pub const USER_EXISTS: &str = "user-exists";
pub const USER_BLOCKED: &str = "user-blocked";
pub const VALIDATION_ERROR: &str = "validation-error";
pub const TOKEN_SIGNING: &str = "token-signing";
pub const INTERNAL_ERROR: &str = "internal-error";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("User with name '{0}' already exists")]
    Exists(String),

    #[error("User {0} is blocked")]
    Blocked(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Wire shape of every domain error: `{"error": {"type", "message", "args"}}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Stable key, e.g. `user-not-found`
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    /// Offending id or name
    pub args: Vec<String>,
}

impl UserError {
    /// Stable key clients use to pick a message.
    pub fn key(&self) -> &'static str {
        match self {
            UserError::NotFound(_) => USER_NOT_FOUND,
            UserError::Exists(_) => USER_EXISTS,
            UserError::Blocked(_) => USER_BLOCKED,
            UserError::Validation(_) => VALIDATION_ERROR,
            UserError::Signing(_) => TOKEN_SIGNING,
            UserError::Internal(_) => INTERNAL_ERROR,
        }
    }

    /// Offending arguments for the client-facing message.
    pub fn args(&self) -> Vec<String> {
        match self {
            UserError::NotFound(id) | UserError::Blocked(id) => vec![id.to_string()],
            UserError::Exists(name) => vec![name.clone()],
            UserError::Validation(msg) => vec![msg.clone()],
            UserError::Signing(_) | UserError::Internal(_) => vec![],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::Exists(_) => StatusCode::CONFLICT,
            UserError::Blocked(_) => StatusCode::FORBIDDEN,
            UserError::Validation(_) => StatusCode::BAD_REQUEST,
            UserError::Signing(_) | UserError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            UserError::Signing(msg) | UserError::Internal(msg) => {
                tracing::error!(error_type = self.key(), "Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.key().to_string(),
                message,
                args: self.args(),
            },
        };

        (status, Json(body)).into_response()
    }
}
