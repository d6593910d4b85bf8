use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::requests::ServiceStatus;
use crate::utils::api_response::ApiResponse;
use crate::utils::auth_errors::auth_error_message;

/// Any failure reported by a persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Required-field check on a creation payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("service_date `{0}` is not a valid YYYY-MM-DD date")]
    InvalidDate(String),
}

impl ValidationError {
    /// Form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidDate(_) => "service_date",
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("service request {0} not found")]
    NotFound(Uuid),
    #[error("transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: ServiceStatus,
        to: ServiceStatus,
    },
}

impl From<RepositoryError> for ApiResponse<()> {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(e) => ApiResponse::error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation failed",
                Some(json!({ "field": e.field(), "error": e.to_string() })),
            ),
            RepositoryError::NotFound(id) => ApiResponse::error(
                StatusCode::NOT_FOUND,
                "Service request not found",
                Some(json!({ "id": id })),
            ),
            RepositoryError::InvalidTransition { from, to } => ApiResponse::error(
                StatusCode::CONFLICT,
                "Status transition not allowed",
                Some(json!({ "from": from, "to": to })),
            ),
            RepositoryError::Persistence(e) => ApiResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Persistence failure",
                Some(json!({ "error": e.to_string() })),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    InvalidInput,
    Conflict,
    Unauthorized,
    Internal,
}

/// Auth failure with the provider's raw message.
///
/// The message is never shown to users directly; it goes through
/// [`auth_error_message`] first.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        AuthError {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(AuthErrorKind::InvalidCredentials, "Invalid login credentials")
    }

    pub fn email_taken() -> Self {
        Self::new(AuthErrorKind::Conflict, "Email already registered")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::InvalidCredentials | AuthErrorKind::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AuthErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            AuthErrorKind::Conflict => StatusCode::CONFLICT,
            AuthErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiResponse<()> {
    fn from(err: AuthError) -> Self {
        ApiResponse::error(err.status(), auth_error_message(&err), None)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl From<ExportError> for ApiResponse<()> {
    fn from(err: ExportError) -> Self {
        ApiResponse::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to build export",
            Some(json!({ "error": err.to_string() })),
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}
