//! Structured error types for service operations.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Entity absent, or not visible to the acting user.
    NotFound,
    /// Entity visible, but ownership or relationship validation failed.
    PermissionDenied,
    /// Malformed or unresolvable field in a write payload.
    ValidationError,
    /// Required query parameter missing.
    BadRequest,
    /// No acting user could be resolved for the request.
    Unauthorized,

    // Internal errors
    DatabaseError,
    InternalError,
}

impl ErrorCode {
    /// HTTP status class this code maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::PermissionDenied => 403,
            ErrorCode::ValidationError | ErrorCode::BadRequest => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::DatabaseError | ErrorCode::InternalError => 500,
        }
    }
}

/// Structured error surfaced to callers as a terminal per-request failure.
#[derive(Debug, Serialize)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn not_found(kind: &str, id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::NotFound, format!("{} not found: {}", kind, id))
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(ErrorCode::NotFound, "Task not found")
            .with_details(format!("task_id={}", task_id))
    }

    pub fn profile_not_found(profile_id: i64) -> Self {
        Self::new(ErrorCode::NotFound, "User profile not found")
            .with_details(format!("user_profile_id={}", profile_id))
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorCode::ValidationError, format!("{} is required", field)).with_field(field)
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, reason).with_field(field)
    }

    pub fn missing_param(param: &str) -> Self {
        Self::new(
            ErrorCode::BadRequest,
            format!("query parameter '{}' is required", param),
        )
        .with_field(param)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            "Authentication credentials were not provided or are invalid",
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

// Allow using ? with anyhow errors from the storage layer
impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ServiceError>() {
            Ok(service_err) => service_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(db_err) => ServiceError::database(db_err),
                Err(err) => ServiceError::internal(err),
            },
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
