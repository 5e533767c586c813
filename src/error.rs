//! Central error handling.
//!
//! One error type flows from the stores and services out to the HTTP
//! boundary, where `IntoResponse` maps it onto the API envelope:
//! denial -> 403 with the decision's reason string, missing resource -> 404,
//! missing/invalid identity -> 401, duplicate record -> 409.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, warn};

/// A specialized Result type for taskboard operations.
pub type Result<T> = std::result::Result<T, TaskboardError>;

/// Machine-readable error codes, stable for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Resource errors
    TaskNotFound,
    UserNotFound,
    OrganizationNotFound,
    RecordNotFound,
    DuplicateRecord,

    // Authentication / authorization
    Unauthorized,
    Forbidden,
    InvalidToken,
    TokenExpired,
    InvalidCredentials,

    // Validation
    ValidationError,
    InvalidInput,

    // Infrastructure
    DatabaseError,
    DatabaseConnectionFailed,
    SerializationError,
    ConfigurationError,
    InternalError,
}

impl ErrorCode {
    /// Map onto the HTTP status the boundary layer returns.
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::TaskNotFound
            | Self::UserNotFound
            | Self::OrganizationNotFound
            | Self::RecordNotFound => StatusCode::NOT_FOUND,

            Self::DuplicateRecord => StatusCode::CONFLICT,

            Self::Unauthorized
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            Self::Forbidden => StatusCode::FORBIDDEN,

            Self::ValidationError | Self::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,

            Self::DatabaseConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,

            Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigurationError
            | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Grouping label for logs and metrics.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::TaskNotFound
            | Self::UserNotFound
            | Self::OrganizationNotFound
            | Self::RecordNotFound
            | Self::DuplicateRecord => "resource",
            Self::Unauthorized
            | Self::Forbidden
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::InvalidCredentials => "authorization",
            Self::ValidationError | Self::InvalidInput => "validation",
            Self::DatabaseError | Self::DatabaseConnectionFailed => "database",
            Self::SerializationError => "serialization",
            Self::ConfigurationError => "configuration",
            Self::InternalError => "internal",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The main error type.
///
/// Carries a user-facing message (safe to return to clients) and an
/// optional internal message that only reaches the logs.
#[derive(Error, Debug)]
pub struct TaskboardError {
    code: ErrorCode,
    user_message: Cow<'static, str>,
    internal_message: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for TaskboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.user_message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl TaskboardError {
    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        let err = Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            source: None,
        };
        counter!(
            "taskboard_errors_total",
            "code" => err.code.to_string(),
            "category" => err.code.category().to_string(),
        )
        .increment(1);
        err
    }

    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut err = Self::new(code, user_message);
        err.internal_message = Some(internal_message.into());
        err
    }

    /// Authorization denial with the decision's reason string.
    pub fn forbidden(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::Forbidden, reason)
    }

    pub fn not_found(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(code, message)
    }

    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Duplicate-record conflict, mapped to 409.
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::DuplicateRecord, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::InternalError, "An internal error occurred", message)
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// Log with severity keyed off the status class: 5xx loudly, denials
    /// quietly.
    fn log(&self) {
        let status = self.http_status();
        if status.is_server_error() {
            error!(
                code = %self.code,
                category = self.code.category(),
                user_message = %self.user_message,
                internal_message = ?self.internal_message,
                source = ?self.source,
                "request failed"
            );
        } else if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            warn!(
                code = %self.code,
                user_message = %self.user_message,
                "request denied"
            );
        } else {
            debug!(code = %self.code, user_message = %self.user_message, "request rejected");
        }
    }
}

/// API error envelope: `{ success: false, message }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl From<&TaskboardError> for ErrorResponse {
    fn from(error: &TaskboardError) -> Self {
        Self {
            success: false,
            message: error.user_message.to_string(),
        }
    }
}

impl IntoResponse for TaskboardError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.http_status();
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<sqlx::Error> for TaskboardError {
    fn from(error: sqlx::Error) -> Self {
        let (code, user_msg) = match &error {
            sqlx::Error::RowNotFound => {
                (ErrorCode::RecordNotFound, "The requested record was not found")
            }
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::with_internal(
                        ErrorCode::DuplicateRecord,
                        "A record with this identifier already exists",
                        db_err.to_string(),
                    )
                    .with_source(error);
                }
                (ErrorCode::DatabaseError, "A database error occurred")
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => (
                ErrorCode::DatabaseConnectionFailed,
                "Unable to connect to the database",
            ),
            _ => (ErrorCode::DatabaseError, "A database error occurred"),
        };

        Self::with_internal(code, user_msg, error.to_string()).with_source(error)
    }
}

impl From<serde_json::Error> for TaskboardError {
    fn from(error: serde_json::Error) -> Self {
        Self::with_internal(
            ErrorCode::SerializationError,
            "Failed to process JSON data",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<config::ConfigError> for TaskboardError {
    fn from(error: config::ConfigError) -> Self {
        Self::with_internal(
            ErrorCode::ConfigurationError,
            "Configuration error occurred",
            error.to_string(),
        )
    }
}

impl From<anyhow::Error> for TaskboardError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<TaskboardError>() {
            Ok(err) => err,
            Err(error) => Self::with_internal(
                ErrorCode::InternalError,
                "An internal error occurred",
                error.to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::TaskNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::DuplicateRecord.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::ValidationError.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn forbidden_carries_reason_verbatim() {
        let err = TaskboardError::forbidden("Viewers cannot create users");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.user_message(), "Viewers cannot create users");
    }

    #[test]
    fn conflict_is_a_duplicate_record() {
        let err = TaskboardError::conflict("A record with this identifier already exists");
        assert_eq!(err.code(), ErrorCode::DuplicateRecord);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_message_stays_out_of_response() {
        let err = TaskboardError::with_internal(
            ErrorCode::DatabaseError,
            "A database error occurred",
            "connection refused: localhost:5432",
        );
        let response = ErrorResponse::from(&err);
        assert!(!response.success);
        assert_eq!(response.message, "A database error occurred");
    }

    #[test]
    fn error_response_serialization() {
        let err = TaskboardError::not_found(ErrorCode::TaskNotFound, "Task not found");
        let json = serde_json::to_string(&ErrorResponse::from(&err)).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("Task not found"));
    }
}
