//! Unified error type for the Horizons Solar backend.
//!
//! Every fallible operation in `core` returns [`Result`]. The HTTP layer turns an
//! [`Error`] into a JSON body of the form `{ "error": KIND, "message": text }` with the
//! status code given by [`Error::status_code`].

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message shared by the unknown-user and wrong-password login failures.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed, missing or negative input. User-correctable.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A unique key (username, email) is already taken.
    #[error("Conflict: {message}")]
    Conflict {
        /// Which key collided
        message: String,
    },

    /// Unknown username or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The referenced user does not exist.
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// Requested user ID
        user_id: i64,
    },

    /// Totals recalculation found no `energy_data` row for the user.
    #[error("Base energy data not found for user {user_id}")]
    MissingBaseData {
        /// User whose summary row is missing
        user_id: i64,
    },

    /// Totals update matched zero rows (row removed between read and write).
    #[error("Totals update affected no rows for user {user_id}")]
    UpdateNoOp {
        /// User whose summary row vanished
        user_id: i64,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Underlying persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Password hashing or verification failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// A blocking task (password hashing) panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// I/O failure (binding the listener, reading files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convenience constructor for validation failures.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for unique-key conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Stable machine-readable error kind used in response bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound { .. } => "NOT_FOUND",
            Self::MissingBaseData { .. } | Self::UpdateNoOp { .. } => "CONSISTENCY_ERROR",
            Self::Database(_) => "DB_ERROR",
            Self::Config { .. } | Self::PasswordHash(_) | Self::Task(_) | Self::Io(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MissingBaseData { .. }
            | Self::UpdateNoOp { .. }
            | Self::Database(_)
            | Self::Config { .. }
            | Self::PasswordHash(_)
            | Self::Task(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for the recalculation failures that leave `energy_data` out of sync.
    #[must_use]
    pub const fn is_consistency_violation(&self) -> bool {
        matches!(self, Self::MissingBaseData { .. } | Self::UpdateNoOp { .. })
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
