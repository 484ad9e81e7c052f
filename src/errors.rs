//! Unified error type for the attendance service.
//!
//! Every core operation returns [`Result`]. The API layer maps each variant to an
//! HTTP status in `api::error`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A referenced row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Mutation attempted against a finalized session.
    #[error("Session {session_id} is finalized")]
    SessionFinalized { session_id: i64 },

    /// A uniqueness constraint rejected the write.
    #[error("Duplicate: {message}")]
    Duplicate { message: String },

    /// The current time is outside the session's marking window.
    #[error("Outside allowed marking window for session {session_id}")]
    OutsideMarkingWindow { session_id: i64 },

    /// A self-mark was attempted within the cooldown period.
    #[error("Attendance already marked in the last 24 hours for student {student_ext_id}")]
    AlreadyMarked { student_ext_id: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Password hashing error: {message}")]
    PasswordHash { message: String },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by any displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Converts a unique-constraint violation into [`Error::Duplicate`], passing
    /// every other database error through unchanged.
    pub fn from_unique_violation(err: sea_orm::DbErr, message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => Self::Duplicate {
                message: message.into(),
            },
            _ => Self::Database(err),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
