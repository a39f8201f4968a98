//! Error types for the conversation core.

use thiserror::Error;

use super::ChatId;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// SQLite primary and extended result codes that signal lock contention.
const TRANSIENT_SQLITE_CODES: &[&str] = &["5", "6", "261", "262", "517", "773"];

/// Main error type for the conversation core
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("service temporarily unavailable")]
    ServiceUnavailable,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ChatError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for an arbitrary resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Missing and invisible chats share this error so that outsiders
    /// cannot tell the two apart.
    pub fn chat_not_found(id: ChatId) -> Self {
        Self::not_found(format!("chat {id}"))
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Whether retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(error) => is_transient_database_error(error),
            _ => false,
        }
    }

    /// Whether the underlying failure is a uniqueness constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

fn is_transient_database_error(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| TRANSIENT_SQLITE_CODES.contains(&&*code)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_not_found_names_the_chat() {
        let error = ChatError::chat_not_found(42);
        assert_eq!(error.to_string(), "chat 42 not found");
    }

    #[test]
    fn pool_timeouts_are_transient() {
        assert!(ChatError::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!ChatError::Database(sqlx::Error::RowNotFound).is_transient());
        assert!(!ChatError::validation("bad").is_transient());
        assert!(!ChatError::ServiceUnavailable.is_transient());
    }
}
