use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};
use tutorline_auth::AuthError;
use tutorline_chats::ChatError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(error: ChatError) -> Self {
        let status = match &error {
            ChatError::Validation { .. } => StatusCode::BAD_REQUEST,
            ChatError::NotFound { .. } => StatusCode::NOT_FOUND,
            ChatError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ChatError::Conflict { .. } => StatusCode::CONFLICT,
            ChatError::InvalidOperation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ChatError::ServiceUnavailable => {
                warn!("chat storage unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ChatError::Database(db) => {
                error!(error = ?db, "chat database error");
                return Self::internal_server_error("internal server error");
            }
        };
        Self::new(status, error.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession
            | AuthError::UserNotFound => Self::unauthorized(error.to_string()),
            AuthError::UserExists => Self::bad_request(error.to_string()),
            AuthError::Database(db) => {
                error!(error = ?db, "auth database error");
                Self::internal_server_error("internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_errors_map_to_http_statuses() {
        let cases = [
            (ChatError::validation("bad"), StatusCode::BAD_REQUEST),
            (ChatError::chat_not_found(3), StatusCode::NOT_FOUND),
            (ChatError::forbidden("no"), StatusCode::FORBIDDEN),
            (ChatError::conflict("race"), StatusCode::CONFLICT),
            (
                ChatError::invalid_operation("direct"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ChatError::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status, status);
        }
    }

    #[test]
    fn database_errors_hide_details() {
        let error = ApiError::from(ChatError::Database(sqlx::Error::RowNotFound));
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "internal server error");
    }

    #[test]
    fn session_failures_are_unauthorized() {
        for error in [AuthError::SessionExpired, AuthError::SessionNotFound] {
            assert_eq!(ApiError::from(error).status, StatusCode::UNAUTHORIZED);
        }
    }
}
