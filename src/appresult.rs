use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::ConnectionStatus;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cannot request to join your own project")]
    SelfRequest,

    #[error("a request for this project already exists")]
    DuplicateRequest,

    #[error("only the project owner may do that")]
    Forbidden,

    #[error("connection is already {0}")]
    InvalidTransition(ConnectionStatus),

    #[error("no approved connection between these users")]
    Unauthorized,

    #[error("message content is empty")]
    EmptyContent,

    #[error("cannot send a message to yourself")]
    SelfMessage,

    #[error("email is already registered")]
    EmailTaken,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store did not respond in time")]
    Timeout,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            NotFound(_) => StatusCode::NOT_FOUND,
            SelfRequest | EmptyContent | SelfMessage | InvalidInput(_) => StatusCode::BAD_REQUEST,
            Forbidden | Unauthorized => StatusCode::FORBIDDEN,
            DuplicateRequest | InvalidTransition(_) | EmailTaken => StatusCode::CONFLICT,
            Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Database(_) | Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable name, sent as the `error` field.
    pub fn kind(&self) -> &'static str {
        use AppError::*;
        match self {
            NotFound(_) => "not_found",
            SelfRequest => "self_request",
            DuplicateRequest => "duplicate_request",
            Forbidden => "forbidden",
            InvalidTransition(_) => "invalid_transition",
            Unauthorized => "unauthorized",
            EmptyContent => "empty_content",
            SelfMessage => "self_message",
            EmailTaken => "email_taken",
            InvalidInput(_) => "invalid_input",
            Timeout => "timeout",
            Database(_) | Internal(_) => "internal",
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::Timeout,
            err => Self::Database(err),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (
            status,
            Json(json!({
                "error": self.kind(),
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_map_to_rest_codes() {
        assert_eq!(AppError::NotFound("project").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::SelfRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateRequest.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InvalidTransition(ConnectionStatus::Approved).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn messaging_errors_map_to_rest_codes() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::EmptyContent.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::SelfMessage.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn pool_timeout_becomes_timeout() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Timeout));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn invalid_transition_names_current_status() {
        let err = AppError::InvalidTransition(ConnectionStatus::Denied);
        assert_eq!(err.to_string(), "connection is already denied");
    }
}
