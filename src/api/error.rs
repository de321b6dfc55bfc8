use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{ChatError, CommentError, NotificationError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not_found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Unavailable(&'static str),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!({ "error": "not_found" })),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "error": "forbidden" })),
            ApiError::PayloadTooLarge(message) => (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": message })),
            ApiError::Unavailable(what) => (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": what })),
            ApiError::Upstream(details) => {
                tracing::error!("Upstream request failed: {}", details);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "upstream_error", "details": details }),
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "server_error", "details": format!("{:#}", err) }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::MissingFoodId | CommentError::MissingFields => ApiError::BadRequest(err.to_string()),
            CommentError::NotFound => ApiError::NotFound,
            CommentError::Forbidden => ApiError::Forbidden,
            CommentError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::MissingRecipient | NotificationError::MissingToken => {
                ApiError::BadRequest(err.to_string())
            }
            NotificationError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingMessage => ApiError::BadRequest(err.to_string()),
            ChatError::Unavailable => ApiError::Unavailable("chat_unavailable"),
            ChatError::Upstream(details) => ApiError::Upstream(details),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        // Bodies over the configured limit keep their 413
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
