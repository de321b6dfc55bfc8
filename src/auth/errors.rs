use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::errors::ErrorKind;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Provider-style error code reported alongside an invalid token
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AuthError::MissingAuthHeader | AuthError::InvalidAuthHeaderFormat => None,
            AuthError::TokenExpired => Some("auth/id-token-expired"),
            AuthError::InvalidToken(_) => Some("auth/argument-error"),
            AuthError::Jwt(err) => Some(match err.kind() {
                ErrorKind::ExpiredSignature => "auth/id-token-expired",
                ErrorKind::InvalidSignature => "auth/invalid-signature",
                ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => "auth/invalid-claims",
                _ => "auth/argument-error",
            }),
        }
    }

    fn is_missing_token(&self) -> bool {
        matches!(self, AuthError::MissingAuthHeader | AuthError::InvalidAuthHeaderFormat)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = if self.is_missing_token() {
            json!({ "error": "Unauthorized - missing token" })
        } else {
            json!({
                "error": "Unauthorized - invalid token",
                "code": self.code(),
                "message": self.to_string(),
            })
        };

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
