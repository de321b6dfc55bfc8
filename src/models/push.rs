use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of registration tokens in one multicast
pub const MAX_MULTICAST_TOKENS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushContent {
    pub title: String,
    pub body: String,
}

/// One message addressed to many device tokens
#[derive(Debug, Clone, PartialEq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: PushContent,
    pub data: BTreeMap<String, String>,
}

/// Messaging error codes, named after the `messaging/...` codes clients see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagingErrorCode {
    RegistrationTokenNotRegistered,
    InvalidArgument,
    InvalidRegistrationToken,
    MismatchedCredential,
    MessageRateExceeded,
    ServerUnavailable,
    InternalError,
    ThirdPartyAuthError,
    Unknown(String),
}

impl MessagingErrorCode {
    /// Map an FCM v1 `errorCode` detail, falling back to the canonical
    /// status of the error envelope.
    pub fn from_fcm(error_code: Option<&str>, status: Option<&str>) -> Self {
        match error_code.or(status).unwrap_or_default() {
            "UNREGISTERED" | "NOT_FOUND" => MessagingErrorCode::RegistrationTokenNotRegistered,
            "INVALID_ARGUMENT" => MessagingErrorCode::InvalidArgument,
            "SENDER_ID_MISMATCH" | "PERMISSION_DENIED" => MessagingErrorCode::MismatchedCredential,
            "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => MessagingErrorCode::MessageRateExceeded,
            "UNAVAILABLE" => MessagingErrorCode::ServerUnavailable,
            "INTERNAL" => MessagingErrorCode::InternalError,
            "THIRD_PARTY_AUTH_ERROR" | "UNAUTHENTICATED" => MessagingErrorCode::ThirdPartyAuthError,
            other => MessagingErrorCode::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MessagingErrorCode::RegistrationTokenNotRegistered => "messaging/registration-token-not-registered",
            MessagingErrorCode::InvalidArgument => "messaging/invalid-argument",
            MessagingErrorCode::InvalidRegistrationToken => "messaging/invalid-registration-token",
            MessagingErrorCode::MismatchedCredential => "messaging/mismatched-credential",
            MessagingErrorCode::MessageRateExceeded => "messaging/message-rate-exceeded",
            MessagingErrorCode::ServerUnavailable => "messaging/server-unavailable",
            MessagingErrorCode::InternalError => "messaging/internal-error",
            MessagingErrorCode::ThirdPartyAuthError => "messaging/third-party-auth-error",
            MessagingErrorCode::Unknown(_) => "messaging/unknown-error",
        }
    }

    /// Whether the token that produced this error should be forgotten
    pub fn is_stale_token(&self) -> bool {
        matches!(
            self,
            MessagingErrorCode::RegistrationTokenNotRegistered
                | MessagingErrorCode::InvalidArgument
                | MessagingErrorCode::InvalidRegistrationToken
        )
    }
}

impl std::fmt::Display for MessagingErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessagingError {
    pub code: MessagingErrorCode,
    pub message: String,
}

impl std::fmt::Display for MessagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Outcome of sending to a single token
#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    pub message_id: Option<String>,
    pub error: Option<MessagingError>,
}

impl SendResponse {
    pub fn success(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failure(code: MessagingErrorCode, message: impl Into<String>) -> Self {
        Self {
            message_id: None,
            error: Some(MessagingError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-token responses, in the order of the multicast's tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResponse {
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }
}
