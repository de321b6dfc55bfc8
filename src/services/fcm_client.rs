use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::FcmConfig;
use crate::models::{BatchResponse, MessagingErrorCode, MulticastMessage, SendResponse};
use crate::services::google_auth::{ServiceAccountKey, ServiceAccountTokenSource};

/// Upper bound on in-flight sends for one multicast
const MAX_CONCURRENT_SENDS: usize = 50;

/// Delivers a message to many device tokens.
///
/// Per-token delivery failures are reported inside the returned
/// [`BatchResponse`]; an `Err` means nothing could be attempted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse>;
}

pub enum FcmCredentials {
    /// Pre-minted OAuth2 access token
    Static(String),
    ServiceAccount(ServiceAccountTokenSource),
}

impl std::fmt::Debug for FcmCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FcmCredentials::Static(_) => f.write_str("Static([REDACTED])"),
            FcmCredentials::ServiceAccount(source) => std::fmt::Debug::fmt(source, f),
        }
    }
}

/// Firebase Cloud Messaging HTTP v1 client
#[derive(Debug)]
pub struct FcmClient {
    client: Client,
    base_url: String,
    project_id: String,
    credentials: FcmCredentials,
}

#[derive(Debug, Deserialize)]
struct SendSuccess {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

impl FcmClient {
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>, credentials: FcmCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            credentials,
        })
    }

    /// Build a client from configuration; `None` when push is not configured
    pub fn from_config(config: &FcmConfig) -> Result<Option<Self>> {
        if let Some(token) = &config.access_token {
            let project_id = config
                .project_id
                .clone()
                .context("FCM_PROJECT_ID is required with FCM_ACCESS_TOKEN")?;
            return Self::new(&config.base_url, project_id, FcmCredentials::Static(token.clone())).map(Some);
        }

        let Some(path) = &config.service_account_path else {
            return Ok(None);
        };

        let key = ServiceAccountKey::from_file(path)?;
        let source = ServiceAccountTokenSource::new(Client::new(), key)?;
        let project_id = config
            .project_id
            .clone()
            .or_else(|| source.project_id().map(str::to_string))
            .context("No FCM project id in configuration or service account key")?;

        Self::new(&config.base_url, project_id, FcmCredentials::ServiceAccount(source)).map(Some)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn access_token(&self) -> Result<String> {
        match &self.credentials {
            FcmCredentials::Static(token) => Ok(token.clone()),
            FcmCredentials::ServiceAccount(source) => source.access_token().await,
        }
    }

    fn request_body(token: &str, message: &MulticastMessage) -> Value {
        let title = &message.notification.title;
        let body = &message.notification.body;

        json!({
            "message": {
                "token": token,
                "notification": { "title": title, "body": body },
                "data": message.data,
                "android": {
                    "priority": "high",
                    "notification": { "sound": "default" }
                },
                "apns": {
                    "payload": {
                        "aps": {
                            "alert": { "title": title, "body": body },
                            "sound": "default"
                        }
                    }
                }
            }
        })
    }

    async fn send_one(&self, token: &str, message: &MulticastMessage, access_token: &str) -> SendResponse {
        let url = format!("{}/v1/projects/{}/messages:send", self.base_url, self.project_id);

        let response = match self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&Self::request_body(token, message))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return SendResponse::failure(
                    MessagingErrorCode::Unknown("network-error".to_string()),
                    e.to_string(),
                )
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<SendSuccess>().await {
                Ok(sent) => SendResponse::success(sent.name),
                Err(e) => SendResponse::failure(MessagingErrorCode::InternalError, e.to_string()),
            };
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => {
                let error_code = envelope.error.details.iter().find_map(|d| d.error_code.as_deref());
                let code = MessagingErrorCode::from_fcm(error_code, envelope.error.status.as_deref());
                SendResponse::failure(code, envelope.error.message)
            }
            Err(_) => SendResponse::failure(
                MessagingErrorCode::Unknown(status.as_u16().to_string()),
                format!("Unexpected FCM response {}: {}", status, text),
            ),
        }
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        let access_token = self
            .access_token()
            .await
            .context("Failed to obtain FCM access token")?;

        let sends: Vec<_> = message
            .tokens
            .iter()
            .map(|token| self.send_one(token, message, &access_token))
            .collect();

        // `buffered` keeps responses in token order
        let responses: Vec<SendResponse> = stream::iter(sends)
            .buffered(MAX_CONCURRENT_SENDS)
            .collect()
            .await;

        debug!(
            "FCM multicast to {} tokens finished ({} ok)",
            responses.len(),
            responses.iter().filter(|r| r.is_success()).count()
        );

        Ok(BatchResponse { responses })
    }
}
