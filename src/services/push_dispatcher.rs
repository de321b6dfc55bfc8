use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::{MulticastMessage, Notification, PushContent, MAX_MULTICAST_TOKENS};
use crate::repositories::DeviceTokenRepository;
use crate::services::PushSender;

/// Totals of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub tokens: usize,
    pub success: usize,
    pub failure: usize,
    pub removed: u64,
    pub failed_chunks: usize,
}

/// Fans a stored notification out to every device of its recipient and
/// prunes tokens the push service rejects.
#[derive(Clone)]
pub struct PushDispatcher {
    tokens: Arc<dyn DeviceTokenRepository>,
    sender: Arc<dyn PushSender>,
    chunk_size: usize,
}

impl PushDispatcher {
    pub fn new(tokens: Arc<dyn DeviceTokenRepository>, sender: Arc<dyn PushSender>) -> Self {
        Self {
            tokens,
            sender,
            chunk_size: MAX_MULTICAST_TOKENS,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_MULTICAST_TOKENS);
        self
    }

    /// Never fails; problems are logged and reflected in the summary
    pub async fn dispatch(&self, notification: &Notification) -> DispatchSummary {
        match self.try_dispatch(notification).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(
                    "Push dispatch for notification {} (user {}) failed: {:#}",
                    notification.id, notification.user_id, e
                );
                DispatchSummary::default()
            }
        }
    }

    async fn try_dispatch(&self, notification: &Notification) -> Result<DispatchSummary> {
        let user_id = notification.user_id.as_str();
        let tokens: Vec<String> = self
            .tokens
            .list_tokens(user_id)
            .await?
            .into_iter()
            .filter(|token| !token.is_empty())
            .collect();

        let mut summary = DispatchSummary {
            tokens: tokens.len(),
            ..Default::default()
        };

        if tokens.is_empty() {
            info!("No FCM tokens for user {}", user_id);
            return Ok(summary);
        }

        let content = push_content(notification);
        let data = push_data(notification);

        for chunk in tokens.chunks(self.chunk_size) {
            let message = MulticastMessage {
                tokens: chunk.to_vec(),
                notification: content.clone(),
                data: data.clone(),
            };

            let batch = match self.sender.send_multicast(&message).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!("FCM chunk send error: {:#}", e);
                    summary.failed_chunks += 1;
                    continue;
                }
            };

            summary.success += batch.success_count();
            summary.failure += batch.failure_count();

            if batch.failure_count() == 0 {
                continue;
            }

            let mut stale = Vec::new();
            for (index, response) in batch.responses.iter().enumerate() {
                let Some(err) = &response.error else {
                    continue;
                };

                if err.code.is_stale_token() {
                    if let Some(token) = chunk.get(index) {
                        info!("Deleting invalid token {} for user {}", token, user_id);
                        stale.push(token.clone());
                    }
                } else {
                    warn!("FCM error for token index={}: {}", index, err);
                }
            }

            if stale.is_empty() {
                continue;
            }

            match self.tokens.remove_many(user_id, &stale).await {
                Ok(removed) => summary.removed += removed,
                Err(e) => {
                    error!("FCM token cleanup error: {:#}", e);
                    summary.failed_chunks += 1;
                }
            }
        }

        info!(
            "Push sent: tokens={}, success={}, failure={}",
            summary.tokens, summary.success, summary.failure
        );

        Ok(summary)
    }
}

/// Visible title and body. Only absent values fall back to per-kind
/// defaults; a stored title or body is sent as is.
pub fn push_content(notification: &Notification) -> PushContent {
    let kind = notification.kind();
    let title = notification
        .title
        .clone()
        .unwrap_or_else(|| kind.default_title().to_string());
    let body = notification
        .body
        .clone()
        .unwrap_or_else(|| kind.default_body(notification.actor_name.as_deref()));

    PushContent { title, body }
}

/// Data payload; every value is a string, missing ids become ""
pub fn push_data(notification: &Notification) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert("type".to_string(), notification.kind().as_str().to_string());
    data.insert("actorId".to_string(), notification.actor_id.clone().unwrap_or_default());
    data.insert("foodId".to_string(), notification.food_id.clone().unwrap_or_default());
    data
}
