use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::auth::AuthUser;
use crate::models::{
    CreateNotificationRequest, DeviceToken, NewNotification, Notification, NotificationKind, RegisterTokenRequest,
    UpdateProfileRequest, UserProfile,
};
use crate::repositories::{DeviceTokenRepository, NotificationRepository, UserDirectory};
use crate::services::NotificationEvents;

pub const MAX_NOTIFICATION_LIMIT: i64 = 200;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("userId required")]
    MissingRecipient,
    #[error("token required")]
    MissingToken,
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Notifications, device registrations and profiles of the calling user
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    tokens: Arc<dyn DeviceTokenRepository>,
    users: Arc<dyn UserDirectory>,
    events: NotificationEvents,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        tokens: Arc<dyn DeviceTokenRepository>,
        users: Arc<dyn UserDirectory>,
        events: NotificationEvents,
    ) -> Self {
        Self {
            notifications,
            tokens,
            users,
            events,
        }
    }

    /// Store a notification for `recipient` on behalf of `actor` and queue
    /// its push fan-out.
    pub async fn create_notification(
        &self,
        actor: &AuthUser,
        recipient: &str,
        request: CreateNotificationRequest,
    ) -> Result<Notification, NotificationError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(NotificationError::MissingRecipient);
        }

        let actor_name = match trimmed(request.actor_name) {
            Some(name) => Some(name),
            None => self
                .users
                .get_profile(&actor.uid)
                .await
                .ok()
                .flatten()
                .and_then(|profile| profile.author_name()),
        };

        let notification = self
            .notifications
            .insert(NewNotification {
                user_id: recipient.to_string(),
                kind: NotificationKind::from(request.kind.as_deref().unwrap_or_default()),
                title: trimmed(request.title),
                body: trimmed(request.body),
                actor_id: Some(actor.uid.clone()),
                actor_name,
                food_id: trimmed(request.food_id),
            })
            .await?;

        info!(
            "Created {} notification {} for user {}",
            notification.kind, notification.id, notification.user_id
        );
        self.events.publish(notification.clone());

        Ok(notification)
    }

    pub async fn list_notifications(&self, user: &AuthUser, limit: i64) -> Result<Vec<Notification>, NotificationError> {
        let limit = limit.clamp(1, MAX_NOTIFICATION_LIMIT);
        Ok(self.notifications.list_for_user(&user.uid, limit).await?)
    }

    pub async fn register_token(
        &self,
        user: &AuthUser,
        request: RegisterTokenRequest,
    ) -> Result<DeviceToken, NotificationError> {
        let token = request.token.trim();
        if token.is_empty() {
            return Err(NotificationError::MissingToken);
        }

        let registered = self
            .tokens
            .upsert(&user.uid, token, trimmed(request.platform))
            .await?;
        info!("Registered device token for user {}", user.uid);
        Ok(registered)
    }

    /// Returns whether the token was registered
    pub async fn unregister_token(&self, user: &AuthUser, token: &str) -> Result<bool, NotificationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(NotificationError::MissingToken);
        }

        Ok(self.tokens.remove(&user.uid, token).await?)
    }

    pub async fn update_profile(&self, user: &AuthUser, update: UpdateProfileRequest) -> Result<UserProfile> {
        self.users
            .upsert_profile(
                &user.uid,
                UpdateProfileRequest {
                    display_name: trimmed(update.display_name),
                    email: trimmed(update.email),
                },
            )
            .await
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;
    use crate::repositories::MemoryStore;
    use assert_matches::assert_matches;

    fn user(uid: &str) -> AuthUser {
        AuthUser::from_claims(Claims {
            sub: uid.to_string(),
            ..Default::default()
        })
    }

    fn service(store: &MemoryStore, events: NotificationEvents) -> NotificationService {
        NotificationService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            events,
        )
    }

    #[tokio::test]
    async fn create_stores_and_publishes() {
        let store = MemoryStore::new();
        let (events, mut rx) = NotificationEvents::channel(4);
        let notifications = service(&store, events);

        store
            .upsert_profile(
                "actor",
                UpdateProfileRequest {
                    display_name: Some("Minh".to_string()),
                    email: None,
                },
            )
            .await
            .unwrap();

        let created = notifications
            .create_notification(
                &user("actor"),
                "owner",
                CreateNotificationRequest {
                    kind: Some("like".to_string()),
                    food_id: Some(" pho-1 ".to_string()),
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(created.kind, "like");
        assert_eq!(created.actor_id.as_deref(), Some("actor"));
        assert_eq!(created.actor_name.as_deref(), Some("Minh"));
        assert_eq!(created.food_id.as_deref(), Some("pho-1"));
        assert_eq!(created.title, None);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.notification.id, created.id);

        let listed = notifications.list_notifications(&user("owner"), 10).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn blank_recipient_or_token_is_rejected() {
        let store = MemoryStore::new();
        let notifications = service(&store, NotificationEvents::disabled());

        assert_matches!(
            notifications
                .create_notification(&user("a"), " ", CreateNotificationRequest::default())
                .await,
            Err(NotificationError::MissingRecipient)
        );
        assert_matches!(
            notifications
                .register_token(&user("a"), RegisterTokenRequest::default())
                .await,
            Err(NotificationError::MissingToken)
        );
    }

    #[tokio::test]
    async fn register_and_unregister_tokens() {
        let store = MemoryStore::new();
        let notifications = service(&store, NotificationEvents::disabled());

        notifications
            .register_token(
                &user("u1"),
                RegisterTokenRequest {
                    token: " device-1 ".to_string(),
                    platform: Some("ios".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.list_tokens("u1").await.unwrap(), vec!["device-1"]);
        assert!(notifications.unregister_token(&user("u1"), "device-1").await.unwrap());
        assert!(!notifications.unregister_token(&user("u1"), "device-1").await.unwrap());
    }
}
