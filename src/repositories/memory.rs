use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CommentRepository, DeviceTokenRepository, NotificationRepository, UserDirectory};
use crate::models::{
    Comment, DeviceToken, NewComment, NewNotification, Notification, UpdateProfileRequest, UserProfile,
};

#[derive(Debug, Default)]
struct Tables {
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
    tokens: Vec<DeviceToken>,
    users: HashMap<String, UserProfile>,
}

/// Process-local store implementing every repository port.
///
/// Used by the test suite and for running the API without a database.
/// Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; among equal timestamps the later insert wins
fn newest_first<T: Clone>(rows: impl DoubleEndedIterator<Item = T>, key: impl Fn(&T) -> chrono::DateTime<Utc>, limit: i64) -> Vec<T> {
    let mut rows: Vec<T> = rows.rev().collect();
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    rows.truncate(limit.max(0) as usize);
    rows
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let created = Comment {
            id: Uuid::new_v4(),
            food_id: comment.food_id,
            text: comment.text,
            author_id: comment.author_id,
            author_name: comment.author_name,
            reply_to: comment.reply_to,
            created_at: Utc::now(),
        };

        self.tables.write().await.comments.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_food(&self, food_id: &str, limit: i64) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        let matching: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.food_id == food_id)
            .cloned()
            .collect();

        Ok(newest_first(matching.into_iter(), |c| c.created_at, limit))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: NewNotification) -> Result<Notification> {
        let created = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            body: notification.body,
            actor_id: notification.actor_id,
            actor_name: notification.actor_name,
            food_id: notification.food_id,
            created_at: Utc::now(),
        };

        self.tables.write().await.notifications.push(created.clone());
        Ok(created)
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        let matching: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();

        Ok(newest_first(matching.into_iter(), |n| n.created_at, limit))
    }
}

#[async_trait]
impl DeviceTokenRepository for MemoryStore {
    async fn upsert(&self, user_id: &str, token: &str, platform: Option<String>) -> Result<DeviceToken> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables
            .tokens
            .iter_mut()
            .find(|t| t.user_id == user_id && t.token == token)
        {
            if platform.is_some() {
                existing.platform = platform;
            }
            return Ok(existing.clone());
        }

        let created = DeviceToken {
            user_id: user_id.to_string(),
            token: token.to_string(),
            platform,
            created_at: Utc::now(),
        };
        tables.tokens.push(created.clone());
        Ok(created)
    }

    async fn list_tokens(&self, user_id: &str) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.token.clone())
            .collect())
    }

    async fn remove(&self, user_id: &str, token: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables.tokens.retain(|t| !(t.user_id == user_id && t.token == token));
        Ok(tables.tokens.len() < before)
    }

    async fn remove_many(&self, user_id: &str, tokens: &[String]) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.tokens.len();
        tables
            .tokens
            .retain(|t| !(t.user_id == user_id && tokens.contains(&t.token)));
        Ok((before - tables.tokens.len()) as u64)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.tables.read().await.users.get(uid).cloned())
    }

    async fn upsert_profile(&self, uid: &str, update: UpdateProfileRequest) -> Result<UserProfile> {
        let mut tables = self.tables.write().await;
        let profile = tables.users.entry(uid.to_string()).or_insert_with(|| UserProfile {
            id: uid.to_string(),
            display_name: None,
            email: None,
            updated_at: Utc::now(),
        });

        if update.display_name.is_some() {
            profile.display_name = update.display_name;
        }
        if update.email.is_some() {
            profile.email = update.email;
        }
        profile.updated_at = Utc::now();

        Ok(profile.clone())
    }
}
