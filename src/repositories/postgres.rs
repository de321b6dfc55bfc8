use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CommentRepository, DeviceTokenRepository, NotificationRepository, UserDirectory};
use crate::models::{
    Comment, DeviceToken, NewComment, NewNotification, Notification, UpdateProfileRequest, UserProfile,
};

const COMMENT_COLUMNS: &str = "id, food_id, text, author_id, author_name, reply_to, created_at";
const NOTIFICATION_COLUMNS: &str =
    "id, user_id, kind, title, body, actor_id, actor_name, food_id, created_at";

#[derive(Debug, Clone)]
pub struct PgCommentRepository {
    db: PgPool,
}

impl PgCommentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn insert(&self, comment: NewComment) -> Result<Comment> {
        let created = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (id, food_id, text, author_id, author_name, reply_to, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&comment.food_id)
        .bind(&comment.text)
        .bind(&comment.author_id)
        .bind(&comment.author_name)
        .bind(&comment.reply_to)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(comment)
    }

    async fn list_by_food(&self, food_id: &str, limit: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments
             WHERE food_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(food_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(comments)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PgNotificationRepository {
    db: PgPool,
}

impl PgNotificationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, notification: NewNotification) -> Result<Notification> {
        let created = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications (id, user_id, kind, title, body, actor_id, actor_name, food_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.actor_id)
        .bind(&notification.actor_name)
        .bind(&notification.food_id)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(created)
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }
}

#[derive(Debug, Clone)]
pub struct PgDeviceTokenRepository {
    db: PgPool,
}

impl PgDeviceTokenRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeviceTokenRepository for PgDeviceTokenRepository {
    async fn upsert(&self, user_id: &str, token: &str, platform: Option<String>) -> Result<DeviceToken> {
        let device_token = sqlx::query_as::<_, DeviceToken>(
            "INSERT INTO fcm_tokens (user_id, token, platform, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, token)
             DO UPDATE SET platform = COALESCE(EXCLUDED.platform, fcm_tokens.platform)
             RETURNING user_id, token, platform, created_at",
        )
        .bind(user_id)
        .bind(token)
        .bind(platform)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(device_token)
    }

    async fn list_tokens(&self, user_id: &str) -> Result<Vec<String>> {
        let tokens = sqlx::query_scalar::<_, String>(
            "SELECT token FROM fcm_tokens WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tokens)
    }

    async fn remove(&self, user_id: &str, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM fcm_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_many(&self, user_id: &str, tokens: &[String]) -> Result<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM fcm_tokens WHERE user_id = $1 AND token = ANY($2)")
            .bind(user_id)
            .bind(tokens)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    db: PgPool,
}

impl PgUserDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, display_name, email, updated_at FROM users WHERE id = $1",
        )
        .bind(uid)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    async fn upsert_profile(&self, uid: &str, update: UpdateProfileRequest) -> Result<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "INSERT INTO users (id, display_name, email, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE
             SET display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                 email = COALESCE(EXCLUDED.email, users.email),
                 updated_at = EXCLUDED.updated_at
             RETURNING id, display_name, email, updated_at",
        )
        .bind(uid)
        .bind(update.display_name)
        .bind(update.email)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(profile)
    }
}
