// Storage ports and their adapters

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Comment, DeviceToken, NewComment, NewNotification, Notification, UpdateProfileRequest, UserProfile,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgCommentRepository, PgDeviceTokenRepository, PgNotificationRepository, PgUserDirectory};

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: NewComment) -> Result<Comment>;

    async fn get(&self, id: Uuid) -> Result<Option<Comment>>;

    /// Comments on a food item, newest first
    async fn list_by_food(&self, food_id: &str, limit: i64) -> Result<Vec<Comment>>;

    /// Returns whether a comment was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: NewNotification) -> Result<Notification>;

    /// Notifications addressed to `user_id`, newest first
    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<Notification>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeviceTokenRepository: Send + Sync {
    /// Register a token; registering an existing token only refreshes it
    async fn upsert(&self, user_id: &str, token: &str, platform: Option<String>) -> Result<DeviceToken>;

    async fn list_tokens(&self, user_id: &str) -> Result<Vec<String>>;

    async fn remove(&self, user_id: &str, token: &str) -> Result<bool>;

    /// Remove several tokens of one user atomically, returning how many existed
    async fn remove_many(&self, user_id: &str, tokens: &[String]) -> Result<u64>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>>;

    async fn upsert_profile(&self, uid: &str, update: UpdateProfileRequest) -> Result<UserProfile>;
}
