use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

const FALLBACK_ACTOR: &str = "Ai đó";

/// Activity notification addressed to a user.
///
/// Title and body are optional; when absent, push delivery derives them from
/// the notification kind (see [`NotificationKind::default_title`]).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub food_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        NotificationKind::from(self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    Like,
    Follow,
    General,
    Other(String),
}

impl From<&str> for NotificationKind {
    /// Blank means `general`; unknown kinds are kept verbatim
    fn from(s: &str) -> Self {
        match s.trim() {
            "" | "general" => NotificationKind::General,
            "like" => NotificationKind::Like,
            "follow" => NotificationKind::Follow,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Follow => "follow",
            NotificationKind::General => "general",
            NotificationKind::Other(other) => other,
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            NotificationKind::Like => "Bài viết được thích",
            NotificationKind::Follow => "Có người theo dõi bạn",
            _ => "Thông báo",
        }
    }

    pub fn default_body(&self, actor_name: Option<&str>) -> String {
        let actor = actor_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_ACTOR);

        match self {
            NotificationKind::Like => format!("{} đã thích bài viết của bạn", actor),
            NotificationKind::Follow => format!("{} đã theo dõi bạn", actor),
            _ => "Bạn có hoạt động mới".to_string(),
        }
    }
}

/// Validated input for a new notification
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub body: Option<String>,
    pub actor_id: Option<String>,
    pub actor_name: Option<String>,
    pub food_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub actor_name: Option<String>,
    pub food_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<String>,
}
