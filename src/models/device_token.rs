use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Push registration token of one of a user's devices
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceToken {
    pub user_id: String,
    pub token: String,
    pub platform: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterTokenRequest {
    #[serde(default)]
    pub token: String,
    pub platform: Option<String>,
}
