use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub food_id: String,
    pub text: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub reply_to: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new comment; `created_at` is assigned on insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub food_id: String,
    pub text: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub reply_to: Option<String>,
}

/// Raw request body. Fields are loosely typed because clients send ids as
/// numbers as well as strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub food_id: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub reply_to: Option<Value>,
}

impl CreateCommentRequest {
    pub fn food_id(&self) -> Option<String> {
        coerce_trimmed(self.food_id.as_ref())
    }

    pub fn text(&self) -> Option<String> {
        coerce_trimmed(self.text.as_ref())
    }

    pub fn reply_to(&self) -> Option<String> {
        coerce_trimmed(self.reply_to.as_ref())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub food_id: Option<String>,
    pub limit: Option<String>,
}

/// Scalar JSON value as a trimmed, non-empty string
pub fn coerce_trimmed(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return None,
    };

    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
