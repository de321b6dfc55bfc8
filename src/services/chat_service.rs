use anyhow::Context;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::config::ChatConfig;
use crate::models::{ChatReply, ChatRequest};

const SYSTEM_PROMPT: &str = "You are a friendly nutrition assistant inside a food-tracking app. \
Answer briefly and practically. Use the user profile and food details below when they are provided.";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("message required")]
    MissingMessage,
    #[error("chat is not configured")]
    Unavailable,
    #[error("chat upstream failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Forwards chat messages with user/food context to an OpenAI-compatible
/// chat completions API
#[derive(Debug, Clone)]
pub struct ChatService {
    client: Client,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(config: ChatConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Messages sent upstream: system prompt, optional context, the most
    /// recent history turns, then the user's message.
    pub fn build_messages(&self, request: &ChatRequest) -> Vec<Value> {
        let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];

        if let Some(context) = context_block(request) {
            messages.push(json!({ "role": "system", "content": context }));
        }

        let skip = request.history.len().saturating_sub(self.config.max_history);
        for turn in request.history.iter().skip(skip) {
            if turn.content.trim().is_empty() {
                continue;
            }
            messages.push(json!({ "role": turn.role.as_str(), "content": turn.content }));
        }

        messages.push(json!({ "role": "user", "content": request.message.trim() }));
        messages
    }

    pub async fn reply(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        if request.message.trim().is_empty() {
            return Err(ChatError::MissingMessage);
        }
        let Some(api_key) = &self.config.api_key else {
            return Err(ChatError::Unavailable);
        };

        let body = json!({
            "model": self.config.model,
            "messages": self.build_messages(&request),
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Chat request failed: {}", e);
                ChatError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Chat upstream returned {} - {}", status, error_text);
            return Err(ChatError::Upstream(format!("upstream status {}", status)));
        }

        let completion = response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| ChatError::Upstream(format!("invalid upstream response: {}", e)))?;

        let reply = completion
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ChatError::Upstream("upstream returned no reply".to_string()))?;

        let model = completion.model.unwrap_or_else(|| self.config.model.clone());
        info!("Chat reply from {} ({} chars)", model, reply.chars().count());

        Ok(ChatReply { reply, model })
    }
}

fn context_block(request: &ChatRequest) -> Option<String> {
    let mut sections = Vec::new();

    if let Some(user) = request.user_context.as_ref().filter(|v| !v.is_null()) {
        sections.push(format!("User profile:\n{}", pretty(user)));
    }
    if let Some(food) = request.food_context.as_ref().filter(|v| !v.is_null()) {
        sections.push(format!("Food:\n{}", pretty(food)));
    }

    (!sections.is_empty()).then(|| sections.join("\n\n"))
}

fn pretty(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
