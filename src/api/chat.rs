use axum::{extract::State, response::Json, Extension};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use super::{ApiError, ApiResult, AppState};
use crate::auth::AuthUser;
use crate::models::ChatRequest;

/// POST /chat { message, userContext?, foodContext?, history? }
#[tracing::instrument(skip_all, fields(uid = %user.uid))]
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(request), _): WithRejection<Json<ChatRequest>, ApiError>,
) -> ApiResult<Json<Value>> {
    let reply = state.chat_service.reply(request).await?;
    Ok(Json(json!({ "ok": true, "reply": reply.reply, "model": reply.model })))
}
