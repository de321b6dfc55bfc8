use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{parse_limit, ApiError, ApiResult, AppState};
use crate::auth::AuthUser;
use crate::models::{CommentQuery, CreateCommentRequest};

/// GET /comments?foodId=...&limit=...
pub async fn list_comments(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<CommentQuery>, ApiError>,
) -> ApiResult<Json<Value>> {
    let food_id = query.food_id.unwrap_or_default();
    let limit = parse_limit(query.limit.as_deref());

    let comments = state.comment_service.list_comments(&food_id, limit).await?;
    Ok(Json(json!({ "ok": true, "comments": comments })))
}

/// POST /comments { foodId, text, replyTo? }
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(request), _): WithRejection<Json<CreateCommentRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let comment = state.comment_service.create_comment(&user, request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "comment": comment }))))
}

/// DELETE /comments/:id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(comment_id): Path<String>,
) -> ApiResult<Json<Value>> {
    // Ids that are not UUIDs cannot name a stored comment
    let comment_id = Uuid::parse_str(comment_id.trim()).map_err(|_| ApiError::NotFound)?;

    state.comment_service.delete_comment(&user, comment_id).await?;
    Ok(Json(json!({ "ok": true })))
}
