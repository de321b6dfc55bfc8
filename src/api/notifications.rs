use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use super::{parse_limit, ApiError, ApiResult, AppState};
use crate::auth::AuthUser;
use crate::models::{CreateNotificationRequest, NotificationQuery, RegisterTokenRequest, UpdateProfileRequest};

/// Create a notification for another user and trigger its push
pub async fn create_notification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(recipient): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<CreateNotificationRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let notification = state
        .notification_service
        .create_notification(&user, &recipient, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "notification": notification })),
    ))
}

/// Notifications addressed to the caller
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<NotificationQuery>, ApiError>,
) -> ApiResult<Json<Value>> {
    let limit = parse_limit(query.limit.as_deref());
    let notifications = state.notification_service.list_notifications(&user, limit).await?;

    Ok(Json(json!({ "ok": true, "notifications": notifications })))
}

pub async fn register_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterTokenRequest>, ApiError>,
) -> ApiResult<Json<Value>> {
    let token = state.notification_service.register_token(&user, request).await?;
    Ok(Json(json!({ "ok": true, "token": token })))
}

pub async fn unregister_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(token): Path<String>,
) -> ApiResult<Json<Value>> {
    if !state.notification_service.unregister_token(&user, &token).await? {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "ok": true })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> ApiResult<Json<Value>> {
    let profile = state.notification_service.update_profile(&user, request).await?;
    Ok(Json(json!({ "ok": true, "profile": profile })))
}
