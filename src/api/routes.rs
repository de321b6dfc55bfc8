use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use super::chat::chat;
use super::comments::{create_comment, delete_comment, list_comments};
use super::health::health_check;
use super::notifications::{
    create_notification, list_notifications, register_token, unregister_token, update_profile,
};
use super::AppState;
use crate::auth::{cors_layer, jwt_auth_middleware, security_headers_layer};

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Every route except `/health` requires a bearer token
pub fn create_routes(state: AppState, body_limit: usize) -> Router {
    let protected = Router::new()
        .route("/comments", get(list_comments).post(create_comment))
        .route("/comments/:id", delete(delete_comment))
        .route("/users/:user_id/notifications", post(create_notification))
        .route("/me/notifications", get(list_notifications))
        .route("/me/fcm-tokens", put(register_token))
        .route("/me/fcm-tokens/:token", delete(unregister_token))
        .route("/me/profile", put(update_profile))
        .route("/chat", post(chat))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(security_headers_layer())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
