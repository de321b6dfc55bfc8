use crate::auth::JwtService;
use crate::services::{ChatService, CommentService, NotificationService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub comment_service: CommentService,
    pub notification_service: NotificationService,
    pub chat_service: ChatService,
}
