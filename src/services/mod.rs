// Business logic services

pub mod chat_service;
pub mod comment_service;
pub mod fcm_client;
pub mod google_auth;
pub mod notification_events;
pub mod notification_service;
pub mod push_dispatcher;

pub use chat_service::{ChatError, ChatService};
pub use comment_service::{CommentError, CommentService};
pub use fcm_client::{FcmClient, FcmCredentials, PushSender};
pub use notification_events::{spawn_dispatch_worker, NotificationCreated, NotificationEvents};
pub use notification_service::{NotificationError, NotificationService};
pub use push_dispatcher::{DispatchSummary, PushDispatcher};

#[cfg(test)]
pub use fcm_client::MockPushSender;
