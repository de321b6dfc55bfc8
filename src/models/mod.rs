// API and storage models

pub mod chat;
pub mod comment;
pub mod device_token;
pub mod notification;
pub mod push;
pub mod user;

pub use chat::*;
pub use comment::*;
pub use device_token::*;
pub use notification::*;
pub use push::*;
pub use user::*;
