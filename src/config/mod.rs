// Environment-driven configuration

pub mod app;
pub mod chat;
pub mod database;
pub mod push;

pub use app::AppConfig;
pub use chat::ChatConfig;
pub use database::{run_migrations, DatabaseConfig};
pub use push::FcmConfig;
