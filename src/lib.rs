//! Backend for a food-tracking app: comments on food items, push fan-out of
//! activity notifications, and a chat proxy to an LLM provider.

pub mod api;
pub mod auth;
pub mod config;
pub mod logging;
pub mod models;
pub mod repositories;
pub mod services;
