// API routes and handlers

pub mod chat;
pub mod comments;
pub mod error;
pub mod health;
pub mod notifications;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::{create_routes, DEFAULT_BODY_LIMIT};
pub use state::AppState;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 200;

/// Page size from a raw `limit` query value: default 10, at most 200.
/// Only the leading integer is read, so `"25abc"` is 25 and `"3.7"` is 3;
/// values without one, or that are not positive, fall back to the default.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    raw.and_then(leading_integer)
        .filter(|limit| *limit > 0)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT)
}

fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['-', '+']));
    let digits = raw[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    // Saturate instead of failing on very long digit runs
    raw[..sign_len + digits]
        .parse::<i64>()
        .ok()
        .or_else(|| Some(if raw.starts_with('-') { i64::MIN } else { i64::MAX }))
}
