use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub body_limit_bytes: usize,
    pub push_queue_capacity: usize,
    pub push_concurrency: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let jwt_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string());
        let jwt_issuer = env::var("JWT_ISSUER").ok().filter(|v| !v.trim().is_empty());
        let jwt_audience = env::var("JWT_AUDIENCE").ok().filter(|v| !v.trim().is_empty());
        let body_limit_bytes = env::var("BODY_LIMIT_BYTES")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse()
            .unwrap_or(1024 * 1024);
        let push_queue_capacity = env::var("PUSH_QUEUE_CAPACITY")
            .unwrap_or_else(|_| "1024".to_string())
            .parse()
            .ok()
            .filter(|capacity: &usize| *capacity > 0)
            .unwrap_or(1024);
        let push_concurrency = env::var("PUSH_CONCURRENCY")
            .unwrap_or_else(|_| "16".to_string())
            .parse()
            .ok()
            .filter(|n: &usize| *n > 0)
            .unwrap_or(16);

        Ok(AppConfig {
            host,
            port,
            environment,
            log_level,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            body_limit_bytes,
            push_queue_capacity,
            push_concurrency,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
