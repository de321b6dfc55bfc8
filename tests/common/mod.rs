// Shared helpers for router-level tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Once;
use tower::ServiceExt;

use nutrition_api::api::{create_routes, AppState, DEFAULT_BODY_LIMIT};
use nutrition_api::auth::{Claims, JwtService};
use nutrition_api::config::ChatConfig;
use nutrition_api::repositories::MemoryStore;
use nutrition_api::services::{ChatService, CommentService, NotificationEvents, NotificationService};

pub const TEST_SECRET: &str = "test_secret_key_for_testing_only";

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Router over an in-memory store
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub jwt: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(NotificationEvents::disabled(), ChatConfig::default())
    }

    pub fn with(events: NotificationEvents, chat_config: ChatConfig) -> Self {
        Self::with_store(MemoryStore::new(), events, chat_config)
    }

    pub fn with_store(store: MemoryStore, events: NotificationEvents, chat_config: ChatConfig) -> Self {
        init_test_logging();

        let jwt = JwtService::new(TEST_SECRET);
        let state = AppState {
            jwt_service: jwt.clone(),
            comment_service: CommentService::new(Arc::new(store.clone()), Arc::new(store.clone())),
            notification_service: NotificationService::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                events,
            ),
            chat_service: ChatService::new(chat_config).expect("chat client"),
        };

        Self {
            router: create_routes(state, DEFAULT_BODY_LIMIT),
            store,
            jwt,
        }
    }

    pub fn token(&self, uid: &str) -> String {
        self.jwt.issue_token(uid, Claims::default()).unwrap()
    }

    pub fn token_with(&self, uid: &str, claims: Claims) -> String {
        self.jwt.issue_token(uid, claims).unwrap()
    }

    pub fn admin_token(&self, uid: &str) -> String {
        self.token_with(
            uid,
            Claims {
                admin: Some(true),
                ..Default::default()
            },
        )
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }
}
