mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::TestApp;
use nutrition_api::config::ChatConfig;
use nutrition_api::repositories::{DeviceTokenRepository, MemoryStore};
use nutrition_api::services::{spawn_dispatch_worker, FcmClient, FcmCredentials, NotificationEvents, PushDispatcher};

#[tokio::test]
async fn test_create_and_list_notifications() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/users/owner/notifications",
            Some(&app.token("fan")),
            Some(json!({ "type": "like", "actorName": "Minh", "foodId": "pho" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    assert_eq!(body["notification"]["userId"], "owner");
    assert_eq!(body["notification"]["type"], "like");
    assert_eq!(body["notification"]["actorId"], "fan");
    assert_eq!(body["notification"]["actorName"], "Minh");
    assert_eq!(body["notification"]["foodId"], "pho");

    let (status, body) = app
        .request(Method::GET, "/me/notifications", Some(&app.token("owner")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

    // Notifications are private to their recipient
    let (_, body) = app
        .request(Method::GET, "/me/notifications", Some(&app.token("fan")), None)
        .await;
    assert_eq!(body["notifications"], json!([]));
}

#[tokio::test]
async fn test_actor_name_falls_back_to_profile() {
    let app = TestApp::new();
    let fan = app.token("fan");

    let (status, _) = app
        .request(Method::PUT, "/me/profile", Some(&fan), Some(json!({ "displayName": "  Hoa " })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request(Method::POST, "/users/owner/notifications", Some(&fan), Some(json!({ "type": "follow" })))
        .await;
    assert_eq!(body["notification"]["actorName"], "Hoa");
    assert_eq!(body["notification"]["type"], "follow");
}

#[tokio::test]
async fn test_missing_type_defaults_to_general() {
    let app = TestApp::new();

    let (status, body) = app
        .request(Method::POST, "/users/owner/notifications", Some(&app.token("fan")), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["notification"]["type"], "general");
}

#[tokio::test]
async fn test_register_and_unregister_tokens() {
    let app = TestApp::new();
    let token = app.token("owner");

    let (status, body) = app
        .request(
            Method::PUT,
            "/me/fcm-tokens",
            Some(&token),
            Some(json!({ "token": " device-a ", "platform": "android" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"]["token"], "device-a");
    assert_eq!(body["token"]["platform"], "android");

    // Re-registering refreshes instead of duplicating
    app.request(Method::PUT, "/me/fcm-tokens", Some(&token), Some(json!({ "token": "device-a" })))
        .await;
    assert_eq!(app.store.list_tokens("owner").await.unwrap(), vec!["device-a".to_string()]);

    let (status, body) = app
        .request(Method::PUT, "/me/fcm-tokens", Some(&token), Some(json!({ "token": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .request(Method::DELETE, "/me/fcm-tokens/device-a", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(Method::DELETE, "/me/fcm-tokens/device-a", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_notification_push_removes_stale_tokens() {
    let fcm = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/food-app/messages:send"))
        .and(body_partial_json(json!({ "message": { "token": "live" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/food-app/messages/1"
        })))
        .expect(1)
        .mount(&fcm)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/projects/food-app/messages:send"))
        .and(body_partial_json(json!({ "message": { "token": "stale" } })))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "code": 404,
                "message": "Requested entity was not found.",
                "status": "NOT_FOUND",
                "details": [{
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": "UNREGISTERED"
                }]
            }
        })))
        .expect(1)
        .mount(&fcm)
        .await;

    let store = MemoryStore::new();
    store.upsert("owner", "live", None).await.unwrap();
    store.upsert("owner", "stale", None).await.unwrap();

    let client = FcmClient::new(fcm.uri(), "food-app", FcmCredentials::Static("test-token".to_string())).unwrap();
    let (events, rx) = NotificationEvents::channel(8);
    let worker = spawn_dispatch_worker(rx, PushDispatcher::new(Arc::new(store.clone()), Arc::new(client)), 4);

    let app = TestApp::with_store(store.clone(), events, ChatConfig::default());

    let (status, _) = app
        .request(
            Method::POST,
            "/users/owner/notifications",
            Some(&app.token("fan")),
            Some(json!({ "type": "like", "actorName": "Minh" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let cleaned = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if store.list_tokens("owner").await.unwrap() == vec!["live".to_string()] {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(cleaned.is_ok(), "stale token was not removed");

    // Dropping the router closes the queue and stops the worker
    drop(app);
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not stop")
        .unwrap();
}
