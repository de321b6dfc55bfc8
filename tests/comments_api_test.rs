mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::TestApp;
use nutrition_api::auth::Claims;
use nutrition_api::models::UpdateProfileRequest;
use nutrition_api::repositories::UserDirectory;

#[tokio::test]
async fn test_create_and_list_comments() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    let (status, body) = app
        .request(
            Method::POST,
            "/comments",
            Some(&token),
            Some(json!({ "foodId": "  pho-bo ", "text": "  Ngon quá!  " })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ok"], true);
    assert_eq!(body["comment"]["foodId"], "pho-bo");
    assert_eq!(body["comment"]["text"], "Ngon quá!");
    assert_eq!(body["comment"]["authorId"], "cook-1");
    assert!(body["comment"]["replyTo"].is_null());

    let (status, body) = app
        .request(Method::POST, "/comments", Some(&token), Some(json!({ "foodId": "pho-bo", "text": "second" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let second_id = body["comment"]["id"].clone();

    let (status, body) = app
        .request(Method::GET, "/comments?foodId=pho-bo", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], second_id);
    assert_eq!(comments[1]["text"], "Ngon quá!");
}

#[tokio::test]
async fn test_list_respects_limit_and_food() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    for i in 0..3 {
        app.request(
            Method::POST,
            "/comments",
            Some(&token),
            Some(json!({ "foodId": "banh-mi", "text": format!("comment {i}") })),
        )
        .await;
    }
    app.request(Method::POST, "/comments", Some(&token), Some(json!({ "foodId": "com-tam", "text": "other" })))
        .await;

    let (_, body) = app
        .request(Method::GET, "/comments?foodId=banh-mi&limit=2", Some(&token), None)
        .await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 2);

    let (_, body) = app
        .request(Method::GET, "/comments?foodId=banh-mi&limit=nope", Some(&token), None)
        .await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 3);

    let (_, body) = app
        .request(Method::GET, "/comments?foodId=unknown", Some(&token), None)
        .await;
    assert_eq!(body, json!({ "ok": true, "comments": [] }));
}

#[tokio::test]
async fn test_list_requires_food_id() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    for uri in ["/comments", "/comments?foodId=", "/comments?foodId=%20%20"] {
        let (status, body) = app.request(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, json!({ "error": "foodId required" }));
    }
}

#[tokio::test]
async fn test_create_validates_fields() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    let invalid = [
        json!({ "text": "no food" }),
        json!({ "foodId": "pho" }),
        json!({ "foodId": "pho", "text": "   " }),
        json!({ "foodId": "", "text": "hello" }),
    ];

    for payload in invalid {
        let (status, body) = app
            .request(Method::POST, "/comments", Some(&token), Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body, json!({ "error": "foodId and text required" }));
    }
}

#[tokio::test]
async fn test_create_coerces_non_string_values() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    let (status, body) = app
        .request(
            Method::POST,
            "/comments",
            Some(&token),
            Some(json!({ "foodId": 42, "text": "nice", "replyTo": "  parent-1 " })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["foodId"], "42");
    assert_eq!(body["comment"]["replyTo"], "parent-1");
}

#[tokio::test]
async fn test_author_name_comes_from_profile_then_claims() {
    let app = TestApp::new();
    app.store
        .upsert_profile(
            "cook-1",
            UpdateProfileRequest {
                display_name: Some("Lan".to_string()),
                email: None,
            },
        )
        .await
        .unwrap();

    let (_, body) = app
        .request(
            Method::POST,
            "/comments",
            Some(&app.token("cook-1")),
            Some(json!({ "foodId": "pho", "text": "hi" })),
        )
        .await;
    assert_eq!(body["comment"]["authorName"], "Lan");

    let token = app.token_with(
        "cook-2",
        Claims {
            email: Some("minh@example.com".to_string()),
            ..Default::default()
        },
    );
    let (_, body) = app
        .request(Method::POST, "/comments", Some(&token), Some(json!({ "foodId": "pho", "text": "hi" })))
        .await;
    assert_eq!(body["comment"]["authorName"], "minh@example.com");

    let (_, body) = app
        .request(
            Method::POST,
            "/comments",
            Some(&app.token("cook-3")),
            Some(json!({ "foodId": "pho", "text": "hi" })),
        )
        .await;
    assert!(body["comment"]["authorName"].is_null());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/comments")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_oversized_body_is_payload_too_large() {
    let app = TestApp::new();
    let token = app.token("cook-1");
    let text = "a".repeat(nutrition_api::api::DEFAULT_BODY_LIMIT + 1);

    let (status, body) = app
        .request(Method::POST, "/comments", Some(&token), Some(json!({ "foodId": "pho", "text": text })))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_own_comment() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    let (_, body) = app
        .request(Method::POST, "/comments", Some(&token), Some(json!({ "foodId": "pho", "text": "bye" })))
        .await;
    let id = body["comment"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(Method::DELETE, &format!("/comments/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, body) = app
        .request(Method::DELETE, &format!("/comments/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "not_found" }));

    let (_, body) = app.request(Method::GET, "/comments?foodId=pho", Some(&token), None).await;
    assert_eq!(body["comments"], json!([]));
}

#[tokio::test]
async fn test_delete_requires_author_or_admin() {
    let app = TestApp::new();

    let (_, body) = app
        .request(
            Method::POST,
            "/comments",
            Some(&app.token("cook-1")),
            Some(json!({ "foodId": "pho", "text": "mine" })),
        )
        .await;
    let id = body["comment"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(Method::DELETE, &format!("/comments/{id}"), Some(&app.token("stranger")), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "forbidden" }));

    let (status, _) = app
        .request(Method::DELETE, &format!("/comments/{id}"), Some(&app.admin_token("moderator")), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_unknown_or_malformed_id_is_not_found() {
    let app = TestApp::new();
    let token = app.token("cook-1");

    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let (status, body) = app
            .request(Method::DELETE, &format!("/comments/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}
