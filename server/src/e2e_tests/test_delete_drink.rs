//! Test drink deletion.

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::e2e_tests::helpers::{TestApp, assert_error, matcha_shake, token_with};

#[tokio::test]
async fn test_delete_twice() {
    let app = TestApp::new().await;
    let id = app.create(matcha_shake()).await;
    let token = token_with(&["delete:drinks"]);
    let uri = format!("/drinks/{id}");

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "delete": id}));

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_error(status, &body, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_removes_from_listing() {
    let app = TestApp::new().await;
    let kept = app.create(matcha_shake()).await;
    let removed = app.create(matcha_shake()).await;
    let token = token_with(&["delete:drinks"]);

    app.send(Method::DELETE, &format!("/drinks/{removed}"), Some(&token), None)
        .await;

    let (_, body) = app.get("/drinks", None).await;
    assert_eq!(body["drinks"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["drinks"][0]["id"], kept);
}

#[tokio::test]
async fn test_delete_without_permission() {
    let app = TestApp::new().await;
    let id = app.create(matcha_shake()).await;
    let token = token_with(&["patch:drinks"]);

    let (status, body) = app
        .send(Method::DELETE, &format!("/drinks/{id}"), Some(&token), None)
        .await;

    assert_error(status, &body, StatusCode::FORBIDDEN);
    assert_eq!(app.store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_without_token() {
    let app = TestApp::new().await;
    let id = app.create(matcha_shake()).await;

    let (status, body) = app
        .send(Method::DELETE, &format!("/drinks/{id}"), None, None)
        .await;

    assert_error(status, &body, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_non_integer_id_without_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::DELETE, "/drinks/abc", None, None).await;

    assert_error(status, &body, StatusCode::NOT_FOUND);
    assert_eq!(app.key_set.fetch_count(), 0);
}
