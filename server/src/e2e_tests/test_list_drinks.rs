//! Test the public drink listing.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::{TestApp, matcha_shake};

#[tokio::test]
async fn test_empty_catalogue() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/drinks", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "drinks": []}));
}

#[tokio::test]
async fn test_summary_hides_ingredient_names() {
    let app = TestApp::new().await;
    let id = app.create(matcha_shake()).await;

    let (status, body) = app.get("/drinks", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "drinks": [{
                "id": id,
                "title": "matcha shake",
                "recipe": [
                    {"color": "grey", "parts": 1},
                    {"color": "green", "parts": 3},
                ],
            }],
        })
    );
}

#[tokio::test]
async fn test_listing_ignores_credentials() {
    let app = TestApp::new().await;
    app.create(matcha_shake()).await;

    let (status, body) = app.get("/drinks", Some("not-a-token")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drinks"].as_array().map(Vec::len), Some(1));
    assert_eq!(app.key_set.fetch_count(), 1);
}

#[tokio::test]
async fn test_listing_is_ordered_by_id() {
    let app = TestApp::new().await;
    let first = app.create(json!({"title": "b", "recipe": {"name": "x", "color": "red", "parts": 1}})).await;
    let second = app.create(json!({"title": "a", "recipe": {"name": "y", "color": "blue", "parts": 1}})).await;

    let (_, body) = app.get("/drinks", None).await;

    let ids: Vec<i64> = body["drinks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|drink| drink["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);
}
