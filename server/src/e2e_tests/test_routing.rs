//! Test responses for unknown routes, unsupported methods and CORS.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};

use crate::e2e_tests::helpers::{TestApp, assert_error};

#[tokio::test]
async fn test_undefined_method() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::PUT, "/drinks", None, None).await;

    assert_error(status, &body, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], "method not allowed");
}

#[tokio::test]
async fn test_get_on_item_route() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/drinks/1", None).await;

    assert_error(status, &body, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/teas", None).await;

    assert_error(status, &body, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "resource not found");
}

#[tokio::test]
async fn test_cors_headers() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/drinks")
        .header(header::ORIGIN, "http://localhost:8100")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
