//! Test how bearer token failures surface over HTTP.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};

use crate::e2e_tests::helpers::{TestApp, assert_error, token_with};
use crate::testing::{
    ROGUE_KID, StaticKeySet, TRUSTED_KID, TestClaims, rotated_jwks, sign_rogue_token,
    sign_token, trusted_jwks,
};

fn detail_request(authorization: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri("/drinks-detail")
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_unknown_kid() {
    let app = TestApp::new().await;
    let token = sign_rogue_token(&TestClaims::with_permissions(&["get:drinks-detail"]), ROGUE_KID);

    let (status, body) = app.get("/drinks-detail", Some(&token)).await;

    assert_error(status, &body, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unable to find the appropriate key.");
}

#[tokio::test]
async fn test_forged_signature_under_trusted_kid() {
    let app = TestApp::new().await;
    let token = sign_rogue_token(&TestClaims::with_permissions(&["get:drinks-detail"]), TRUSTED_KID);

    let (status, body) = app.get("/drinks-detail", Some(&token)).await;

    assert_error(status, &body, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unable to verify token signature.");
}

#[tokio::test]
async fn test_unknown_kids_do_not_bypass_key_cache() {
    let app = TestApp::new().await;
    let token = sign_rogue_token(&TestClaims::with_permissions(&["get:drinks-detail"]), ROGUE_KID);

    for _ in 0..10 {
        let (status, _) = app.get("/drinks-detail", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    assert_eq!(app.key_set.fetch_count(), 1);
}

#[tokio::test]
async fn test_rotated_key_is_picked_up() {
    let app = TestApp::with_verifier(StaticKeySet::new(trusted_jwks()), |verifier| {
        verifier.with_min_refresh_interval(Duration::ZERO)
    })
    .await;
    // Warm the cache with the trusted-only set.
    let (status, _) = app
        .get("/drinks-detail", Some(&token_with(&["get:drinks-detail"])))
        .await;
    assert_eq!(status, StatusCode::OK);

    app.key_set.replace(rotated_jwks());
    let token = sign_rogue_token(&TestClaims::with_permissions(&["get:drinks-detail"]), ROGUE_KID);
    let (status, body) = app.get("/drinks-detail", Some(&token)).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    assert_eq!(app.key_set.fetch_count(), 2);
}

#[tokio::test]
async fn test_expired_token() {
    let app = TestApp::new().await;
    let token = sign_token(&TestClaims::with_permissions(&["get:drinks-detail"]).expired());

    let (status, body) = app.get("/drinks-detail", Some(&token)).await;

    assert_error(status, &body, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired.");
}

#[tokio::test]
async fn test_wrong_audience() {
    let app = TestApp::new().await;
    let token = sign_token(&TestClaims::with_permissions(&["get:drinks-detail"]).audience("tea"));

    let (status, body) = app.get("/drinks-detail", Some(&token)).await;

    assert_error(status, &body, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Incorrect claims. Please, check the audience and issuer."
    );
}

#[tokio::test]
async fn test_malformed_headers() {
    let app = TestApp::new().await;
    let token = token_with(&["get:drinks-detail"]);

    for authorization in [
        format!("Basic {token}"),
        token.clone(),
        format!("Bearer {token} extra"),
        "Bearer".to_string(),
    ] {
        let (status, body) = app.send_request(detail_request(&authorization)).await;
        assert_error(status, &body, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"], "Authorization header must be a bearer token.",
            "header: {authorization}"
        );
    }
}

#[tokio::test]
async fn test_garbage_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send_request(detail_request("Bearer not.a.jwt")).await;

    assert_error(status, &body, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unable to parse authentication token.");
}

#[tokio::test]
async fn test_key_set_unavailable() {
    let app = TestApp::with_key_set(StaticKeySet::failing()).await;
    let token = token_with(&["get:drinks-detail"]);

    let (status, body) = app.get("/drinks-detail", Some(&token)).await;

    assert_error(status, &body, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "internal server error");
}
