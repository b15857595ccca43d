//! Integration tests for the auth endpoints.
//!
//! Every case here is rejected at the validation or token layer, before any
//! query runs, so a lazily-connected pool with no database behind it
//! suffices. Happy paths that touch the store are covered by the repository
//! and handler logic exercised in staging against a real database.

mod common;

use axum::http::StatusCode;
use common::{assert_error, get, get_authed, post_json, post_json_authed, test_config};
use serde_json::json;
use toktak_api::auth::jwt::{issue_token, TokenKind};

// ---------------------------------------------------------------------------
// Signup: shape validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_rejects_mismatched_passwords() {
    let app = common::build_test_app(common::lazy_pool());
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({
            "email": "new@x.com",
            "first_name": "New",
            "last_name": "User",
            "password": "Abcdefg1!!",
            "confirm_password": "Different1!!"
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn signup_rejects_invalid_email() {
    let app = common::build_test_app(common::lazy_pool());
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({
            "email": "not-an-email",
            "first_name": "New",
            "last_name": "User",
            "password": "Abcdefg1!!",
            "confirm_password": "Abcdefg1!!"
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn signup_rejects_weak_password() {
    let app = common::build_test_app(common::lazy_pool());
    // Long enough but no digit or symbol.
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({
            "email": "new@x.com",
            "first_name": "New",
            "last_name": "User",
            "password": "Abcdefghij",
            "confirm_password": "Abcdefghij"
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// Verification codes: shape before store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verify_rejects_malformed_code() {
    let app = common::build_test_app(common::lazy_pool());
    // Lowercase codes are a shape error (400), not a business rejection (406).
    let response = post_json(
        app,
        "/api/v1/auth/verify",
        json!({ "email": "a@x.com", "code": "a1b2c3" }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn verify_reset_code_rejects_malformed_code() {
    let app = common::build_test_app(common::lazy_pool());
    let response = post_json(
        app,
        "/api/v1/auth/verify-reset-code",
        json!({ "email": "a@x.com", "code": "A1B2C" }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// Bearer token handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_requires_authorization_header() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/api/v1/users/me").await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn me_rejects_garbage_token() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get_authed(app, "/api/v1/users/me", "not.a.jwt").await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn logout_requires_authorization() {
    let app = common::build_test_app(common::lazy_pool());
    let response = post_json(app, "/api/v1/auth/logout", json!({})).await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let app = common::build_test_app(common::lazy_pool());

    // An access token is signed with the access secret and must not pass the
    // refresh endpoint's secret check.
    let config = test_config();
    let access_token = issue_token(TokenKind::Access, 1, "a@x.com", false, Some(1), &config.jwt)
        .expect("token issuing should succeed");

    let response = post_json_authed(app, "/api/v1/auth/refresh", &access_token, json!({})).await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn session_unbound_access_token_is_rejected() {
    let app = common::build_test_app(common::lazy_pool());

    // Signed with the right secret but carrying no session id.
    let config = test_config();
    let token = issue_token(TokenKind::Access, 1, "a@x.com", false, None, &config.jwt)
        .expect("token issuing should succeed");

    let response = get_authed(app, "/api/v1/users/me", &token).await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_password_checks_shape_before_token() {
    let app = common::build_test_app(common::lazy_pool());

    // Mismatched passwords are a 400 even when the token is garbage.
    let response = post_json(
        app,
        "/api/v1/auth/reset-password",
        json!({
            "reset_token": "garbage",
            "password": "Abcdefg1!!",
            "confirm_password": "Different1!!"
        }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[tokio::test]
async fn reset_password_rejects_bad_token() {
    let app = common::build_test_app(common::lazy_pool());
    let response = post_json(
        app,
        "/api/v1/auth/reset-password",
        json!({
            "reset_token": "garbage",
            "password": "Abcdefg1!!",
            "confirm_password": "Abcdefg1!!"
        }),
    )
    .await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn reset_password_rejects_access_token_as_reset_token() {
    let app = common::build_test_app(common::lazy_pool());

    // A session-bound access token must not authorize a password reset.
    let config = test_config();
    let access_token = issue_token(TokenKind::Access, 1, "a@x.com", false, Some(1), &config.jwt)
        .expect("token issuing should succeed");

    let response = post_json(
        app,
        "/api/v1/auth/reset-password",
        json!({
            "reset_token": access_token,
            "password": "Abcdefg1!!",
            "confirm_password": "Abcdefg1!!"
        }),
    )
    .await;

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn forgot_password_rejects_invalid_email() {
    let app = common::build_test_app(common::lazy_pool());
    let response = post_json(
        app,
        "/api/v1/auth/forgot-password",
        json!({ "email": "nope" }),
    )
    .await;

    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// Federated login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_oauth_provider_is_404() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/api/v1/auth/myspace/callback?code=abc").await;

    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Email change
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_email_requires_authorization() {
    let app = common::build_test_app(common::lazy_pool());

    let request = axum::http::Request::builder()
        .method("PUT")
        .uri("/api/v1/users/me/email")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            json!({ "code": "A1B2C3", "email": "new@x.com" }).to_string(),
        ))
        .expect("request must build");
    let response = tower::ServiceExt::oneshot(app, request)
        .await
        .expect("request must not fail");

    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}
