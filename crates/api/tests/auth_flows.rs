//! End-to-end auth flows against a real database.
//!
//! Each test runs on a freshly migrated schema. The harness mailer is
//! unconfigured, so codes land on the user row and are read back with a
//! direct query, standing in for the mailbox.

mod common;

use axum::http::StatusCode;
use common::{assert_error, body_json, delete_authed, post_json, post_json_authed, test_config};
use serde_json::json;
use sqlx::PgPool;
use toktak_api::auth::jwt::{decode_unverified, issue_token, TokenKind};

/// Passes the 10-20 char digit/symbol/mixed-case rules.
const PASSWORD: &str = "Abcdefg1!!";

fn signup_body(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "password": PASSWORD,
        "confirm_password": PASSWORD
    })
}

/// Read the pending confirmation code straight off the user row.
async fn stored_confirmation_code(pool: &PgPool, email: &str) -> String {
    sqlx::query_scalar::<_, Option<String>>(
        "SELECT email_confirmation_code FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_one(pool)
    .await
    .expect("user row must exist")
    .expect("confirmation code must be set")
}

/// Sign up and log in, returning the login payload (user + token pair).
async fn signup_and_login(app: axum::Router, email: &str) -> serde_json::Value {
    let response = post_json(app.clone(), "/api/v1/auth/signup", signup_body(email)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_signup_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);

    let first = post_json(app.clone(), "/api/v1/auth/signup", signup_body("a@x.com")).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let json = body_json(first).await;
    assert!(
        json["message"].as_str().unwrap().contains("a@x.com"),
        "acknowledgement must name the address the code went to"
    );

    // The exact same call again: one user row per email, ever.
    let second = post_json(app, "/api/v1/auth/signup", signup_body("a@x.com")).await;
    assert_error(second, StatusCode::CONFLICT, "CONFLICT").await;
}

// ---------------------------------------------------------------------------
// Verification codes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn confirmation_code_cannot_be_replayed(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(app.clone(), "/api/v1/auth/signup", signup_body("a@x.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let code = stored_confirmation_code(&pool, "a@x.com").await;

    let verify = json!({ "email": "a@x.com", "code": code });
    let first = post_json(app.clone(), "/api/v1/auth/verify", verify.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);

    // Consumed is consumed; the same code again is a business rejection.
    let replay = post_json(app, "/api/v1/auth/verify", verify).await;
    assert_error(replay, StatusCode::NOT_ACCEPTABLE, "NOT_ACCEPTABLE").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn expired_confirmation_code_is_rejected_without_side_effects(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(app.clone(), "/api/v1/auth/signup", signup_body("a@x.com")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let code = stored_confirmation_code(&pool, "a@x.com").await;

    // Push the window into the past; the code itself is still correct.
    sqlx::query(
        "UPDATE users SET email_confirmation_code_expires = NOW() - INTERVAL '1 minute'
         WHERE email = $1",
    )
    .bind("a@x.com")
    .execute(&pool)
    .await
    .expect("expiry update must succeed");

    let response = post_json(
        app,
        "/api/v1/auth/verify",
        json!({ "email": "a@x.com", "code": code }),
    )
    .await;
    assert_error(response, StatusCode::NOT_ACCEPTABLE, "NOT_ACCEPTABLE").await;

    // The guarded consume must not have confirmed or cleared anything.
    let confirmed: bool =
        sqlx::query_scalar("SELECT is_email_confirmed FROM users WHERE email = $1")
            .bind("a@x.com")
            .fetch_one(&pool)
            .await
            .expect("user row must exist");
    assert!(!confirmed, "an expired code must not confirm the email");
}

// ---------------------------------------------------------------------------
// Sessions: login, refresh, logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_mints_an_access_token_for_the_same_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = signup_and_login(app.clone(), "a@x.com").await;

    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();
    let session_id = decode_unverified(access)
        .expect("issued token must decode")
        .session_id;
    assert!(session_id.is_some(), "login tokens must carry a session id");

    let response = post_json_authed(app, "/api/v1/auth/refresh", refresh, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let new_access = json["access_token"].as_str().unwrap();
    assert_ne!(new_access, access, "refresh must mint a fresh access token");
    assert_eq!(
        decode_unverified(new_access).unwrap().session_id,
        session_id,
        "the new access token must stay bound to the login session"
    );
    assert_eq!(
        json["refresh_token"].as_str().unwrap(),
        refresh,
        "the refresh token is reused until it expires"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logged_out_session_cannot_refresh(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = signup_and_login(app.clone(), "a@x.com").await;

    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let response = post_json_authed(app.clone(), "/api/v1/auth/logout", access, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "User logged out successfully");

    // The session is expired; its refresh token is now worthless.
    let response = post_json_authed(app, "/api/v1/auth/refresh", refresh, json!({})).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rejects_a_token_that_is_not_the_bound_one(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = signup_and_login(app.clone(), "a@x.com").await;

    let claims = decode_unverified(login["access_token"].as_str().unwrap()).unwrap();

    // Correct secret, correct session id, but a different jti than the token
    // bound at login.
    let config = test_config();
    let foreign = issue_token(
        TokenKind::Refresh,
        claims.sub,
        "a@x.com",
        false,
        claims.session_id,
        &config.jwt,
    )
    .expect("token issuing should succeed");

    let response = post_json_authed(app, "/api/v1/auth/refresh", &foreign, json!({})).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

// ---------------------------------------------------------------------------
// Account deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_me_rejects_a_session_that_never_existed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let login = signup_and_login(app.clone(), "a@x.com").await;

    let claims = decode_unverified(login["access_token"].as_str().unwrap()).unwrap();

    // Correctly signed access token naming a session id that was never
    // created.
    let config = test_config();
    let forged = issue_token(
        TokenKind::Access,
        claims.sub,
        "a@x.com",
        false,
        Some(424_242),
        &config.jwt,
    )
    .expect("token issuing should succeed");

    let response = delete_authed(app.clone(), "/api/v1/users/me", &forged).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    // The account must be untouched: logging in still works.
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "a@x.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
