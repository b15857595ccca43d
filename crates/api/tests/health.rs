//! Probe and middleware behaviour, exercised without a database.
//!
//! The harness pool connects lazily and points nowhere, so these tests see
//! the service in its degraded state and confirm the middleware stack still
//! does its job around it.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use tower::ServiceExt;

#[tokio::test]
async fn probe_reports_degraded_without_a_database() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/health").await;

    // The probe never fails outright; the payload carries the bad news.
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert_eq!(json["service"], "toktak-api");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn probe_is_not_versioned() {
    // The probe lives at the root; under /api/v1 it does not exist.
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/api/v1/health").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let app = common::build_test_app(common::lazy_pool());
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header must be set")
        .to_str()
        .expect("x-request-id must be ASCII");

    uuid::Uuid::parse_str(request_id).expect("x-request-id must be a UUID");
}

#[tokio::test]
async fn cors_preflight_advertises_the_auth_surface() {
    let app = common::build_test_app(common::lazy_pool());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/auth/login")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("preflight must echo the origin")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");

    let allow_methods = response
        .headers()
        .get("access-control-allow-methods")
        .expect("preflight must list allowed methods")
        .to_str()
        .unwrap();

    // The auth surface uses GET/POST/PUT/DELETE and nothing else.
    for method in ["GET", "POST", "PUT", "DELETE"] {
        assert!(
            allow_methods.contains(method),
            "allow-methods must contain {method}, got: {allow_methods}"
        );
    }
    assert!(
        !allow_methods.contains("PATCH"),
        "PATCH is not served and must not be advertised, got: {allow_methods}"
    );
}
