//! Router shape tests: auth layering, admin gating, and validation mapping.
//!
//! These tests exercise the router without a running database by using a lazy
//! connection pool; every asserted behavior (middleware rejections, payload
//! validation, CORS, request IDs) resolves before any query is issued.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use ma_server::api::{self, AppState};
use medacademy::activation::ActivationManager;
use medacademy::auth::{AccessTokenClaims, AuthManager};
use medacademy::catalog::CatalogManager;
use medacademy::db::{PgProfileStore, ProfileStore};
use medacademy::identity::IdentityResolver;
use medacademy::schedule::ScheduleManager;
use medacademy::uploads::{FsBlobStore, UploadManager};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only_32b";
const TEST_PEPPER: &str = "test_pepper_for_testing_only";

/// Build the full router on a pool that never connects.
fn test_app() -> axum::Router {
    // Short acquire timeout: any code path that does reach the pool should
    // fail fast rather than retry for the default 30 seconds.
    let pool = Arc::new(
        PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(1))
            .connect_lazy("postgres://postgres@localhost/academy_shape_test")
            .expect("lazy pool"),
    );

    let admin_emails = vec!["owner@academy.example".to_string()];
    let profile_store: Arc<dyn ProfileStore> =
        Arc::new(PgProfileStore::new(pool.as_ref().clone()));
    let auth_manager = Arc::new(AuthManager::new(
        pool.clone(),
        TEST_PEPPER.to_string(),
        TEST_JWT_SECRET.to_string(),
        admin_emails.clone(),
    ));

    let upload_dir = std::env::temp_dir().join("ma_server_api_shape_uploads");
    let state = AppState {
        auth_manager,
        resolver: IdentityResolver::new(Arc::clone(&profile_store), admin_emails),
        profile_store,
        catalog: CatalogManager::new(pool.clone()),
        activation: ActivationManager::new(pool.clone()),
        schedules: ScheduleManager::new(pool.clone()),
        uploads: UploadManager::new(Arc::new(FsBlobStore::new(
            upload_dir,
            "https://cdn.academy.example".to_string(),
        ))),
        login_limiter: api::rate_limiter::shared_login_limiter(),
        pool,
    };

    api::create_router(state)
}

/// Mint an access token signed with the test secret.
fn mint_token(user_id: i64, email: &str, is_admin: bool) -> String {
    let now = chrono::Utc::now();
    let claims = AccessTokenClaims {
        sub: user_id,
        email: email.to_string(),
        is_admin,
        exp: (now + chrono::Duration::minutes(15)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}

// ============================================================================
// Authentication Middleware Tests
// ============================================================================

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .uri("/api/v1/profile")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_garbage_token_is_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .uri("/api/v1/profile")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let app = test_app();

    let now = chrono::Utc::now();
    let claims = AccessTokenClaims {
        sub: 7,
        email: "student@academy.example".to_string(),
        is_admin: false,
        exp: (now + chrono::Duration::minutes(15)).timestamp(),
        iat: now.timestamp(),
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"a_completely_different_signing_key"),
    )
    .unwrap();

    let request = Request::builder()
        .uri("/api/v1/profile")
        .header(header::AUTHORIZATION, format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin Gating Tests
// ============================================================================

#[tokio::test]
async fn test_admin_route_without_token_is_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/admin/activation/codes")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_route_with_student_token_is_forbidden() {
    let app = test_app();
    let token = mint_token(7, "student@academy.example", false);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/activation/codes")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"count": 10, "days": 30}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_token_passes_gate_and_reaches_validation() {
    let app = test_app();
    let token = mint_token(1, "owner@academy.example", true);

    // Batch parameters are validated before any insert, so the admin token
    // reaches handler logic even without a database.
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/activation/codes")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"count": 0, "days": 30}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("count"));
}

// ============================================================================
// Validation Mapping Tests
// ============================================================================

#[tokio::test]
async fn test_schedule_missing_group_names_the_field() {
    let app = test_app();
    let token = mint_token(1, "owner@academy.example", true);

    // "group" omitted; validation rejects before any write
    let payload = serde_json::json!({
        "semester": "Fall",
        "academic_year": "2026/2027",
        "level": "2",
        "schedule": []
    });

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/schedules")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("group"));
}

#[tokio::test]
async fn test_upload_with_traversal_file_name_is_rejected() {
    let app = test_app();
    let token = mint_token(1, "owner@academy.example", true);
    let course_id = uuid::Uuid::new_v4();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/admin/courses/{course_id}/assets/..%2F..%2Fpasswd"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from("x"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_register_is_client_error() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ invalid json }"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY,
        "Malformed JSON should return 400 or 422"
    );
}

// ============================================================================
// Rate Limiting Tests
// ============================================================================

#[tokio::test]
async fn test_sixth_login_attempt_for_same_email_is_rate_limited() {
    let app = test_app();
    let payload = r#"{"email": "limited@academy.example", "password": "whatever"}"#;

    // The limiter runs before credential checks; outcomes of the first five
    // attempts are irrelevant here.
    for _ in 0..5 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap();
        let _ = app.clone().oneshot(request).await.unwrap();
    }

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// ============================================================================
// Cross-cutting Layer Tests
// ============================================================================

#[tokio::test]
async fn test_responses_carry_a_request_id() {
    let app = test_app();

    let request = Request::builder()
        .uri("/api/v1/profile")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let header_value = response
        .headers()
        .get("x-request-id")
        .expect("request id header present")
        .to_str()
        .unwrap();
    assert!(uuid::Uuid::parse_str(header_value).is_ok());
}

#[tokio::test]
async fn test_supplied_request_id_is_echoed_back() {
    let app = test_app();

    let request = Request::builder()
        .uri("/api/v1/profile")
        .header("x-request-id", "shape-test-123")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "shape-test-123"
    );
}

#[tokio::test]
async fn test_cors_preflight_is_allowed() {
    let app = test_app();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/courses")
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_success());
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS headers should be present"
    );
}

#[tokio::test]
async fn test_404_for_unknown_endpoint() {
    let app = test_app();

    let request = Request::builder()
        .uri("/api/v1/nonexistent")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
