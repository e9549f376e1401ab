//! HTTP API for the nursing-education platform.
//!
//! This module provides the complete REST API for the platform: account and
//! session management, the student profile surface, the course catalog with
//! per-lesson access verdicts, activation-code administration, academic
//! schedules, and course asset uploads.
//!
//! # Architecture
//!
//! The API is built with:
//! - **Axum**: Async web framework
//! - **JWT**: Token-based authentication with access/refresh tokens
//! - **Managers**: Domain logic lives in `medacademy`; handlers translate
//!   HTTP to manager calls and map domain errors to status codes
//!
//! # Modules
//!
//! - [`auth`]: User authentication (register, login, logout, token refresh)
//! - [`profile`]: Resolved student profile and progress tracking
//! - [`courses`]: Course catalog with gated lesson access
//! - [`activation`]: Activation code administration and redemption
//! - [`schedule`]: Academic schedule ingestion and lookup
//! - [`uploads`]: Course asset uploads
//! - [`middleware`]: Authentication and admin-role middleware
//!
//! # Security
//!
//! - JWT access tokens expire after 15 minutes
//! - Refresh tokens are rotated on every use and expire after 7 days
//! - Admin endpoints additionally require the token's admin claim
//! - Login attempts are rate-limited per email
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod activation;
pub mod auth;
pub mod courses;
pub mod middleware;
pub mod profile;
pub mod rate_limiter;
pub mod request_id;
pub mod schedule;
pub mod uploads;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use medacademy::{
    activation::ActivationManager, auth::AuthManager, catalog::CatalogManager, db::ProfileStore,
    identity::IdentityResolver, schedule::ScheduleManager, uploads::UploadManager,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// This state is cloned for each request (cheap due to Arc wrappers) and
/// provides access to the domain managers.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub resolver: IdentityResolver,
    pub profile_store: Arc<dyn ProfileStore>,
    pub catalog: CatalogManager,
    pub activation: ActivationManager,
    pub schedules: ScheduleManager,
    pub uploads: UploadManager,
    pub login_limiter: rate_limiter::SharedLoginLimiter,
    pub pool: Arc<PgPool>,
}

/// JSON error body shared by every handler
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: error.into(),
        })
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ```text
/// GET    /health                                  - Health check (public)
/// POST   /api/v1/auth/register                    - Register account (public)
/// POST   /api/v1/auth/login                       - Login (public, rate limited)
/// POST   /api/v1/auth/logout                      - Logout (auth required)
/// POST   /api/v1/auth/refresh                     - Refresh token (auth required)
/// GET    /api/v1/courses                          - List courses (public)
/// GET    /api/v1/courses/{id}                     - Course with access verdicts (auth)
/// GET    /api/v1/profile                          - Resolved profile (auth)
/// PUT    /api/v1/profile                          - Edit name/phone (auth)
/// POST   /api/v1/profile/lessons/{id}/complete    - Mark lesson complete (auth)
/// POST   /api/v1/profile/quiz-grades              - Record quiz grade (auth)
/// POST   /api/v1/activation/redeem                - Redeem a code (auth)
/// GET    /api/v1/schedules/{level}/{group}        - Stored schedule (auth)
/// POST   /api/v1/admin/courses                    - Create course (admin)
/// PUT    /api/v1/admin/courses/{id}               - Update course (admin)
/// DELETE /api/v1/admin/courses/{id}               - Delete course (admin)
/// POST   /api/v1/admin/courses/{id}/assets/{name} - Upload asset (admin)
/// POST   /api/v1/admin/activation/codes           - Generate code batch (admin)
/// GET    /api/v1/admin/activation/codes           - List recent codes (admin)
/// DELETE /api/v1/admin/activation/codes/redeemed  - Purge redeemed codes (admin)
/// POST   /api/v1/admin/schedules                  - Ingest schedule (admin)
/// DELETE /api/v1/admin/profiles/{user_id}         - Remove a profile (admin)
/// ```
pub fn create_router(state: AppState) -> Router {
    // API v1 routes (versioned for future evolution)
    let v1_routes = create_v1_router(state.clone());

    // Root routes (health check - not versioned)
    let root_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
///
/// This allows for future API evolution (v2, v3, etc.) while maintaining
/// backward compatibility with existing clients.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/courses", get(courses::list_courses));

    // Protected routes (require authentication middleware)
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/courses/{course_id}", get(courses::get_course))
        .route("/profile", get(profile::get_profile))
        .route("/profile", put(profile::update_profile))
        .route(
            "/profile/lessons/{lesson_id}/complete",
            post(profile::complete_lesson),
        )
        .route("/profile/quiz-grades", post(profile::record_quiz_grade))
        .route("/activation/redeem", post(activation::redeem))
        .route("/schedules/{level}/{group}", get(schedule::get_schedule))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Admin routes (authentication plus the admin claim)
    let admin_routes = Router::new()
        .route("/admin/courses", post(courses::create_course))
        .route("/admin/courses/{course_id}", put(courses::update_course))
        .route(
            "/admin/courses/{course_id}",
            delete(courses::delete_course),
        )
        .route(
            "/admin/courses/{course_id}/assets/{file_name}",
            post(uploads::upload_asset),
        )
        .route("/admin/activation/codes", post(activation::generate_codes))
        .route("/admin/activation/codes", get(activation::list_codes))
        .route(
            "/admin/activation/codes/redeemed",
            delete(activation::purge_redeemed),
        )
        .route("/admin/schedules", post(schedule::ingest_schedule))
        .route(
            "/admin/profiles/{user_id}",
            delete(profile::delete_profile),
        )
        .layer(axum::middleware::from_fn(middleware::admin_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Combine v1 routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Performs a database connectivity check and returns JSON with detailed
/// health status and appropriate HTTP status code.
///
/// # Response
///
/// Returns `200 OK` if all components are healthy, or `503 Service
/// Unavailable` if any component fails.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","database":true,"timestamp":"2026-08-30T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Check database connectivity
    let db_healthy = sqlx::query("SELECT 1")
        .fetch_one(&*state.pool)
        .await
        .is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
