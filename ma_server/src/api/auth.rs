//! Authentication API handlers.
//!
//! This module provides HTTP REST endpoints for account management including:
//! - Registration with email, password, and display name
//! - Login with email/password (rate limited per email)
//! - Logout to invalidate refresh tokens
//! - Token refresh for obtaining new access tokens
//!
//! All endpoints return JSON responses with either authentication tokens or
//! error messages. Error bodies carry the domain error's client-safe message,
//! so "unknown email", "wrong password", and "weak password" stay
//! distinguishable for the client.
//!
//! # Examples
//!
//! Register a new account:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "student@example.com", "password": "SecurePass123", "display_name": "Student One"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "student@example.com", "password": "SecurePass123"}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use medacademy::auth::{AuthError, LoginRequest, RegisterRequest};
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorResponse};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
    pub email: String,
}

/// Map an auth error to the status code the client should see
fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Database(_) | AuthError::HashingFailed | AuthError::JwtError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AuthError::InvalidPassword
        | AuthError::UserNotFound
        | AuthError::SessionExpired
        | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
        AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AuthError::EmailTaken | AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

/// Register a new account and automatically log it in.
///
/// Creates the account plus its default free-tier profile, then immediately
/// generates authentication tokens.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "student@example.com",
///   "password": "SecurePass123",
///   "display_name": "Student One",
///   "phone": "0100000000"  // Optional
/// }
/// ```
///
/// # Response
///
/// On success, returns `200 OK` with authentication tokens:
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiIs...",
///   "refresh_token": "0b7c5c9e-...",
///   "user_id": 42,
///   "email": "student@example.com"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered, malformed email, or weak password
/// - `500 Internal Server Error`: Server error during registration or login
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = RegisterRequest {
        email: payload.email.clone(),
        password: payload.password.clone(),
        display_name: payload.display_name,
        phone: payload.phone,
    };

    match state.auth_manager.register(request).await {
        Ok(_user) => {
            metrics::registrations_total();

            // Login to generate tokens
            let login_request = LoginRequest {
                email: payload.email,
                password: payload.password,
            };

            match state.auth_manager.login(login_request).await {
                Ok((user, tokens)) => Ok(Json(AuthResponse {
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                    user_id: user.id,
                    email: user.email,
                })),
                Err(e) => Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(e.client_message()),
                )),
            }
        }
        Err(e) => Err((auth_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Authenticate a user and generate session tokens.
///
/// Validates credentials and returns JWT access and refresh tokens. Access
/// tokens are short-lived (15 minutes); refresh tokens last 7 days and are
/// rotated on every refresh.
///
/// # Request Body
///
/// ```json
/// {
///   "email": "student@example.com",
///   "password": "SecurePass123"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or incorrect password (distinct messages)
/// - `429 Too Many Requests`: Too many attempts for this email
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    // Per-email sliding window; checked before any database work
    let allowed = state
        .login_limiter
        .lock()
        .expect("login limiter lock poisoned")
        .check(&payload.email);
    if !allowed {
        metrics::rate_limit_hits_total("login");
        let err = AuthError::RateLimited;
        return Err((auth_status(&err), ErrorResponse::new(err.client_message())));
    }

    let request = LoginRequest {
        email: payload.email,
        password: payload.password,
    };

    match state.auth_manager.login(request).await {
        Ok((user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(Json(AuthResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                user_id: user.id,
                email: user.email,
            }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            logging::log_security_event("failed_login", None, &e.to_string());
            Err((auth_status(&e), ErrorResponse::new(e.client_message())))
        }
    }
}

/// Logout and invalidate the current refresh token.
///
/// Terminates the session by invalidating the refresh token in the database.
/// The access token will continue to work until it expires naturally.
///
/// # Request Body
///
/// ```json
/// "0b7c5c9e-..."  // Refresh token string
/// ```
///
/// # Response
///
/// On success, returns `204 No Content` with empty body.
pub async fn logout(
    State(state): State<AppState>,
    Json(refresh_token): Json<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.auth_manager.logout(refresh_token).await {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((auth_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Refresh an expired access token using a valid refresh token.
///
/// The old refresh token is invalidated and replaced (rotation helps detect
/// token theft).
///
/// # Request Body
///
/// ```json
/// "0b7c5c9e-..."  // Refresh token string
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or revoked refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(old_refresh_token): Json<String>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.auth_manager.refresh_token(old_refresh_token).await {
        Ok(tokens) => match state.auth_manager.verify_access_token(&tokens.access_token) {
            Ok(claims) => Ok(Json(AuthResponse {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                user_id: claims.sub,
                email: claims.email,
            })),
            Err(e) => Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(e.client_message()),
            )),
        },
        Err(e) => Err((auth_status(&e), ErrorResponse::new(e.client_message()))),
    }
}
