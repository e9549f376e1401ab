//! Authentication and admin-role middleware for protected endpoints.
//!
//! The auth middleware extracts and validates JWT access tokens from the
//! Authorization header, then injects the authenticated context into request
//! extensions for downstream handlers. The admin middleware runs after it
//! and rejects requests whose token lacks the admin claim.
//!
//! # Extracting the authenticated user
//!
//! In handler functions, extract the context from request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use ma_server::api::middleware::AuthContext;
//!
//! async fn protected_handler(Extension(ctx): Extension<AuthContext>) -> String {
//!     format!("Authenticated as user {}", ctx.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use super::AppState;

/// Authenticated request context injected by [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
    pub is_admin: bool,
}

/// Authentication middleware that validates JWT tokens and injects the
/// authenticated context.
///
/// Extracts the JWT access token from the `Authorization: Bearer <token>`
/// header and validates it using the AuthManager.
///
/// # Behavior
///
/// - **Success**: Token valid → Injects [`AuthContext`] into request
///   extensions → Calls next handler
/// - **Missing header**: Returns `401 Unauthorized`
/// - **Invalid format**: Returns `401 Unauthorized`
/// - **Invalid/expired token**: Returns `401 Unauthorized`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Extract token from Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let token = match auth_header {
        Some(t) => t,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    // Verify token and inject the authenticated context
    match state.auth_manager.verify_access_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthContext {
                user_id: claims.sub,
                email: claims.email,
                is_admin: claims.is_admin,
            });
            Ok(next.run(request).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Admin guard, layered after [`auth_middleware`].
///
/// Requires the token's admin claim; the claim is only ever issued to emails
/// on the configured allowlist.
///
/// # Behavior
///
/// - **Admin token**: Calls next handler
/// - **Non-admin token**: Returns `403 Forbidden`
/// - **No auth context** (middleware ordering bug): Returns `401 Unauthorized`
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    match request.extensions().get::<AuthContext>() {
        Some(ctx) if ctx.is_admin => Ok(next.run(request).await),
        Some(_) => Err(StatusCode::FORBIDDEN),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}
