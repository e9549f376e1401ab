//! Activation code API handlers.
//!
//! Redemption is available to any authenticated student and grants `pro` for
//! the code's duration; the atomicity guarantees live in the manager. Batch
//! generation, listing, and purging are admin-only.

use axum::{
    Json,
    extract::{Extension, Query, State},
    http::StatusCode,
};
use medacademy::activation::{ActivationCode, ActivationError, Redemption};
use serde::Deserialize;

use super::{AppState, ErrorResponse, middleware::AuthContext};
use crate::{logging, metrics};

/// Default and maximum rows for the admin code listing
const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct RedeemPayload {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateBatchPayload {
    pub count: u32,
    pub days: i32,
}

#[derive(Debug, Deserialize)]
pub struct ListCodesQuery {
    pub limit: Option<i64>,
}

fn activation_status(err: &ActivationError) -> StatusCode {
    match err {
        ActivationError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ActivationError::CodeNotFound => StatusCode::NOT_FOUND,
        ActivationError::CodeAlreadyUsed => StatusCode::CONFLICT,
        ActivationError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        ActivationError::InvalidBatch(_) => StatusCode::BAD_REQUEST,
    }
}

/// Redeem an activation code for the authenticated student.
///
/// On success the student holds a timed `pro` subscription; the response
/// carries the grant length and the computed expiry.
///
/// # Request Body
///
/// ```json
/// {"code": "MED-A7K2-P9QX-W4RM"}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No such code, or the student has no profile
/// - `409 Conflict`: Code was already consumed
pub async fn redeem(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<RedeemPayload>,
) -> Result<Json<Redemption>, (StatusCode, Json<ErrorResponse>)> {
    let code = payload.code.trim();

    match state.activation.redeem(code, ctx.user_id).await {
        Ok(redemption) => {
            metrics::code_redemptions_total(true);
            logging::log_security_event(
                "code_redeemed",
                Some(ctx.user_id),
                &format!("granted pro for {} days", redemption.days),
            );
            Ok(Json(redemption))
        }
        Err(e) => {
            metrics::code_redemptions_total(false);
            Err((activation_status(&e), ErrorResponse::new(e.client_message())))
        }
    }
}

/// Generate a batch of fresh activation codes (admin).
///
/// # Request Body
///
/// ```json
/// {"count": 50, "days": 30}
/// ```
///
/// # Response
///
/// Returns `201 Created` with the full batch, codes included. This is the
/// only time the plaintext batch is handed out together, so admins should
/// export it immediately.
///
/// # Errors
///
/// - `400 Bad Request`: Count outside 1-500 or non-positive days
pub async fn generate_codes(
    State(state): State<AppState>,
    Json(payload): Json<GenerateBatchPayload>,
) -> Result<(StatusCode, Json<Vec<ActivationCode>>), (StatusCode, Json<ErrorResponse>)> {
    match state
        .activation
        .generate_batch(payload.count, payload.days)
        .await
    {
        Ok(codes) => Ok((StatusCode::CREATED, Json(codes))),
        Err(e) => Err((activation_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// List recently created codes (admin).
///
/// # Query Parameters
///
/// - `limit` - Maximum rows to return (default 100, capped at 1000)
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/v1/admin/activation/codes?limit=20 \
///   -H "Authorization: Bearer <admin token>"
/// ```
pub async fn list_codes(
    State(state): State<AppState>,
    Query(query): Query<ListCodesQuery>,
) -> Result<Json<Vec<ActivationCode>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    match state.activation.list_codes(limit).await {
        Ok(codes) => Ok(Json(codes)),
        Err(e) => Err((activation_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Delete all consumed codes (admin). Issued, unredeemed codes are kept.
///
/// # Response
///
/// ```json
/// {"removed": 42}
/// ```
pub async fn purge_redeemed(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    match state.activation.purge_redeemed().await {
        Ok(removed) => Ok(Json(serde_json::json!({ "removed": removed }))),
        Err(e) => Err((activation_status(&e), ErrorResponse::new(e.client_message()))),
    }
}
