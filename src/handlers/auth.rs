// handlers/auth.rs - POST /api/auth/login, POST /api/auth/logout, GET /api/auth/verify

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::cookie::{admin_token, AdminCookie};
use crate::auth::AuthError;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// POST /api/auth/login - exchange the admin password for a session cookie
///
/// ```json
/// { "password": "string" }
/// ```
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::invalid_json(e.body_text()))?;
    let password = match body.get("password") {
        Some(Value::String(password)) if !password.trim().is_empty() => password,
        _ => return Err(ApiError::bad_request("Password is required")),
    };

    let issued = state.tokens.issue(password).map_err(|e| {
        if e == AuthError::InvalidCredentials {
            warn!("Rejected admin login attempt");
        }
        ApiError::from(e)
    })?;
    info!("Admin logged in");

    let cookie = AdminCookie::session(&issued.token, state.secure_cookies());
    let data = json!({
        "authenticated": true,
        "expires_at": issued.claims.expires_at(),
    });
    Ok(([(header::SET_COOKIE, cookie.header_value())], ApiResponse::success(data)).into_response())
}

/// POST /api/auth/logout - clear the session cookie
///
/// The token itself stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = AdminCookie::cleared(state.secure_cookies());
    (
        [(header::SET_COOKIE, cookie.header_value())],
        ApiResponse::success(json!({ "authenticated": false })),
    )
        .into_response()
}

/// GET /api/auth/verify - report whether the request carries a valid admin cookie
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.tokens.verify(admin_token(&headers)) {
        Ok(claims) => Json(json!({
            "authenticated": true,
            "expires_at": claims.expires_at(),
        }))
        .into_response(),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "authenticated": false,
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}
