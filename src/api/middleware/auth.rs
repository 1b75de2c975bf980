//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, validates it against the
//! session registry, and injects `AuthContext` into request extensions for
//! downstream handlers.

use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};

/// Require a valid session token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension
/// layer). On success: injects `AuthContext` and marks the response
/// uncacheable.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let (user_id, role) = ctx
        .state
        .validate_session(&token)?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(AuthContext { user_id, role });

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));
    Ok(response)
}
