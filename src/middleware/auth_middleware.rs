// Authentication middleware for protected routes
// Validates JWT tokens and injects AuthenticatedUser into request extensions.
// Role guards wrap role-scoped routers so a blogger token can never reach a
// manager endpoint.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::{app::AppState, middleware::auth::AuthenticatedUser, models::user::Role};

/// Middleware function that validates JWT tokens and adds AuthenticatedUser to extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // Extract the Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Missing or invalid authorization header"
                })),
            )
                .into_response();
        },
    };

    // Validate the token using JwtService from AppState
    let claims = match app_state.jwt_service.validate_access_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("JWT validation failed: {}", e);
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Invalid or expired token"
                })),
            )
                .into_response();
        },
    };

    // Logged-out tokens are denylisted until natural expiry
    match app_state.jwt_service.is_token_denylisted(&claims.jti).await {
        Ok(false) => {},
        Ok(true) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "success": false,
                    "message": "Token has been revoked"
                })),
            )
                .into_response();
        },
        Err(e) => {
            // Redis unavailable: fail open for availability, the token
            // signature was already verified
            tracing::warn!("Denylist check failed: {}", e);
        },
    }

    let auth_user = AuthenticatedUser {
        user_id: claims.sub,
        token_id: claims.jti,
        email: claims.email,
        role: claims.role,
        permissions: claims.scope,
        exp: claims.exp,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Role guard layered inside role-scoped routers, after auth_middleware
pub async fn require_role(required: Role, request: Request<Body>, next: Next) -> Response {
    let authorized = request
        .extensions()
        .get::<AuthenticatedUser>()
        .and_then(|u| u.role_enum())
        .map(|role| role == required)
        .unwrap_or(false);

    if !authorized {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "message": format!("This endpoint requires the {} role", required)
            })),
        )
            .into_response();
    }

    next.run(request).await
}

/// Extractor for AuthenticatedUser from request extensions
/// This allows handlers to use Extension<AuthenticatedUser> in their parameters
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "success": false,
                        "message": "Authentication required"
                    })),
                )
            })
    }
}
