// Authentication Handlers for LinkMart Backend
// Login, Refresh, Logout, Me endpoints. Accounts are provisioned by admins,
// so there is no public registration route.

use axum::{
    extract::{ConnectInfo, Extension, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::user::{User, UserError},
    services::rate_limit::RateLimitConfig,
    utils::{auth_errors::AuthError, log_auth_failure, verify_password},
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
    pub user: LoginUserInfo,
}

#[derive(Debug, Serialize)]
pub struct LoginUserInfo {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub wallet_balance_cents: i64,
    pub permissions: Vec<String>,
}

// =============================================================================
// AUTHENTICATION HANDLERS
// =============================================================================

/// POST /auth/login - Authenticate user and return JWT tokens
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    operation_id = "login",
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account inactive"),
        (status = 429, description = "Too many attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(login_req): Json<LoginRequest>,
) -> impl IntoResponse {
    let ip_address = addr.ip().to_string();

    // Validate email format
    let email = login_req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return AuthError::InvalidCredentials.into_response();
    }

    // IP-based rate limiting (X attempts per minute) - if enabled
    let config = crate::app_config::config();
    if config.enable_rate_limiting {
        let ip_rate_key = format!("login:ip:{}", ip_address);
        let ip_rate_config = RateLimitConfig {
            max_requests: config.security.login_rate_limit_per_ip,
            window_seconds: 60,
            block_duration: 60,
        };

        match state
            .rate_limit_service
            .check_rate_limit(&ip_rate_key, &ip_rate_config)
            .await
        {
            Ok(status) if !status.allowed => {
                let err = AuthError::RateLimited {
                    retry_after_seconds: status.retry_after.unwrap_or(60) as u64,
                };
                log_auth_failure(&email, &err);
                return err.into_response();
            },
            Err(e) => {
                tracing::warn!("Rate limit check failed for IP {}: {}", ip_address, e);
            },
            _ => {},
        }
    }

    // Get user from database
    let mut conn = match state.diesel_pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to get database connection: {}", e);
            return AuthError::InternalError.into_response();
        },
    };

    let user = match User::find_by_email(&mut conn, &email).await {
        Ok(user) => user,
        Err(UserError::NotFound) => {
            log_auth_failure(&email, &AuthError::InvalidCredentials);
            return AuthError::InvalidCredentials.into_response();
        },
        Err(e) => {
            tracing::error!("Database error during login: {}", e);
            return AuthError::DatabaseError(e.to_string()).into_response();
        },
    };

    // Email-based rate limiting (only for existing users to prevent abuse)
    if config.enable_rate_limiting {
        let email_rate_key = format!("login:email:{}", email);
        match state
            .rate_limit_service
            .check_rate_limit(&email_rate_key, &config.get_login_rate_limit_config())
            .await
        {
            Ok(status) if !status.allowed => {
                let err = AuthError::RateLimited {
                    retry_after_seconds: status.retry_after.unwrap_or(3600) as u64,
                };
                log_auth_failure(&email, &err);
                return err.into_response();
            },
            Err(e) => {
                tracing::warn!("Rate limit check failed for email {}: {}", email, e);
            },
            _ => {},
        }
    }

    // Soft-disabled accounts cannot log in
    if !user.is_active {
        log_auth_failure(&email, &AuthError::AccountInactive);
        return AuthError::AccountInactive.into_response();
    }

    // Verify password
    match verify_password(&login_req.password, &user.password_hash) {
        Ok(true) => {},
        Ok(false) => {
            log_auth_failure(&email, &AuthError::InvalidCredentials);
            return AuthError::InvalidCredentials.into_response();
        },
        Err(e) => {
            tracing::error!("Password verification error: {}", e);
            return AuthError::InternalError.into_response();
        },
    }

    // Issue token pair
    let access_token = match state.jwt_service.generate_access_token(&user) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Access token generation failed: {}", e);
            return AuthError::TokenError(e.to_string()).into_response();
        },
    };

    let refresh_token = match state
        .jwt_service
        .generate_refresh_token(&user.id.to_string())
        .await
    {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Refresh token generation failed: {}", e);
            return AuthError::TokenError(e.to_string()).into_response();
        },
    };

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let response = LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expiry(),
        token_type: "Bearer".to_string(),
        user: LoginUserInfo {
            id: user.id.to_string(),
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Rotate the refresh token and mint a new pair
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "Auth",
    operation_id = "refreshToken",
    responses(
        (status = 200, description = "Tokens refreshed"),
        (status = 401, description = "Invalid, expired or revoked refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> impl IntoResponse {
    match state.jwt_service.refresh_tokens(&request.refresh_token).await {
        Ok((access_token, refresh_token)) => {
            let response = TokenResponse {
                access_token,
                refresh_token,
                expires_in: state.jwt_service.access_token_expiry(),
                token_type: "Bearer".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        },
        Err(e) => {
            tracing::warn!("Token refresh failed: {}", e);
            AuthError::InvalidToken.into_response()
        },
    }
}

/// POST /auth/logout - Denylist the access token, revoke refresh tokens
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    operation_id = "logout",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    // Denylist the access token for its remaining lifetime
    let now = chrono::Utc::now().timestamp() as u64;
    let ttl = auth_user.exp.saturating_sub(now).max(1);

    if let Err(e) = state.jwt_service.logout_token(&auth_user.token_id, ttl).await {
        tracing::warn!("Failed to denylist token on logout: {}", e);
    }

    match state
        .jwt_service
        .revoke_all_user_tokens(&auth_user.user_id, "logout")
        .await
    {
        Ok(count) => {
            tracing::info!(
                user_id = %auth_user.user_id,
                revoked = count,
                "User logged out"
            );
            let response = AuthResponse::<()> {
                success: true,
                data: None,
                message: "Logged out".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        },
        Err(e) => {
            tracing::error!("Failed to revoke tokens on logout: {}", e);
            AuthError::InternalError.into_response()
        },
    }
}

/// GET /auth/me - Current user profile
#[utoipa::path(
    get,
    path = "/v1/auth/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user info"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    let user_uuid = match auth_user.user_uuid() {
        Some(id) => id,
        None => return AuthError::InvalidToken.into_response(),
    };

    let mut conn = match state.diesel_pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to get database connection: {}", e);
            return AuthError::InternalError.into_response();
        },
    };

    match User::find_by_id(&mut conn, user_uuid).await {
        Ok(user) => {
            let info = UserInfo {
                user_id: user.id.to_string(),
                email: user.email,
                full_name: user.full_name,
                role: user.role,
                wallet_balance_cents: user.wallet_balance_cents,
                permissions: auth_user.permissions,
            };
            let response = AuthResponse {
                success: true,
                data: Some(info),
                message: "OK".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        },
        Err(UserError::NotFound) => AuthError::UserNotFound.into_response(),
        Err(e) => {
            tracing::error!("Database error in get_current_user: {}", e);
            AuthError::InternalError.into_response()
        },
    }
}
