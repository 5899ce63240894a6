// API Documentation handlers
pub mod swagger_ui;

use crate::app::AppState;
use crate::app_config::AppConfig;
use axum::{
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{self, json};

/// Serve OpenAPI JSON specification at /v1/docs/openapi.json
pub async fn serve_openapi_spec(State(app_state): State<AppState>) -> Response {
    let spec = build_openapi_spec(app_state.config.as_ref());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&spec).unwrap_or_default(),
    )
        .into_response()
}

/// Redirect /docs to /docs/ for proper relative path resolution
pub async fn redirect_to_docs(original_uri: OriginalUri) -> impl IntoResponse {
    let mut path = original_uri.0.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, path)]).into_response()
}

/// Re-export swagger UI handler
pub use swagger_ui::serve_swagger_ui;

fn op(tag: &str, summary: &str, secured: bool) -> serde_json::Value {
    let mut operation = json!({
        "tags": [tag],
        "summary": summary,
        "responses": {
            "200": { "description": "Success" },
            "400": { "description": "Validation error" },
            "401": { "description": "Unauthorized" }
        }
    });
    if secured {
        operation["security"] = json!([{ "bearerAuth": [] }]);
    }
    operation
}

/// Build the complete OpenAPI specification
pub fn build_openapi_spec(config: &AppConfig) -> serde_json::Value {
    let api_url = std::env::var("PUBLIC_API_URL").unwrap_or_else(|_| {
        match config.environment {
            crate::app_config::Environment::Production => "https://api.linkmart.io".to_string(),
            crate::app_config::Environment::Staging => "https://s-api.linkmart.io".to_string(),
            _ => format!("http://localhost:{}", config.port),
        }
    });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "LinkMart Backend API",
            "description": "Content-marketplace back office: orders, assignment workflow, wallets, withdrawals and support threads",
            "version": "1.0.0"
        },
        "servers": [{
            "url": api_url,
            "description": format!("Current server ({})", config.environment)
        }],
        "tags": [
            { "name": "Auth", "description": "Authentication and session management" },
            { "name": "Admin", "description": "User provisioning, order views, withdrawal settlement" },
            { "name": "Manager", "description": "Order creation and approval queues" },
            { "name": "Team", "description": "Site selection and draft submission" },
            { "name": "Writer", "description": "Writing queue" },
            { "name": "Blogger", "description": "Site inventory, publishing, notifications" },
            { "name": "Wallet", "description": "Balances and withdrawal requests" },
            { "name": "Threads", "description": "Support threads" },
            { "name": "Health", "description": "Service health checks" }
        ],
        "paths": {
            "/api/v1/auth/login": { "post": op("Auth", "Authenticate and receive a token pair", false) },
            "/api/v1/auth/refresh": { "post": op("Auth", "Rotate the refresh token", false) },
            "/api/v1/auth/logout": { "post": op("Auth", "Revoke the current session", true) },
            "/api/v1/auth/me": { "get": op("Auth", "Current user profile", true) },
            "/api/v1/admin/users": {
                "get": op("Admin", "List users", true),
                "post": op("Admin", "Create a user with a role", true)
            },
            "/api/v1/admin/users/{id}": {
                "get": op("Admin", "Get user", true),
                "put": op("Admin", "Update user", true),
                "delete": op("Admin", "Soft-disable user", true)
            },
            "/api/v1/admin/orders": { "get": op("Admin", "List all orders", true) },
            "/api/v1/admin/orders/{id}": { "get": op("Admin", "Order with assignments", true) },
            "/api/v1/admin/withdrawal-requests": { "get": op("Admin", "Pending withdrawal requests", true) },
            "/api/v1/admin/withdrawal-requests/{id}/approve": { "put": op("Admin", "Approve withdrawal (remarks required, wallet debited)", true) },
            "/api/v1/admin/withdrawal-requests/{id}/reject": { "put": op("Admin", "Reject withdrawal (reason required)", true) },
            "/api/v1/manager/orders": {
                "get": op("Manager", "Own orders", true),
                "post": op("Manager", "Create order with N draft assignments", true)
            },
            "/api/v1/manager/tasks": { "get": op("Manager", "Task queue filtered by status", true) },
            "/api/v1/manager/tasks/{id}/approve": { "put": op("Manager", "Approve site selection, assign writer", true) },
            "/api/v1/manager/tasks/{id}/reject": { "put": op("Manager", "Reject with mandatory reason", true) },
            "/api/v1/manager/tasks/{id}/push-to-blogger": { "post": op("Manager", "Route approved content to the site owner", true) },
            "/api/v1/manager/tasks/{id}/final-check": { "put": op("Manager", "Stage for final check", true) },
            "/api/v1/manager/tasks/{id}/finalize": { "put": op("Manager", "Settle and credit the blogger wallet (idempotent)", true) },
            "/api/v1/team/sites": { "get": op("Team", "Active sites with metric filters", true) },
            "/api/v1/team/tasks": { "get": op("Team", "Draft assignments", true) },
            "/api/v1/team/tasks/{id}/submit-to-manager": { "post": op("Team", "Select site and submit draft", true) },
            "/api/v1/writer/tasks": { "get": op("Writer", "Assigned tasks", true) },
            "/api/v1/writer/tasks/{id}/start": { "put": op("Writer", "Begin writing", true) },
            "/api/v1/writer/tasks/{id}/submit-content": { "put": op("Writer", "Submit content", true) },
            "/api/v1/blogger/sites": {
                "get": op("Blogger", "Own sites", true),
                "post": op("Blogger", "Register a site", true)
            },
            "/api/v1/blogger/sites/{id}": {
                "get": op("Blogger", "Get site", true),
                "put": op("Blogger", "Update site", true),
                "delete": op("Blogger", "Delete site", true)
            },
            "/api/v1/blogger/tasks": { "get": op("Blogger", "Publishing queue", true) },
            "/api/v1/blogger/tasks/{id}/publish": { "put": op("Blogger", "Publish and submit live URL", true) },
            "/api/v1/blogger/notifications": { "get": op("Blogger", "Notification feed", true) },
            "/api/v1/blogger/notifications/{id}/read": { "put": op("Blogger", "Mark notification read", true) },
            "/api/v1/blogger/wallet": { "get": op("Wallet", "Wallet summary", true) },
            "/api/v1/blogger/withdrawal-requests": {
                "get": op("Wallet", "Own withdrawal history", true),
                "post": op("Wallet", "Request a payout", true)
            },
            "/api/v1/writer/wallet": { "get": op("Wallet", "Wallet summary", true) },
            "/api/v1/writer/withdrawal-requests": {
                "get": op("Wallet", "Own withdrawal history", true),
                "post": op("Wallet", "Request a payout", true)
            },
            "/api/v1/threads": {
                "get": op("Threads", "Own threads", true),
                "post": op("Threads", "Open a thread", true)
            },
            "/api/v1/threads/{id}": { "get": op("Threads", "Thread with messages", true) },
            "/api/v1/threads/{id}/messages": { "post": op("Threads", "Append a message", true) },
            "/api/v1/threads/{id}/status": { "put": op("Threads", "Set thread status", true) },
            "/api/v1/health": { "get": op("Health", "Liveness with component checks", false) }
        },
        "components": {
            "securitySchemes": {
                "bearerAuth": {
                    "type": "http",
                    "scheme": "bearer",
                    "bearerFormat": "JWT",
                    "description": "JWT access token obtained from login or refresh endpoints"
                }
            }
        }
    })
}
