// Role-scoped route builders for the back office API

pub mod admin;
pub mod auth;
pub mod blogger;
pub mod docs;
pub mod manager;
pub mod team;
pub mod threads;
pub mod wallet;
pub mod writer;

use crate::app::AppState;
use crate::middleware::auth_middleware::require_role;
use crate::models::user::Role;
use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};

async fn require_admin(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Admin, req, next).await
}

async fn require_manager(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Manager, req, next).await
}

async fn require_team(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Team, req, next).await
}

async fn require_writer(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Writer, req, next).await
}

async fn require_blogger(req: Request<Body>, next: Next) -> Response {
    require_role(Role::Blogger, req, next).await
}

// Authentication routes (login/refresh are public, logout/me run behind the
// auth middleware mounted in lib.rs)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
}

pub fn auth_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::get_current_user))
}

// Admin: user provisioning, order views, withdrawal settlement
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(admin::create_user).get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::disable_user),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::get_order))
        .route(
            "/withdrawal-requests",
            get(admin::list_withdrawal_requests),
        )
        .route(
            "/withdrawal-requests/{id}/approve",
            put(admin::approve_withdrawal),
        )
        .route(
            "/withdrawal-requests/{id}/reject",
            put(admin::reject_withdrawal),
        )
        .layer(middleware::from_fn(require_admin))
}

// Manager: order creation and the approval queues
pub fn manager_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            post(manager::create_order).get(manager::list_orders),
        )
        .route("/tasks", get(manager::list_tasks))
        .route("/tasks/{id}/approve", put(manager::approve_task))
        .route("/tasks/{id}/reject", put(manager::reject_task))
        .route("/tasks/{id}/push-to-blogger", post(manager::push_to_blogger))
        .route("/tasks/{id}/final-check", put(manager::move_to_final_check))
        .route("/tasks/{id}/finalize", put(manager::finalize_task))
        .layer(middleware::from_fn(require_manager))
}

// Team: candidate site browsing and draft submission
pub fn team_routes() -> Router<AppState> {
    Router::new()
        .route("/sites", get(team::list_sites))
        .route("/tasks", get(team::list_tasks))
        .route(
            "/tasks/{id}/submit-to-manager",
            post(team::submit_to_manager),
        )
        .layer(middleware::from_fn(require_team))
}

// Writer: writing queue plus wallet access
pub fn writer_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(writer::list_tasks))
        .route("/tasks/{id}/start", put(writer::start_task))
        .route("/tasks/{id}/submit-content", put(writer::submit_content))
        .route("/wallet", get(wallet::get_wallet))
        .route(
            "/withdrawal-requests",
            post(wallet::create_withdrawal).get(wallet::list_withdrawals),
        )
        .layer(middleware::from_fn(require_writer))
}

// Blogger: site inventory, publishing queue, notifications, wallet
pub fn blogger_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/sites",
            post(blogger::create_site).get(blogger::list_sites),
        )
        .route(
            "/sites/{id}",
            get(blogger::get_site)
                .put(blogger::update_site)
                .delete(blogger::delete_site),
        )
        .route("/tasks", get(blogger::list_tasks))
        .route("/tasks/{id}/publish", put(blogger::publish_task))
        .route("/notifications", get(blogger::list_notifications))
        .route(
            "/notifications/{id}/read",
            put(blogger::mark_notification_read),
        )
        .route("/wallet", get(wallet::get_wallet))
        .route(
            "/withdrawal-requests",
            post(wallet::create_withdrawal).get(wallet::list_withdrawals),
        )
        .layer(middleware::from_fn(require_blogger))
}

// Threads: any authenticated role
pub fn thread_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(threads::create_thread).get(threads::list_threads),
        )
        .route("/{id}", get(threads::get_thread))
        .route("/{id}/messages", post(threads::post_message))
        .route("/{id}/status", put(threads::update_status))
}
