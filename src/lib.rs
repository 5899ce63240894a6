// Library exports for LinkMart Backend
// This file exposes modules and functions for library consumers
#![recursion_limit = "256"]

pub mod app;
pub mod app_config;
pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use config::{PermissionConfig, RateLimitingConfig};
pub use db::{DieselDatabaseConfig, DieselPool, RedisConfig, RedisPool};
pub use middleware::auth_middleware;
pub use middleware::AuthenticatedUser;
pub use models::assignment::{AssignmentStatus, TransitionError, WorkflowAction};
pub use models::auth::{AccessTokenClaims, RefreshTokenClaims};
pub use models::refresh_token::{RefreshToken, RefreshTokenError};
pub use models::user::Role;
pub use services::{
    Actor, JwtConfig, JwtError, JwtService, RateLimitConfig, RateLimitResult, RateLimitService,
    ThreadService, WalletService, WorkflowService,
};

// Re-export handler route builders
pub use handlers::{
    admin_routes, auth_protected_routes, auth_routes, blogger_routes, manager_routes,
    team_routes, thread_routes, writer_routes,
};

// Diesel database pool type alias
use bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

pub type DbPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

// Library initialization function for external consumers
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error>> {
    use std::sync::Arc;
    use tracing::info;

    // Load environment
    dotenv::dotenv().ok();

    // Initialize config
    let config = app_config::config();

    // Initialize database pool
    info!("Initializing database pool...");
    let db_config = db::DieselDatabaseConfig::default();
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    // Run migrations if enabled
    if migrations::should_run_migrations() {
        info!("Running embedded migrations...");
        let migration_config = migrations::MigrationConfig::default();
        migrations::run_all_migrations(&diesel_pool, migration_config)
            .await
            .map_err(|e| format!("Migration failed: {}", e))?;
    }

    // Initialize Redis pool
    info!("Initializing Redis pool...");
    let redis_config = RedisConfig::from_env();
    let redis_pool = RedisPool::new(redis_config).await?;

    // Initialize services
    let rate_limit_config = Arc::new(RateLimitingConfig::from_env());
    let rate_limit_service = Arc::new(RateLimitService::new(redis_pool.clone()));

    let jwt_service = Arc::new(JwtService::from_env_with_diesel(
        diesel_pool.clone(),
        redis_pool.clone(),
    )?);

    // Create app state
    Ok(AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        redis_pool,
        jwt_service,
        rate_limit_service,
        rate_limit_config,
        max_connections,
    })
}

/// Assemble the full application router
pub fn build_router(state: AppState) -> axum::Router {
    use axum::middleware as axum_middleware;
    use axum::routing::get;
    use axum::Router;
    use tower_http::trace::TraceLayer;

    // Everything behind bearer auth; role guards sit inside each namespace
    let protected = Router::new()
        .nest("/auth", handlers::auth_protected_routes())
        .nest("/admin", handlers::admin_routes())
        .nest("/manager", handlers::manager_routes())
        .nest("/team", handlers::team_routes())
        .nest("/writer", handlers::writer_routes())
        .nest("/blogger", handlers::blogger_routes())
        .nest("/threads", handlers::thread_routes())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware::auth_middleware,
        ));

    let mut api = Router::new()
        .nest("/auth", handlers::auth_routes())
        .merge(protected)
        .route("/health", get(health_check));

    if state.config.enable_swagger_ui {
        api = api
            .route("/docs", get(handlers::docs::redirect_to_docs))
            .route("/docs/", get(handlers::docs::serve_swagger_ui))
            .route(
                "/docs/openapi.json",
                get(handlers::docs::serve_openapi_spec),
            );
    }

    Router::new()
        .nest("/api/v1", api)
        .layer(axum_middleware::from_fn(
            middleware::cors::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::http::StatusCode;
    use axum::Json;

    let mut overall_healthy = true;
    let timestamp = chrono::Utc::now().to_rfc3339();

    // Check PostgreSQL
    let postgres_health = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(_) => serde_json::json!({
            "status": "healthy",
            "max_connections": state.max_connections,
            "error": null
        }),
        Err(e) => {
            overall_healthy = false;
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            })
        }
    };

    // Check Redis
    let redis_health_result = state.redis_pool.health_check().await;
    if !redis_health_result.is_healthy {
        overall_healthy = false;
    }

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "linkmart-backend",
        "timestamp": timestamp,
        "components": {
            "postgresql": postgres_health,
            "redis": serde_json::json!({
                "status": if redis_health_result.is_healthy { "healthy" } else { "unhealthy" },
                "latency_ms": redis_health_result.latency_ms,
                "error": redis_health_result.error
            })
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
