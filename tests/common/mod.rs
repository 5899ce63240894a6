// Common test utilities and helper structs
// Shared across integration test files; tests that use these require a live
// Postgres/Redis configured via .env.test and are #[ignore]d by default.

use std::sync::Arc;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use linkmart_backend_core::{
    app::AppState,
    config::rate_limit::RateLimitingConfig,
    db::{create_diesel_pool, DieselDatabaseConfig, RedisConfig, RedisPool},
    models::{
        assignment::{Assignment, AssignmentStatus, NewAssignment},
        order::{NewOrder, Order, OrderType},
        site::{NewSite, Site},
        user::{NewUser, Role, User},
    },
    services::{JwtService, RateLimitService},
};
use uuid::Uuid;

pub async fn setup_test_state() -> AppState {
    // Load environment for testing
    dotenv::from_filename(".env.test").ok();

    let db_config = DieselDatabaseConfig::default();
    let diesel_pool = create_diesel_pool(db_config).await.unwrap();

    let redis_config = RedisConfig::from_env();
    let redis_pool = RedisPool::new(redis_config).await.unwrap();

    let jwt_service = Arc::new(
        JwtService::from_env_with_diesel(diesel_pool.clone(), redis_pool.clone()).unwrap(),
    );

    AppState {
        config: Arc::new(linkmart_backend_core::app_config::CONFIG.clone()),
        diesel_pool,
        redis_pool: redis_pool.clone(),
        jwt_service,
        rate_limit_service: Arc::new(RateLimitService::new(redis_pool)),
        rate_limit_config: Arc::new(RateLimitingConfig::from_env()),
        max_connections: 10,
    }
}

pub async fn create_test_user(state: &AppState, role: Role) -> User {
    use linkmart_backend_core::schema::users;

    let mut conn = state.diesel_pool.get().await.unwrap();

    let new_user = NewUser {
        email: format!("test-{}-{}@example.com", role, Uuid::new_v4()),
        password_hash: linkmart_backend_core::utils::hash_password("Test-Passw0rd!").unwrap(),
        full_name: format!("Test {}", role),
        role: role.as_str().to_string(),
        phone: None,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .get_result(&mut conn)
        .await
        .unwrap()
}

pub async fn create_test_site(state: &AppState, blogger: &User, gp_price_cents: i64) -> Site {
    use linkmart_backend_core::schema::sites;

    let mut conn = state.diesel_pool.get().await.unwrap();

    let new_site = NewSite {
        id: Uuid::new_v4(),
        blogger_id: blogger.id,
        domain: format!("site-{}.example.com", Uuid::new_v4()),
        da: 50,
        dr: 55,
        referring_domains: 800,
        monthly_traffic: 20000,
        spam_score: 2,
        guest_post_price_cents: gp_price_cents,
        niche_edit_price_cents: gp_price_cents / 2,
        category: Some("technology".to_string()),
        is_active: true,
    };

    diesel::insert_into(sites::table)
        .values(&new_site)
        .get_result(&mut conn)
        .await
        .unwrap()
}

pub async fn create_test_order(state: &AppState, manager: &User, link_count: i32) -> Order {
    use linkmart_backend_core::schema::orders;

    let mut conn = state.diesel_pool.get().await.unwrap();

    let new_order = NewOrder {
        id: Uuid::new_v4(),
        client_name: "Test Client".to_string(),
        order_type: OrderType::GuestPost.as_str().to_string(),
        link_count,
        package: Some("growth".to_string()),
        category: Some("technology".to_string()),
        instructions: None,
        created_by: manager.id,
    };

    diesel::insert_into(orders::table)
        .values(&new_order)
        .get_result(&mut conn)
        .await
        .unwrap()
}

pub async fn create_test_assignment(
    state: &AppState,
    order: &Order,
    status: AssignmentStatus,
) -> Assignment {
    use linkmart_backend_core::schema::assignments;

    let mut conn = state.diesel_pool.get().await.unwrap();

    let draft = NewAssignment {
        id: Uuid::new_v4(),
        order_id: order.id,
        anchor_text: Some("best widgets".to_string()),
        target_url: Some("https://client.example.com/widgets".to_string()),
        price_cents: 0,
        current_status: status.as_str().to_string(),
    };

    diesel::insert_into(assignments::table)
        .values(&draft)
        .get_result(&mut conn)
        .await
        .unwrap()
}

/// Reload a user row to observe wallet changes
pub async fn reload_user(state: &AppState, id: Uuid) -> User {
    let mut conn = state.diesel_pool.get().await.unwrap();
    User::find_by_id(&mut conn, id).await.unwrap()
}

/// Directly set assignment fields that normally accrue through the workflow
pub async fn force_assignment_state(
    state: &AppState,
    assignment_id: Uuid,
    status: AssignmentStatus,
    site_id: Option<Uuid>,
    writer_id: Option<Uuid>,
    blogger_id: Option<Uuid>,
    price_cents: i64,
) {
    use linkmart_backend_core::schema::assignments::dsl;

    let mut conn = state.diesel_pool.get().await.unwrap();

    diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
        .set((
            dsl::current_status.eq(status.as_str()),
            dsl::site_id.eq(site_id),
            dsl::writer_id.eq(writer_id),
            dsl::blogger_id.eq(blogger_id),
            dsl::price_cents.eq(price_cents),
        ))
        .execute(&mut conn)
        .await
        .unwrap();
}
