// Admin Handlers - user provisioning, order views, withdrawal settlement

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        assignment::Assignment,
        order::Order,
        user::{NewUser, Role, User, UserUpdate},
        withdrawal::WithdrawalDecisionRequest,
    },
    services::wallet::WalletService,
    utils::{
        hash_password,
        pagination::{Paginated, Pagination},
        service_error::ServiceError,
        trim_optional_field,
    },
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 320, message = "Email must be less than 320 characters"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: String,

    pub role: Role,

    #[validate(length(max = 50, message = "Phone must be less than 50 characters"))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name: Option<String>,

    #[validate(length(max = 50, message = "Phone must be less than 50 characters"))]
    pub phone: Option<String>,

    pub is_active: Option<bool>,
}

/// User row without the password hash
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub wallet_balance_cents: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            phone: user.phone,
            is_active: user.is_active,
            wallet_balance_cents: user.wallet_balance_cents,
            created_at: user.created_at,
        }
    }
}

/// Order with its assignments for the admin order viewer
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub assignments: Vec<Assignment>,
}

// =============================================================================
// USER MANAGEMENT
// =============================================================================

/// Create a user account with a role
/// POST /api/v1/admin/users
#[utoipa::path(
    post,
    path = "/v1/admin/users",
    tag = "Admin",
    operation_id = "createUser",
    request_body = CreateUserRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ServiceError::InternalError
    })?;

    let new_user = NewUser {
        email: request.email.trim().to_lowercase(),
        password_hash,
        full_name: request.full_name.trim().to_string(),
        role: request.role.as_str().to_string(),
        phone: trim_optional_field(request.phone.as_ref()),
    };

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let user = User::create(&mut conn, new_user).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User provisioned");

    Ok((StatusCode::CREATED, Json(UserView::from(user))))
}

/// List users, newest first
/// GET /api/v1/admin/users
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    operation_id = "listUsers",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Paginated users")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::users::dsl;
    use diesel::dsl::count_star;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let total: i64 = dsl::users.select(count_star()).first(&mut conn).await?;

    let rows: Vec<User> = dsl::users
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    let data: Vec<UserView> = rows.into_iter().map(UserView::from).collect();
    Ok(Json(Paginated::new(data, &pagination, total)))
}

/// Get one user
/// GET /api/v1/admin/users/:id
#[utoipa::path(
    get,
    path = "/v1/admin/users/{id}",
    tag = "Admin",
    operation_id = "getUser",
    params(("id" = Uuid, Path, description = "User ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "User", body = UserView),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let user = User::find_by_id(&mut conn, user_id).await?;
    Ok(Json(UserView::from(user)))
}

/// Update user profile fields
/// PUT /api/v1/admin/users/:id
#[utoipa::path(
    put,
    path = "/v1/admin/users/{id}",
    tag = "Admin",
    operation_id = "updateUser",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated user", body = UserView),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let update = UserUpdate {
        full_name: request.full_name.map(|s| s.trim().to_string()),
        phone: request.phone.map(|p| {
            let trimmed = p.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }),
        is_active: request.is_active,
        ..Default::default()
    };

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let user = User::update(&mut conn, user_id, update).await?;
    Ok(Json(UserView::from(user)))
}

/// Soft-disable a user (no hard delete, referential history preserved)
/// DELETE /api/v1/admin/users/:id
#[utoipa::path(
    delete,
    path = "/v1/admin/users/{id}",
    tag = "Admin",
    operation_id = "disableUser",
    params(("id" = Uuid, Path, description = "User ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "User disabled", body = UserView),
        (status = 404, description = "Not found")
    )
)]
pub async fn disable_user(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let user = User::disable(&mut conn, user_id).await?;

    // Disabled users lose their sessions immediately
    if let Err(e) = state
        .jwt_service
        .revoke_all_user_tokens(&user_id.to_string(), "account_disabled")
        .await
    {
        tracing::warn!("Failed to revoke tokens for disabled user: {}", e);
    }

    tracing::info!(user_id = %user_id, "User soft-disabled");

    Ok(Json(UserView::from(user)))
}

// =============================================================================
// ORDER VIEWS
// =============================================================================

/// List all orders
/// GET /api/v1/admin/orders
#[utoipa::path(
    get,
    path = "/v1/admin/orders",
    tag = "Admin",
    operation_id = "adminListOrders",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Paginated orders")
    )
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::orders::dsl;
    use diesel::dsl::count_star;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let total: i64 = dsl::orders.select(count_star()).first(&mut conn).await?;

    let rows: Vec<Order> = dsl::orders
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Order detail with its assignments
/// GET /api/v1/admin/orders/:id
#[utoipa::path(
    get,
    path = "/v1/admin/orders/{id}",
    tag = "Admin",
    operation_id = "adminGetOrder",
    params(("id" = Uuid, Path, description = "Order ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Order with assignments", body = OrderDetail),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let order = Order::find_by_id(&mut conn, order_id).await?;
    let assignments = Assignment::find_by_order(&mut conn, order_id).await?;

    Ok(Json(OrderDetail { order, assignments }))
}

// =============================================================================
// WITHDRAWAL SETTLEMENT
// =============================================================================

/// Pending withdrawal requests
/// GET /api/v1/admin/withdrawal-requests
#[utoipa::path(
    get,
    path = "/v1/admin/withdrawal-requests",
    tag = "Admin",
    operation_id = "listWithdrawalRequests",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Paginated pending requests")
    )
)]
pub async fn list_withdrawal_requests(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    let service = WalletService::new(&state);
    let (rows, total) = service
        .list_pending(pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Approve a withdrawal: mandatory remarks, wallet debited, clearance date set
/// PUT /api/v1/admin/withdrawal-requests/:id/approve
#[utoipa::path(
    put,
    path = "/v1/admin/withdrawal-requests/{id}/approve",
    tag = "Admin",
    operation_id = "approveWithdrawal",
    params(("id" = Uuid, Path, description = "Withdrawal request ID")),
    request_body = WithdrawalDecisionRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Request paid"),
        (status = 400, description = "Missing remarks"),
        (status = 409, description = "Already settled")
    )
)]
pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    Json(request): Json<WithdrawalDecisionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let service = WalletService::new(&state);
    let settled = service
        .approve_withdrawal(request_id, &request.remarks)
        .await?;

    tracing::info!(
        request_id = %request_id,
        admin = %auth_user.user_id,
        "Withdrawal approved"
    );

    Ok(Json(settled))
}

/// Reject a withdrawal: mandatory reason, no balance change
/// PUT /api/v1/admin/withdrawal-requests/:id/reject
#[utoipa::path(
    put,
    path = "/v1/admin/withdrawal-requests/{id}/reject",
    tag = "Admin",
    operation_id = "rejectWithdrawal",
    params(("id" = Uuid, Path, description = "Withdrawal request ID")),
    request_body = WithdrawalDecisionRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Request rejected"),
        (status = 400, description = "Missing reason"),
        (status = 409, description = "Already settled")
    )
)]
pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    Json(request): Json<WithdrawalDecisionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let service = WalletService::new(&state);
    let rejected = service
        .reject_withdrawal(request_id, &request.remarks)
        .await?;

    tracing::info!(
        request_id = %request_id,
        admin = %auth_user.user_id,
        "Withdrawal rejected"
    );

    Ok(Json(rejected))
}
