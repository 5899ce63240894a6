// Manager Handlers - order creation and the two approval queues

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        assignment::{Assignment, AssignmentStatus, NewAssignment},
        order::{CreateOrderRequest, NewOrder, Order},
    },
    services::workflow::{Actor, WorkflowService},
    utils::{
        pagination::{Paginated, Pagination},
        service_error::ServiceError,
        trim_optional_field,
    },
};

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ApproveTaskRequest {
    pub writer_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RejectTaskRequest {
    #[validate(length(min = 1, max = 2000, message = "A rejection reason is required"))]
    pub reason: String,
}

// Flattening Pagination into a Query struct breaks number parsing in
// serde_urlencoded, so the fields are spelled out here.
#[derive(Debug, Deserialize)]
pub struct TaskQueueParams {
    /// Optional queue filter, e.g. pending_manager_approval_1
    pub status: Option<String>,

    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TaskQueueParams {
    fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(20),
        }
    }
}

fn actor(auth_user: &AuthenticatedUser) -> Result<Actor, ServiceError> {
    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;
    let role = auth_user.role_enum().ok_or(ServiceError::Unauthorized)?;
    Ok(Actor { user_id, role })
}

// =============================================================================
// ORDERS
// =============================================================================

/// Create an order; one draft assignment is spawned per requested link
/// POST /api/v1/manager/orders
#[utoipa::path(
    post,
    path = "/v1/manager/orders",
    tag = "Manager",
    operation_id = "createOrder",
    request_body = CreateOrderRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Order created with draft assignments"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let new_order = NewOrder {
        id: Uuid::new_v4(),
        client_name: request.client_name.trim().to_string(),
        order_type: request.order_type.as_str().to_string(),
        link_count: request.link_count,
        package: trim_optional_field(request.package.as_ref()),
        category: trim_optional_field(request.category.as_ref()),
        instructions: trim_optional_field(request.instructions.as_ref()),
        created_by: actor.user_id,
    };

    let order: Order = {
        use crate::schema::orders::dsl;
        diesel::insert_into(dsl::orders)
            .values(&new_order)
            .get_result(&mut conn)
            .await?
    };

    // One assignment per requested backlink, all starting in draft
    let drafts: Vec<NewAssignment> = (0..order.link_count)
        .map(|_| NewAssignment {
            id: Uuid::new_v4(),
            order_id: order.id,
            anchor_text: None,
            target_url: None,
            price_cents: 0,
            current_status: AssignmentStatus::Draft.as_str().to_string(),
        })
        .collect();

    let assignments: Vec<Assignment> = {
        use crate::schema::assignments::dsl;
        diesel::insert_into(dsl::assignments)
            .values(&drafts)
            .get_results(&mut conn)
            .await?
    };

    tracing::info!(
        order_id = %order.id,
        link_count = order.link_count,
        "Order created"
    );

    Ok((
        StatusCode::CREATED,
        Json(crate::handlers::admin::OrderDetail { order, assignments }),
    ))
}

/// Orders created by this manager
/// GET /api/v1/manager/orders
#[utoipa::path(
    get,
    path = "/v1/manager/orders",
    tag = "Manager",
    operation_id = "managerListOrders",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated orders"))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::orders::dsl;
    use diesel::dsl::count_star;

    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let total: i64 = dsl::orders
        .filter(dsl::created_by.eq(actor.user_id))
        .select(count_star())
        .first(&mut conn)
        .await?;

    let rows: Vec<Order> = dsl::orders
        .filter(dsl::created_by.eq(actor.user_id))
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

// =============================================================================
// TASK QUEUES AND TRANSITIONS
// =============================================================================

/// Task queue, filterable by status (both approval queues and final check)
/// GET /api/v1/manager/tasks
#[utoipa::path(
    get,
    path = "/v1/manager/tasks",
    tag = "Manager",
    operation_id = "managerListTasks",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated assignments"))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<TaskQueueParams>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::assignments::dsl;
    use diesel::dsl::count_star;

    // Unknown status strings are a client error, not an empty queue
    let status_filter = match &params.status {
        Some(s) => Some(
            AssignmentStatus::from_str(s)
                .map_err(ServiceError::ValidationError)?,
        ),
        None => None,
    };
    let pagination = params.pagination();

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let (total, rows): (i64, Vec<Assignment>) = match status_filter {
        Some(status) => {
            let total = dsl::assignments
                .filter(dsl::current_status.eq(status.as_str()))
                .select(count_star())
                .first(&mut conn)
                .await?;
            let rows = dsl::assignments
                .filter(dsl::current_status.eq(status.as_str()))
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .offset(pagination.offset())
                .limit(pagination.limit())
                .load(&mut conn)
                .await?;
            (total, rows)
        },
        None => {
            let total = dsl::assignments
                .select(count_star())
                .first(&mut conn)
                .await?;
            let rows = dsl::assignments
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .offset(pagination.offset())
                .limit(pagination.limit())
                .load(&mut conn)
                .await?;
            (total, rows)
        },
    };

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Approve a site selection and assign the writer
/// PUT /api/v1/manager/tasks/:id/approve
#[utoipa::path(
    put,
    path = "/v1/manager/tasks/{id}/approve",
    tag = "Manager",
    operation_id = "approveTask",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = ApproveTaskRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Assignment moved to writer"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn approve_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<ApproveTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service
        .approve_site(actor, assignment_id, request.writer_id)
        .await?;

    Ok(Json(assignment))
}

/// Reject a pending task with a mandatory reason
/// PUT /api/v1/manager/tasks/:id/reject
#[utoipa::path(
    put,
    path = "/v1/manager/tasks/{id}/reject",
    tag = "Manager",
    operation_id = "rejectTask",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = RejectTaskRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Assignment rejected"),
        (status = 400, description = "Missing reason"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn reject_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<RejectTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service.reject(actor, assignment_id, &request.reason).await?;
    Ok(Json(assignment))
}

/// Approve submitted content and route the task to the site owner
/// POST /api/v1/manager/tasks/:id/push-to-blogger
#[utoipa::path(
    post,
    path = "/v1/manager/tasks/{id}/push-to-blogger",
    tag = "Manager",
    operation_id = "pushToBlogger",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Assignment routed to blogger"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn push_to_blogger(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service.push_to_blogger(actor, assignment_id).await?;
    Ok(Json(assignment))
}

/// Stage a published assignment in the final check queue
/// PUT /api/v1/manager/tasks/:id/final-check
#[utoipa::path(
    put,
    path = "/v1/manager/tasks/{id}/final-check",
    tag = "Manager",
    operation_id = "moveTaskToFinalCheck",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Assignment staged for final check"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn move_to_final_check(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service.move_to_final_check(actor, assignment_id).await?;
    Ok(Json(assignment))
}

/// Verify the live placement and settle the assignment. Credits the
/// blogger's wallet exactly once; repeated calls are no-ops.
/// PUT /api/v1/manager/tasks/:id/finalize
#[utoipa::path(
    put,
    path = "/v1/manager/tasks/{id}/finalize",
    tag = "Manager",
    operation_id = "finalizeTask",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Assignment settled and credited"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn finalize_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service.finalize(actor, assignment_id).await?;
    Ok(Json(assignment))
}
