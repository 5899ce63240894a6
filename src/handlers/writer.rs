// Writer Handlers - own task queue, start writing, submit content

use axum::{
    extract::{Extension, Path, Query, State},
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::assignment::Assignment,
    services::workflow::{Actor, WorkflowService},
    utils::{
        pagination::{Paginated, Pagination},
        service_error::ServiceError,
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SubmitContentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

fn actor(auth_user: &AuthenticatedUser) -> Result<Actor, ServiceError> {
    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;
    let role = auth_user.role_enum().ok_or(ServiceError::Unauthorized)?;
    Ok(Actor { user_id, role })
}

/// Tasks assigned to this writer
/// GET /api/v1/writer/tasks
#[utoipa::path(
    get,
    path = "/v1/writer/tasks",
    tag = "Writer",
    operation_id = "writerListTasks",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated assignments"))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::assignments::dsl;
    use diesel::dsl::count_star;

    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let total: i64 = dsl::assignments
        .filter(dsl::writer_id.eq(actor.user_id))
        .select(count_star())
        .first(&mut conn)
        .await?;

    let rows: Vec<Assignment> = dsl::assignments
        .filter(dsl::writer_id.eq(actor.user_id))
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Begin work on an assigned task
/// PUT /api/v1/writer/tasks/:id/start
#[utoipa::path(
    put,
    path = "/v1/writer/tasks/{id}/start",
    tag = "Writer",
    operation_id = "startWriting",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Writing started"),
        (status = 403, description = "Not the assigned writer"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn start_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service.start_writing(actor, assignment_id).await?;
    Ok(Json(assignment))
}

/// Submit finished content for second manager approval
/// PUT /api/v1/writer/tasks/:id/submit-content
#[utoipa::path(
    put,
    path = "/v1/writer/tasks/{id}/submit-content",
    tag = "Writer",
    operation_id = "submitContent",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = SubmitContentRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Content submitted"),
        (status = 400, description = "Missing content"),
        (status = 403, description = "Not the assigned writer"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn submit_content(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<SubmitContentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service
        .submit_content(actor, assignment_id, &request.content)
        .await?;
    Ok(Json(assignment))
}
