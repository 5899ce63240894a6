// Thread Handlers - support tickets between any two authenticated roles

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::thread::{CreateThreadRequest, PostMessageRequest, UpdateThreadStatusRequest},
    services::thread::ThreadService,
    utils::{
        pagination::{Paginated, Pagination},
        service_error::ServiceError,
    },
};

fn user_uuid(auth_user: &AuthenticatedUser) -> Result<Uuid, ServiceError> {
    auth_user.user_uuid().ok_or(ServiceError::Unauthorized)
}

/// Open a thread with an initial message
/// POST /api/v1/threads
#[utoipa::path(
    post,
    path = "/v1/threads",
    tag = "Threads",
    operation_id = "createThread",
    request_body = CreateThreadRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Thread created"),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_thread(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateThreadRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let opened_by = user_uuid(&auth_user)?;
    let service = ThreadService::new(&state);

    let view = service
        .create_thread(
            opened_by,
            request.counterpart_id,
            &request.subject,
            request.priority,
            &request.message,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view)))
}

/// Threads the caller participates in
/// GET /api/v1/threads
#[utoipa::path(
    get,
    path = "/v1/threads",
    tag = "Threads",
    operation_id = "listThreads",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated threads"))
)]
pub async fn list_threads(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_uuid(&auth_user)?;
    let service = ThreadService::new(&state);

    let (rows, total) = service
        .list_for_user(user_id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Thread with its ordered message log
/// GET /api/v1/threads/:id
#[utoipa::path(
    get,
    path = "/v1/threads/{id}",
    tag = "Threads",
    operation_id = "getThread",
    params(("id" = Uuid, Path, description = "Thread ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Thread with messages"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_thread(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(thread_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_uuid(&auth_user)?;
    let service = ThreadService::new(&state);

    let view = service.get_thread(thread_id, user_id).await?;
    Ok(Json(view))
}

/// Append a message to the thread
/// POST /api/v1/threads/:id/messages
#[utoipa::path(
    post,
    path = "/v1/threads/{id}/messages",
    tag = "Threads",
    operation_id = "postThreadMessage",
    params(("id" = Uuid, Path, description = "Thread ID")),
    request_body = PostMessageRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Message appended"),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn post_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(thread_id): Path<Uuid>,
    Json(request): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let sender_id = user_uuid(&auth_user)?;
    let service = ThreadService::new(&state);

    let message = service.post_message(thread_id, sender_id, &request.body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Set the shared thread status (either participant, any value)
/// PUT /api/v1/threads/:id/status
#[utoipa::path(
    put,
    path = "/v1/threads/{id}/status",
    tag = "Threads",
    operation_id = "updateThreadStatus",
    params(("id" = Uuid, Path, description = "Thread ID")),
    request_body = UpdateThreadStatusRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Status updated"),
        (status = 403, description = "Not a participant")
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(thread_id): Path<Uuid>,
    Json(request): Json<UpdateThreadStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = user_uuid(&auth_user)?;
    let service = ThreadService::new(&state);

    let thread = service
        .update_status(thread_id, user_id, request.status)
        .await?;
    Ok(Json(thread))
}
