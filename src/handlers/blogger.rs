// Blogger Handlers - site inventory CRUD, publishing queue, notifications

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        assignment::Assignment,
        notification::Notification,
        site::{CreateSiteRequest, NewSite, Site, SiteUpdate, UpdateSiteRequest},
    },
    services::workflow::{Actor, WorkflowService},
    utils::{
        pagination::{Paginated, Pagination},
        service_error::ServiceError,
        trim_optional_field,
    },
};

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct PublishTaskRequest {
    #[validate(length(min = 1, max = 2048, message = "Live URL is required"))]
    pub live_url: String,
}

fn actor(auth_user: &AuthenticatedUser) -> Result<Actor, ServiceError> {
    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;
    let role = auth_user.role_enum().ok_or(ServiceError::Unauthorized)?;
    Ok(Actor { user_id, role })
}

// =============================================================================
// SITE INVENTORY
// =============================================================================

/// Register a site in the inventory
/// POST /api/v1/blogger/sites
#[utoipa::path(
    post,
    path = "/v1/blogger/sites",
    tag = "Blogger",
    operation_id = "createSite",
    request_body = CreateSiteRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Site registered", body = Site),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_site(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateSiteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;

    let new_site = NewSite {
        id: Uuid::new_v4(),
        blogger_id: actor.user_id,
        domain: request.domain.trim().to_lowercase(),
        da: request.da,
        dr: request.dr,
        referring_domains: request.referring_domains,
        monthly_traffic: request.monthly_traffic,
        spam_score: request.spam_score,
        guest_post_price_cents: request.guest_post_price_cents,
        niche_edit_price_cents: request.niche_edit_price_cents,
        category: trim_optional_field(request.category.as_ref()),
        is_active: true,
    };

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let site: Site = {
        use crate::schema::sites::dsl;
        diesel::insert_into(dsl::sites)
            .values(&new_site)
            .get_result(&mut conn)
            .await?
    };

    tracing::info!(site_id = %site.id, domain = %site.domain, "Site registered");

    Ok((StatusCode::CREATED, Json(site)))
}

/// Own sites, newest first
/// GET /api/v1/blogger/sites
#[utoipa::path(
    get,
    path = "/v1/blogger/sites",
    tag = "Blogger",
    operation_id = "listOwnSites",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated sites"))
)]
pub async fn list_sites(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::sites::dsl;
    use diesel::dsl::count_star;

    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let total: i64 = dsl::sites
        .filter(dsl::blogger_id.eq(actor.user_id))
        .select(count_star())
        .first(&mut conn)
        .await?;

    let rows: Vec<Site> = dsl::sites
        .filter(dsl::blogger_id.eq(actor.user_id))
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Get one of the blogger's own sites
/// GET /api/v1/blogger/sites/:id
#[utoipa::path(
    get,
    path = "/v1/blogger/sites/{id}",
    tag = "Blogger",
    operation_id = "getOwnSite",
    params(("id" = Uuid, Path, description = "Site ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Site", body = Site),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_site(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(site_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let site = Site::find_by_id(&mut conn, site_id).await?;
    if site.blogger_id != actor.user_id {
        return Err(ServiceError::NotFound);
    }

    Ok(Json(site))
}

/// Update one of the blogger's own sites
/// PUT /api/v1/blogger/sites/:id
#[utoipa::path(
    put,
    path = "/v1/blogger/sites/{id}",
    tag = "Blogger",
    operation_id = "updateOwnSite",
    params(("id" = Uuid, Path, description = "Site ID")),
    request_body = UpdateSiteRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Updated site", body = Site),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_site(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(site_id): Path<Uuid>,
    Json(request): Json<UpdateSiteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let site = Site::find_by_id(&mut conn, site_id).await?;
    if site.blogger_id != actor.user_id {
        return Err(ServiceError::NotFound);
    }

    let update = SiteUpdate {
        domain: request.domain.map(|d| d.trim().to_lowercase()),
        da: request.da,
        dr: request.dr,
        referring_domains: request.referring_domains,
        monthly_traffic: request.monthly_traffic,
        spam_score: request.spam_score,
        guest_post_price_cents: request.guest_post_price_cents,
        niche_edit_price_cents: request.niche_edit_price_cents,
        category: request.category.map(|c| {
            let trimmed = c.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }),
        is_active: request.is_active,
        updated_at: Utc::now(),
    };

    let updated: Site = {
        use crate::schema::sites::dsl;
        diesel::update(dsl::sites.filter(dsl::id.eq(site_id)))
            .set(&update)
            .get_result(&mut conn)
            .await?
    };

    Ok(Json(updated))
}

/// Remove a site from the inventory
/// DELETE /api/v1/blogger/sites/:id
#[utoipa::path(
    delete,
    path = "/v1/blogger/sites/{id}",
    tag = "Blogger",
    operation_id = "deleteOwnSite",
    params(("id" = Uuid, Path, description = "Site ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 204, description = "Site deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Site referenced by assignments")
    )
)]
pub async fn delete_site(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(site_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let site = Site::find_by_id(&mut conn, site_id).await?;
    if site.blogger_id != actor.user_id {
        return Err(ServiceError::NotFound);
    }

    let result = {
        use crate::schema::sites::dsl;
        diesel::delete(dsl::sites.filter(dsl::id.eq(site_id)))
            .execute(&mut conn)
            .await
    };

    match result {
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        // Sites referenced by assignments keep their history; deactivate instead
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::ForeignKeyViolation,
            _,
        )) => Err(ServiceError::Conflict(
            "Site is referenced by assignments; deactivate it instead".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// PUBLISHING QUEUE
// =============================================================================

/// Tasks routed to this blogger
/// GET /api/v1/blogger/tasks
#[utoipa::path(
    get,
    path = "/v1/blogger/tasks",
    tag = "Blogger",
    operation_id = "bloggerListTasks",
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
        .filter(dsl::blogger_id.eq(actor.user_id))
        .select(count_star())
        .first(&mut conn)
        .await?;

    let rows: Vec<Assignment> = dsl::assignments
        .filter(dsl::blogger_id.eq(actor.user_id))
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Publish the placement and submit the live URL
/// PUT /api/v1/blogger/tasks/:id/publish
#[utoipa::path(
    put,
    path = "/v1/blogger/tasks/{id}/publish",
    tag = "Blogger",
    operation_id = "publishTask",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = PublishTaskRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Live URL submitted"),
        (status = 400, description = "Missing live URL"),
        (status = 403, description = "Not the routed blogger"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn publish_task(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<PublishTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service
        .publish(actor, assignment_id, &request.live_url)
        .await?;
    Ok(Json(assignment))
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

/// Notification feed, newest first (panel polls this)
/// GET /api/v1/blogger/notifications
#[utoipa::path(
    get,
    path = "/v1/blogger/notifications",
    tag = "Blogger",
    operation_id = "listNotifications",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Notifications"))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let rows = Notification::find_by_user_id(&mut conn, actor.user_id).await?;
    Ok(Json(rows))
}

/// Mark a notification as read
/// PUT /api/v1/blogger/notifications/:id/read
#[utoipa::path(
    put,
    path = "/v1/blogger/notifications/{id}/read",
    tag = "Blogger",
    operation_id = "markNotificationRead",
    params(("id" = Uuid, Path, description = "Notification ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let actor = actor(&auth_user)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let updated = Notification::mark_read(&mut conn, notification_id, actor.user_id).await?;
    if updated == 0 {
        return Err(ServiceError::NotFound);
    }

    Ok(Json(serde_json::json!({ "success": true })))
}
