// Team Handlers - browse the active site inventory and submit draft
// assignments for first manager approval

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
    models::{
        assignment::{Assignment, AssignmentStatus},
        site::{Site, SiteFilter},
    },
    services::workflow::{Actor, WorkflowService},
    utils::{
        pagination::{Paginated, Pagination},
        service_error::ServiceError,
    },
};

// Flattening Pagination into a Query struct breaks number parsing in
// serde_urlencoded, so the fields are spelled out here.
#[derive(Debug, Deserialize)]
pub struct SiteListParams {
    pub min_da: Option<i32>,
    pub min_dr: Option<i32>,
    pub max_spam_score: Option<i32>,
    pub category: Option<String>,

    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl SiteListParams {
    fn filter(&self) -> SiteFilter {
        SiteFilter {
            min_da: self.min_da,
            min_dr: self.min_dr,
            max_spam_score: self.max_spam_score,
            category: self.category.clone(),
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(20),
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SubmitToManagerRequest {
    pub site_id: Uuid,

    #[validate(length(min = 1, max = 2000, message = "A note is required"))]
    pub note: String,

    #[validate(length(max = 255, message = "Anchor text must be less than 255 characters"))]
    pub anchor_text: Option<String>,

    #[validate(length(max = 2048, message = "Target URL must be less than 2048 characters"))]
    pub target_url: Option<String>,
}

fn actor(auth_user: &AuthenticatedUser) -> Result<Actor, ServiceError> {
    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;
    let role = auth_user.role_enum().ok_or(ServiceError::Unauthorized)?;
    Ok(Actor { user_id, role })
}

/// Active sites matching the metric filters, for candidate selection
/// GET /api/v1/team/sites
#[utoipa::path(
    get,
    path = "/v1/team/sites",
    tag = "Team",
    operation_id = "teamListSites",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated eligible sites"))
)]
pub async fn list_sites(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(params): Query<SiteListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::sites::dsl;
    use diesel::dsl::count_star;

    let filter = params.filter();
    let pagination = params.pagination();

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    // Only active sites are eligible for selection
    let mut count_query = dsl::sites.filter(dsl::is_active.eq(true)).into_boxed();
    let mut rows_query = dsl::sites.filter(dsl::is_active.eq(true)).into_boxed();

    if let Some(min_da) = filter.min_da {
        count_query = count_query.filter(dsl::da.ge(min_da));
        rows_query = rows_query.filter(dsl::da.ge(min_da));
    }
    if let Some(min_dr) = filter.min_dr {
        count_query = count_query.filter(dsl::dr.ge(min_dr));
        rows_query = rows_query.filter(dsl::dr.ge(min_dr));
    }
    if let Some(max_spam) = filter.max_spam_score {
        count_query = count_query.filter(dsl::spam_score.le(max_spam));
        rows_query = rows_query.filter(dsl::spam_score.le(max_spam));
    }
    if let Some(ref category) = filter.category {
        count_query = count_query.filter(dsl::category.eq(category.clone()));
        rows_query = rows_query.filter(dsl::category.eq(category.clone()));
    }

    let total: i64 = count_query.select(count_star()).first(&mut conn).await?;

    let rows: Vec<Site> = rows_query
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Draft assignments awaiting site selection
/// GET /api/v1/team/tasks
#[utoipa::path(
    get,
    path = "/v1/team/tasks",
    tag = "Team",
    operation_id = "teamListTasks",
    params(Pagination),
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Paginated draft assignments"))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    use crate::schema::assignments::dsl;
    use diesel::dsl::count_star;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let total: i64 = dsl::assignments
        .filter(dsl::current_status.eq(AssignmentStatus::Draft.as_str()))
        .select(count_star())
        .first(&mut conn)
        .await?;

    let rows: Vec<Assignment> = dsl::assignments
        .filter(dsl::current_status.eq(AssignmentStatus::Draft.as_str()))
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(pagination.offset())
        .limit(pagination.limit())
        .load(&mut conn)
        .await?;

    Ok(Json(Paginated::new(rows, &pagination, total)))
}

/// Select a site and submit the draft for first manager approval
/// POST /api/v1/team/tasks/:id/submit-to-manager
#[utoipa::path(
    post,
    path = "/v1/team/tasks/{id}/submit-to-manager",
    tag = "Team",
    operation_id = "submitTaskToManager",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = SubmitToManagerRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Assignment submitted"),
        (status = 400, description = "Missing note or ineligible site"),
        (status = 422, description = "Invalid transition")
    )
)]
pub async fn submit_to_manager(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(assignment_id): Path<Uuid>,
    Json(request): Json<SubmitToManagerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let actor = actor(&auth_user)?;
    let service = WorkflowService::new(&state);

    let assignment = service
        .submit_to_manager(
            actor,
            assignment_id,
            request.site_id,
            &request.note,
            request.anchor_text,
            request.target_url,
        )
        .await?;

    Ok(Json(assignment))
}
