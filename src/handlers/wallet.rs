// Wallet Handlers - shared by the blogger and writer namespaces; both
// roles earn into a wallet and cash out through withdrawal requests

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::withdrawal::{CreateWithdrawalRequest, WithdrawalRequest},
    services::wallet::WalletService,
    utils::service_error::ServiceError,
};

/// Wallet balance, pending withdrawals and ledger
/// GET /api/v1/{blogger|writer}/wallet
#[utoipa::path(
    get,
    path = "/v1/blogger/wallet",
    tag = "Wallet",
    operation_id = "getWallet",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Wallet summary"))
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;

    let service = WalletService::new(&state);
    let summary = service.summary(user_id).await?;

    Ok(Json(summary))
}

/// Request a payout from the wallet balance
/// POST /api/v1/{blogger|writer}/withdrawal-requests
#[utoipa::path(
    post,
    path = "/v1/blogger/withdrawal-requests",
    tag = "Wallet",
    operation_id = "createWithdrawalRequest",
    request_body = CreateWithdrawalRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Withdrawal requested"),
        (status = 400, description = "Validation failed"),
        (status = 422, description = "Insufficient balance")
    )
)]
pub async fn create_withdrawal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateWithdrawalRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;

    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;

    let service = WalletService::new(&state);
    let created = service
        .create_withdrawal(
            user_id,
            request.amount_cents,
            request.method,
            &request.account_details,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Own withdrawal history, newest first
/// GET /api/v1/{blogger|writer}/withdrawal-requests
#[utoipa::path(
    get,
    path = "/v1/blogger/withdrawal-requests",
    tag = "Wallet",
    operation_id = "listOwnWithdrawals",
    security(("bearerAuth" = [])),
    responses((status = 200, description = "Withdrawal requests"))
)]
pub async fn list_withdrawals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ServiceError> {
    let user_id = auth_user.user_uuid().ok_or(ServiceError::Unauthorized)?;

    let mut conn = state
        .diesel_pool
        .get()
        .await
        .map_err(|e| ServiceError::DatabaseError(e.to_string()))?;

    let rows = WithdrawalRequest::find_by_user_id(&mut conn, user_id).await?;
    Ok(Json(rows))
}
