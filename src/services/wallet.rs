// Wallet service - balance reads, withdrawal lifecycle and settlement.
// Pending -> Paid/Rejected are one-way terminal transitions; approval
// debits the requester's wallet in the same transaction that flips the
// request status.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        notification::{NewNotification, NotificationKind},
        user::User,
        wallet::{NewWalletTransaction, TransactionKind, WalletTransaction},
        withdrawal::{
            NewWithdrawalRequest, PayoutMethod, WithdrawalRequest, WithdrawalStatus,
        },
    },
    utils::{require_reason, service_error::ServiceError},
};

pub struct WalletService {
    diesel_pool: DieselPool,
}

/// Wallet summary returned to bloggers/writers
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct WalletSummary {
    pub balance_cents: i64,
    pub pending_withdrawal_cents: i64,
    pub transactions: Vec<WalletTransaction>,
}

impl WalletService {
    pub fn new(state: &AppState) -> Self {
        Self {
            diesel_pool: state.diesel_pool.clone(),
        }
    }

    pub fn with_pool(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        bb8::PooledConnection<
            '_,
            diesel_async::pooled_connection::AsyncDieselConnectionManager<AsyncPgConnection>,
        >,
        ServiceError,
    > {
        self.diesel_pool
            .get()
            .await
            .map_err(|e| ServiceError::DatabaseError(e.to_string()))
    }

    /// Balance plus ledger for the owner's wallet view
    #[instrument(skip(self))]
    pub async fn summary(&self, user_id: Uuid) -> Result<WalletSummary, ServiceError> {
        let mut conn = self.conn().await?;

        let user = User::find_by_id(&mut conn, user_id).await?;
        let transactions = WalletTransaction::find_by_user_id(&mut conn, user_id).await?;

        let pending: i64 = {
            use crate::schema::withdrawal_requests::dsl;
            use diesel::dsl::sum;

            dsl::withdrawal_requests
                .filter(dsl::user_id.eq(user_id))
                .filter(dsl::status.eq(WithdrawalStatus::Pending.as_str()))
                .select(sum(dsl::amount_cents))
                .first::<Option<i64>>(&mut conn)
                .await?
                .unwrap_or(0)
        };

        Ok(WalletSummary {
            balance_cents: user.wallet_balance_cents,
            pending_withdrawal_cents: pending,
            transactions,
        })
    }

    /// Blogger/Writer initiates a withdrawal. The requested amount plus any
    /// already-pending requests must fit in the current balance.
    #[instrument(skip(self, account_details))]
    pub async fn create_withdrawal(
        &self,
        user_id: Uuid,
        amount_cents: i64,
        method: PayoutMethod,
        account_details: &str,
    ) -> Result<WithdrawalRequest, ServiceError> {
        if amount_cents <= 0 {
            return Err(ServiceError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        let account_details = require_reason(account_details)
            .map_err(|_| ServiceError::ValidationError("Account details are required".to_string()))?;

        let mut conn = self.conn().await?;

        let user = User::find_by_id(&mut conn, user_id).await?;
        if !user.role_enum().has_wallet() {
            return Err(ServiceError::Forbidden(
                "Only bloggers and writers hold wallets".to_string(),
            ));
        }

        let pending: i64 = {
            use crate::schema::withdrawal_requests::dsl;
            use diesel::dsl::sum;

            dsl::withdrawal_requests
                .filter(dsl::user_id.eq(user_id))
                .filter(dsl::status.eq(WithdrawalStatus::Pending.as_str()))
                .select(sum(dsl::amount_cents))
                .first::<Option<i64>>(&mut conn)
                .await?
                .unwrap_or(0)
        };

        if amount_cents + pending > user.wallet_balance_cents {
            return Err(ServiceError::InsufficientBalance);
        }

        let request = NewWithdrawalRequest {
            id: Uuid::new_v4(),
            user_id,
            amount_cents,
            method: method.as_str().to_string(),
            account_details,
            status: WithdrawalStatus::Pending.as_str().to_string(),
        };

        let row: WithdrawalRequest = {
            use crate::schema::withdrawal_requests::dsl;
            diesel::insert_into(dsl::withdrawal_requests)
                .values(&request)
                .get_result(&mut conn)
                .await?
        };

        info!(
            request_id = %row.id,
            user_id = %user_id,
            amount_cents,
            "Withdrawal request created"
        );

        Ok(row)
    }

    /// Admin approves a pending request: status -> Paid, clearance date set,
    /// remarks persisted, wallet debited. One transaction, CAS on status.
    #[instrument(skip(self, remarks))]
    pub async fn approve_withdrawal(
        &self,
        request_id: Uuid,
        remarks: &str,
    ) -> Result<WithdrawalRequest, ServiceError> {
        let remarks = require_reason(remarks)
            .map_err(|_| ServiceError::ValidationError("Remarks are required".to_string()))?;

        let mut conn = self.conn().await?;

        let request = WithdrawalRequest::find_by_id(&mut conn, request_id).await?;
        if request.status_enum().is_terminal() {
            return Err(ServiceError::Conflict(format!(
                "Withdrawal request is already {}",
                request.status
            )));
        }

        let user_id = request.user_id;
        let amount = request.amount_cents;

        let settled: WithdrawalRequest = conn
            .transaction::<_, ServiceError, _>(|tx| {
                Box::pin(async move {
                    let now = Utc::now();

                    // CAS on status so two admins cannot both settle it
                    let updated = {
                        use crate::schema::withdrawal_requests::dsl;
                        diesel::update(
                            dsl::withdrawal_requests
                                .filter(dsl::id.eq(request_id))
                                .filter(dsl::status.eq(WithdrawalStatus::Pending.as_str())),
                        )
                        .set((
                            dsl::status.eq(WithdrawalStatus::Paid.as_str()),
                            dsl::admin_remarks.eq(Some(remarks.clone())),
                            dsl::clearance_date.eq(Some(now)),
                            dsl::updated_at.eq(now),
                        ))
                        .execute(tx)
                        .await?
                    };

                    if updated == 0 {
                        return Err(ServiceError::Conflict(
                            "Withdrawal request was settled by another admin".to_string(),
                        ));
                    }

                    // Wallet debit and its ledger row
                    let entry = NewWalletTransaction {
                        id: Uuid::new_v4(),
                        user_id,
                        assignment_id: None,
                        withdrawal_request_id: Some(request_id),
                        amount_cents: -amount,
                        kind: TransactionKind::WithdrawalDebit.as_str().to_string(),
                    };

                    {
                        use crate::schema::wallet_transactions::dsl;
                        diesel::insert_into(dsl::wallet_transactions)
                            .values(&entry)
                            .execute(tx)
                            .await?;
                    }

                    {
                        use crate::schema::users::dsl;
                        diesel::update(dsl::users.filter(dsl::id.eq(user_id)))
                            .set((
                                dsl::wallet_balance_cents.eq(dsl::wallet_balance_cents - amount),
                                dsl::updated_at.eq(now),
                            ))
                            .execute(tx)
                            .await?;
                    }

                    Ok(WithdrawalRequest::find_by_id(tx, request_id).await?)
                })
            })
            .await?;

        Self::notify_settlement(&mut conn, user_id, "Your withdrawal was approved and paid")
            .await?;

        info!(
            request_id = %request_id,
            user_id = %user_id,
            amount_cents = amount,
            "Withdrawal approved"
        );

        Ok(settled)
    }

    /// Admin rejects a pending request: status -> Rejected, reason persisted,
    /// balance untouched.
    #[instrument(skip(self, reason))]
    pub async fn reject_withdrawal(
        &self,
        request_id: Uuid,
        reason: &str,
    ) -> Result<WithdrawalRequest, ServiceError> {
        let reason = require_reason(reason)
            .map_err(|_| ServiceError::ValidationError("A reason is required".to_string()))?;

        let mut conn = self.conn().await?;

        let updated = {
            use crate::schema::withdrawal_requests::dsl;
            diesel::update(
                dsl::withdrawal_requests
                    .filter(dsl::id.eq(request_id))
                    .filter(dsl::status.eq(WithdrawalStatus::Pending.as_str())),
            )
            .set((
                dsl::status.eq(WithdrawalStatus::Rejected.as_str()),
                dsl::admin_remarks.eq(Some(reason)),
                dsl::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await?
        };

        if updated == 0 {
            // Either missing or already settled; disambiguate for the caller
            let request = WithdrawalRequest::find_by_id(&mut conn, request_id).await?;
            return Err(ServiceError::Conflict(format!(
                "Withdrawal request is already {}",
                request.status
            )));
        }

        let request = WithdrawalRequest::find_by_id(&mut conn, request_id).await?;
        Self::notify_settlement(&mut conn, request.user_id, "Your withdrawal was rejected")
            .await?;

        Ok(request)
    }

    /// Pending requests for the admin settlement queue
    pub async fn list_pending(
        &self,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<WithdrawalRequest>, i64), ServiceError> {
        use crate::schema::withdrawal_requests::dsl;
        use diesel::dsl::count_star;

        let mut conn = self.conn().await?;

        let total: i64 = dsl::withdrawal_requests
            .filter(dsl::status.eq(WithdrawalStatus::Pending.as_str()))
            .select(count_star())
            .first(&mut conn)
            .await?;

        let rows = dsl::withdrawal_requests
            .filter(dsl::status.eq(WithdrawalStatus::Pending.as_str()))
            .order((dsl::requested_at.desc(), dsl::id.desc()))
            .offset(offset)
            .limit(limit)
            .load::<WithdrawalRequest>(&mut conn)
            .await?;

        Ok((rows, total))
    }

    async fn notify_settlement(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        body: &str,
    ) -> Result<(), ServiceError> {
        use crate::schema::notifications::dsl;

        let row = NewNotification {
            id: Uuid::new_v4(),
            user_id,
            kind: NotificationKind::WithdrawalSettled.as_str().to_string(),
            body: body.to_string(),
            assignment_id: None,
        };

        diesel::insert_into(dsl::notifications)
            .values(&row)
            .execute(conn)
            .await?;

        Ok(())
    }
}
