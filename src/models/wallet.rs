// Wallet ledger model - append-only record of every balance mutation
// A user's wallet_balance_cents always equals the sum of their ledger rows.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::wallet_transactions;

/// Ledger entry kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    AssignmentCredit,
    WithdrawalDebit,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::AssignmentCredit => "assignment_credit",
            TransactionKind::WithdrawalDebit => "withdrawal_debit",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "assignment_credit" => Some(TransactionKind::AssignmentCredit),
            "withdrawal_debit" => Some(TransactionKind::WithdrawalDebit),
            _ => None,
        }
    }
}

/// Wallet transaction database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = wallet_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub withdrawal_request_id: Option<Uuid>,
    pub amount_cents: i64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// New ledger entry for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = wallet_transactions)]
pub struct NewWalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub withdrawal_request_id: Option<Uuid>,
    pub amount_cents: i64,
    pub kind: String,
}

impl WalletTransaction {
    pub async fn find_by_user_id(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::wallet_transactions::dsl;

        dsl::wallet_transactions
            .filter(dsl::user_id.eq(user))
            .order(dsl::created_at.desc())
            .load::<Self>(conn)
            .await
    }

    /// Credit already applied for this assignment? The unique index on
    /// assignment_id is the hard backstop; this lookup lets the workflow
    /// service short-circuit a repeat finalize into a no-op.
    pub async fn credit_exists_for_assignment(
        conn: &mut AsyncPgConnection,
        assignment: Uuid,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::wallet_transactions::dsl;
        use diesel::dsl::count_star;

        let n: i64 = dsl::wallet_transactions
            .filter(dsl::assignment_id.eq(assignment))
            .filter(dsl::kind.eq(TransactionKind::AssignmentCredit.as_str()))
            .select(count_star())
            .first(conn)
            .await?;

        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_conversion() {
        assert_eq!(
            TransactionKind::from_string("assignment_credit"),
            Some(TransactionKind::AssignmentCredit)
        );
        assert_eq!(
            TransactionKind::from_string("withdrawal_debit"),
            Some(TransactionKind::WithdrawalDebit)
        );
        assert_eq!(TransactionKind::from_string("refund"), None);
    }
}
