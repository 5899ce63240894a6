// Withdrawal request model - converts wallet balance into a payout record
// Pending -> Paid/Rejected are one-way terminal transitions guarded by
// mandatory admin remarks.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::withdrawal_requests;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Paid,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Paid => "paid",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(WithdrawalStatus::Pending),
            "paid" => Some(WithdrawalStatus::Paid),
            "rejected" => Some(WithdrawalStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawalStatus::Pending)
    }
}

/// Supported payout channels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    BankTransfer,
    Paypal,
    Upi,
    Qr,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutMethod::BankTransfer => "bank_transfer",
            PayoutMethod::Paypal => "paypal",
            PayoutMethod::Upi => "upi",
            PayoutMethod::Qr => "qr",
        }
    }
}

impl FromStr for PayoutMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(PayoutMethod::BankTransfer),
            "paypal" => Ok(PayoutMethod::Paypal),
            "upi" => Ok(PayoutMethod::Upi),
            "qr" => Ok(PayoutMethod::Qr),
            _ => Err(format!("Invalid payout method: {}", s)),
        }
    }
}

/// Withdrawal request database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = withdrawal_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WithdrawalRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub method: String,
    pub account_details: String,
    pub status: String,
    pub admin_remarks: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub clearance_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// New withdrawal request for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = withdrawal_requests)]
pub struct NewWithdrawalRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub method: String,
    pub account_details: String,
    pub status: String,
}

impl WithdrawalRequest {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        request_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::withdrawal_requests::dsl;

        dsl::withdrawal_requests
            .filter(dsl::id.eq(request_id))
            .first::<Self>(conn)
            .await
    }

    pub async fn find_by_user_id(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::withdrawal_requests::dsl;

        dsl::withdrawal_requests
            .filter(dsl::user_id.eq(user))
            .order(dsl::requested_at.desc())
            .load::<Self>(conn)
            .await
    }

    pub fn status_enum(&self) -> WithdrawalStatus {
        WithdrawalStatus::from_string(&self.status).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid withdrawal status '{}' for request {}, treating as Pending",
                self.status,
                self.id
            );
            WithdrawalStatus::Pending
        })
    }
}

/// Request body for initiating a withdrawal
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "amount_cents": 25000,
    "method": "paypal",
    "account_details": "payout@example.com"
}))]
pub struct CreateWithdrawalRequest {
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,

    pub method: PayoutMethod,

    #[validate(length(min = 1, max = 1000, message = "Account details are required"))]
    pub account_details: String,
}

/// Admin decision body - remarks are mandatory on both paths
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WithdrawalDecisionRequest {
    #[validate(length(min = 1, max = 2000, message = "Remarks are required"))]
    pub remarks: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(
            WithdrawalStatus::from_string("pending"),
            Some(WithdrawalStatus::Pending)
        );
        assert_eq!(
            WithdrawalStatus::from_string("paid"),
            Some(WithdrawalStatus::Paid)
        );
        assert_eq!(WithdrawalStatus::from_string("cleared"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!WithdrawalStatus::Pending.is_terminal());
        assert!(WithdrawalStatus::Paid.is_terminal());
        assert!(WithdrawalStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            PayoutMethod::from_str("bank_transfer"),
            Ok(PayoutMethod::BankTransfer)
        );
        assert_eq!(PayoutMethod::from_str("qr"), Ok(PayoutMethod::Qr));
        assert!(PayoutMethod::from_str("cheque").is_err());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let request = CreateWithdrawalRequest {
            amount_cents: 0,
            method: PayoutMethod::Paypal,
            account_details: "payout@example.com".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
