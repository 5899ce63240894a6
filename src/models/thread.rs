// Support thread model - linear, append-only conversation between two
// parties with a shared status. Messages are never edited or deleted.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::{thread_messages, threads};

/// Thread status - settable by either participant, no gating between values
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStatus::Open => "open",
            ThreadStatus::InProgress => "in_progress",
            ThreadStatus::Resolved => "resolved",
            ThreadStatus::Closed => "closed",
        }
    }
}

impl FromStr for ThreadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ThreadStatus::Open),
            "in_progress" => Ok(ThreadStatus::InProgress),
            "resolved" => Ok(ThreadStatus::Resolved),
            "closed" => Ok(ThreadStatus::Closed),
            _ => Err(format!("Invalid thread status: {}", s)),
        }
    }
}

/// Thread priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ThreadPriority {
    Low,
    Normal,
    High,
}

impl ThreadPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadPriority::Low => "low",
            ThreadPriority::Normal => "normal",
            ThreadPriority::High => "high",
        }
    }
}

/// Thread database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = threads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Thread {
    pub id: Uuid,
    pub subject: String,
    pub opened_by: Uuid,
    pub counterpart_id: Uuid,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = threads)]
pub struct NewThread {
    pub id: Uuid,
    pub subject: String,
    pub opened_by: Uuid,
    pub counterpart_id: Uuid,
    pub priority: String,
    pub status: String,
}

/// Message database model (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = thread_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ThreadMessage {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = thread_messages)]
pub struct NewThreadMessage {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
}

impl Thread {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        thread_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::threads::dsl;

        dsl::threads.filter(dsl::id.eq(thread_id)).first::<Self>(conn).await
    }

    /// Both the opener and the counterpart may read, post and set status.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.opened_by == user_id || self.counterpart_id == user_id
    }
}

impl ThreadMessage {
    /// Messages in creation order - the thread is a linear log.
    pub async fn find_by_thread(
        conn: &mut AsyncPgConnection,
        thread: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::thread_messages::dsl;

        dsl::thread_messages
            .filter(dsl::thread_id.eq(thread))
            .order(dsl::created_at.asc())
            .load::<Self>(conn)
            .await
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "subject": "Payment not reflected",
    "counterpart_id": "123e4567-e89b-12d3-a456-426614174000",
    "priority": "high",
    "message": "My June payout is missing from the wallet."
}))]
pub struct CreateThreadRequest {
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,

    pub counterpart_id: Uuid,

    pub priority: ThreadPriority,

    #[validate(length(min = 1, max = 10000, message = "Initial message is required"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PostMessageRequest {
    #[validate(length(min = 1, max = 10000, message = "Message body is required"))]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateThreadStatusRequest {
    pub status: ThreadStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion() {
        assert_eq!(ThreadStatus::from_str("open"), Ok(ThreadStatus::Open));
        assert_eq!(
            ThreadStatus::from_str("in_progress"),
            Ok(ThreadStatus::InProgress)
        );
        assert!(ThreadStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_participant_check() {
        let opener = Uuid::new_v4();
        let counterpart = Uuid::new_v4();
        let now = Utc::now();
        let thread = Thread {
            id: Uuid::new_v4(),
            subject: "Test".to_string(),
            opened_by: opener,
            counterpart_id: counterpart,
            priority: "normal".to_string(),
            status: "open".to_string(),
            created_at: now,
            updated_at: now,
        };

        assert!(thread.is_participant(opener));
        assert!(thread.is_participant(counterpart));
        assert!(!thread.is_participant(Uuid::new_v4()));
    }
}
