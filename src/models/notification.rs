// Notification model - in-app rows produced by workflow side effects,
// consumed by the polling notification panel

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::schema::notifications;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TaskAssigned,
    TaskRejected,
    TaskCredited,
    WithdrawalSettled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TaskAssigned => "task_assigned",
            NotificationKind::TaskRejected => "task_rejected",
            NotificationKind::TaskCredited => "task_credited",
            NotificationKind::WithdrawalSettled => "withdrawal_settled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub body: String,
    pub assignment_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub body: String,
    pub assignment_id: Option<Uuid>,
}

impl Notification {
    pub async fn find_by_user_id(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::notifications::dsl;

        dsl::notifications
            .filter(dsl::user_id.eq(user))
            .order(dsl::created_at.desc())
            .load::<Self>(conn)
            .await
    }

    /// Mark as read; only the owner's rows are reachable from handlers.
    pub async fn mark_read(
        conn: &mut AsyncPgConnection,
        notification_id: Uuid,
        owner: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::notifications::dsl;

        diesel::update(
            dsl::notifications
                .filter(dsl::id.eq(notification_id))
                .filter(dsl::user_id.eq(owner)),
        )
        .set(dsl::is_read.eq(true))
        .execute(conn)
        .await
    }
}
