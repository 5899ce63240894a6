// Assignment model - the per-site unit of workflow state within an Order
// An order for N links produces up to N assignments, each advancing
// independently through the status machine below.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user::Role;
use crate::schema::assignments;

// =============================================================================
// STATUS STATE MACHINE
// =============================================================================

/// Assignment workflow status. Terminal states: Completed, Credited, Rejected.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema,
    diesel::expression::AsExpression,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Draft,
    PendingManagerApproval1,
    AssignedToWriter,
    WritingInProgress,
    PendingManagerApproval2,
    AssignedToBlogger,
    PublishedPendingVerification,
    PendingFinalCheck,
    Completed,
    Credited,
    Rejected,
}

/// Workflow action attempted by an actor. Payload validity (non-empty reason,
/// content present) is checked before the transition table is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    SubmitToManager,
    ApproveSite,
    StartWriting,
    SubmitContent,
    PushToBlogger,
    Publish,
    MoveToFinalCheck,
    Finalize,
    Reject,
}

/// Transition rejected by the state machine.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Action {action:?} is not allowed from status {from:?}")]
    InvalidTransition {
        from: AssignmentStatus,
        action: WorkflowAction,
    },

    #[error("Role {role:?} may not perform {action:?}")]
    Forbidden { role: Role, action: WorkflowAction },

    #[error("A rejection reason is required")]
    MissingReason,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Draft => "draft",
            AssignmentStatus::PendingManagerApproval1 => "pending_manager_approval_1",
            AssignmentStatus::AssignedToWriter => "assigned_to_writer",
            AssignmentStatus::WritingInProgress => "writing_in_progress",
            AssignmentStatus::PendingManagerApproval2 => "pending_manager_approval_2",
            AssignmentStatus::AssignedToBlogger => "assigned_to_blogger",
            AssignmentStatus::PublishedPendingVerification => "published_pending_verification",
            AssignmentStatus::PendingFinalCheck => "pending_final_check",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Credited => "credited",
            AssignmentStatus::Rejected => "rejected",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Completed | AssignmentStatus::Credited | AssignmentStatus::Rejected
        )
    }

    /// States from which a manager reject (with reason) is valid.
    pub fn is_rejectable(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::PendingManagerApproval1
                | AssignmentStatus::PendingManagerApproval2
                | AssignmentStatus::PublishedPendingVerification
                | AssignmentStatus::PendingFinalCheck
        )
    }

    /// The full transition table: (from, action) -> (required role, to).
    ///
    /// Finalize maps to Credited here; the workflow service downgrades the
    /// landing state to Completed when the assignment has nothing to pay out.
    /// This is the single authority consulted by every transition attempt;
    /// no handler mutates `current_status` outside of it.
    pub fn transition(
        &self,
        action: WorkflowAction,
    ) -> Result<(Role, AssignmentStatus), TransitionError> {
        use AssignmentStatus as S;
        use WorkflowAction as A;

        let edge = match (self, action) {
            (S::Draft, A::SubmitToManager) => (Role::Team, S::PendingManagerApproval1),
            (S::PendingManagerApproval1, A::ApproveSite) => (Role::Manager, S::AssignedToWriter),
            (S::AssignedToWriter, A::StartWriting) => (Role::Writer, S::WritingInProgress),
            (S::WritingInProgress, A::SubmitContent) => {
                (Role::Writer, S::PendingManagerApproval2)
            },
            (S::PendingManagerApproval2, A::PushToBlogger) => {
                (Role::Manager, S::AssignedToBlogger)
            },
            (S::AssignedToBlogger, A::Publish) => {
                (Role::Blogger, S::PublishedPendingVerification)
            },
            (S::PublishedPendingVerification, A::MoveToFinalCheck) => {
                (Role::Manager, S::PendingFinalCheck)
            },
            (S::PublishedPendingVerification, A::Finalize)
            | (S::PendingFinalCheck, A::Finalize) => (Role::Manager, S::Credited),
            (from, A::Reject) if from.is_rejectable() => (Role::Manager, S::Rejected),
            (from, action) => {
                return Err(TransitionError::InvalidTransition {
                    from: *from,
                    action,
                })
            },
        };

        Ok(edge)
    }

    /// Validate a transition attempt by an actor of the given role.
    /// Returns the target status on success.
    pub fn apply(
        &self,
        action: WorkflowAction,
        actor_role: Role,
    ) -> Result<AssignmentStatus, TransitionError> {
        let (required_role, to) = self.transition(action)?;
        if actor_role != required_role {
            return Err(TransitionError::Forbidden {
                role: actor_role,
                action,
            });
        }
        Ok(to)
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AssignmentStatus::Draft),
            "pending_manager_approval_1" => Ok(AssignmentStatus::PendingManagerApproval1),
            "assigned_to_writer" => Ok(AssignmentStatus::AssignedToWriter),
            "writing_in_progress" => Ok(AssignmentStatus::WritingInProgress),
            "pending_manager_approval_2" => Ok(AssignmentStatus::PendingManagerApproval2),
            "assigned_to_blogger" => Ok(AssignmentStatus::AssignedToBlogger),
            "published_pending_verification" => {
                Ok(AssignmentStatus::PublishedPendingVerification)
            },
            "pending_final_check" => Ok(AssignmentStatus::PendingFinalCheck),
            "completed" => Ok(AssignmentStatus::Completed),
            "credited" => Ok(AssignmentStatus::Credited),
            "rejected" => Ok(AssignmentStatus::Rejected),
            _ => Err(format!("Invalid assignment status: {}", s)),
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for AssignmentStatus
where
    DB: diesel::backend::Backend,
    String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
        let value = String::from_sql(bytes)?;
        Self::from_str(&value).map_err(|e| e.into())
    }
}

impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for AssignmentStatus
where
    DB: diesel::backend::Backend,
    str: diesel::serialize::ToSql<diesel::sql_types::Text, DB>,
{
    fn to_sql<'b>(
        &'b self,
        out: &mut diesel::serialize::Output<'b, '_, DB>,
    ) -> diesel::serialize::Result {
        self.as_str().to_sql(out)
    }
}

// =============================================================================
// DATABASE MODELS
// =============================================================================

/// Assignment database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Assignment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub site_id: Option<Uuid>,
    pub writer_id: Option<Uuid>,
    pub blogger_id: Option<Uuid>,
    pub anchor_text: Option<String>,
    pub target_url: Option<String>,
    pub content: Option<String>,
    pub note: Option<String>,
    pub price_cents: i64,
    pub current_status: String, // Will convert to enum
    pub rejection_reason: Option<String>,
    pub live_url: Option<String>,
    pub credited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New assignment for insertion (one per requested backlink)
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignments)]
pub struct NewAssignment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub anchor_text: Option<String>,
    pub target_url: Option<String>,
    pub price_cents: i64,
    pub current_status: String,
}

impl Assignment {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        assignment_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::assignments::dsl;

        dsl::assignments
            .filter(dsl::id.eq(assignment_id))
            .first::<Self>(conn)
            .await
    }

    pub async fn find_by_order(
        conn: &mut AsyncPgConnection,
        order: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::assignments::dsl;

        dsl::assignments
            .filter(dsl::order_id.eq(order))
            .order(dsl::created_at.asc())
            .load::<Self>(conn)
            .await
    }

    /// Compare-and-set status flip. Returns 0 rows updated when another
    /// actor moved the assignment first, which the caller surfaces as a
    /// conflict instead of silently overwriting.
    pub async fn cas_status(
        conn: &mut AsyncPgConnection,
        assignment_id: Uuid,
        expected: AssignmentStatus,
        next: AssignmentStatus,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::assignments::dsl;

        diesel::update(
            dsl::assignments
                .filter(dsl::id.eq(assignment_id))
                .filter(dsl::current_status.eq(expected.as_str())),
        )
        .set((
            dsl::current_status.eq(next.as_str()),
            dsl::updated_at.eq(Utc::now()),
        ))
        .execute(conn)
        .await
    }

    /// Get assignment status as enum
    pub fn status_enum(&self) -> AssignmentStatus {
        AssignmentStatus::from_str(&self.current_status).unwrap_or_else(|e| {
            tracing::warn!(
                "Invalid status '{}' for assignment {}, treating as Draft: {}",
                self.current_status,
                self.id,
                e
            );
            AssignmentStatus::Draft
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [AssignmentStatus; 11] = [
        AssignmentStatus::Draft,
        AssignmentStatus::PendingManagerApproval1,
        AssignmentStatus::AssignedToWriter,
        AssignmentStatus::WritingInProgress,
        AssignmentStatus::PendingManagerApproval2,
        AssignmentStatus::AssignedToBlogger,
        AssignmentStatus::PublishedPendingVerification,
        AssignmentStatus::PendingFinalCheck,
        AssignmentStatus::Completed,
        AssignmentStatus::Credited,
        AssignmentStatus::Rejected,
    ];

    const ALL_ACTIONS: [WorkflowAction; 9] = [
        WorkflowAction::SubmitToManager,
        WorkflowAction::ApproveSite,
        WorkflowAction::StartWriting,
        WorkflowAction::SubmitContent,
        WorkflowAction::PushToBlogger,
        WorkflowAction::Publish,
        WorkflowAction::MoveToFinalCheck,
        WorkflowAction::Finalize,
        WorkflowAction::Reject,
    ];

    #[test]
    fn test_status_string_round_trip() {
        for status in ALL_STATUSES {
            assert_eq!(AssignmentStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(AssignmentStatus::from_str("on_hold").is_err());
    }

    #[test]
    fn test_happy_path_edges() {
        use AssignmentStatus as S;
        use WorkflowAction as A;

        assert_eq!(
            S::Draft.apply(A::SubmitToManager, Role::Team),
            Ok(S::PendingManagerApproval1)
        );
        assert_eq!(
            S::PendingManagerApproval1.apply(A::ApproveSite, Role::Manager),
            Ok(S::AssignedToWriter)
        );
        assert_eq!(
            S::AssignedToWriter.apply(A::StartWriting, Role::Writer),
            Ok(S::WritingInProgress)
        );
        assert_eq!(
            S::WritingInProgress.apply(A::SubmitContent, Role::Writer),
            Ok(S::PendingManagerApproval2)
        );
        assert_eq!(
            S::PendingManagerApproval2.apply(A::PushToBlogger, Role::Manager),
            Ok(S::AssignedToBlogger)
        );
        assert_eq!(
            S::AssignedToBlogger.apply(A::Publish, Role::Blogger),
            Ok(S::PublishedPendingVerification)
        );
        assert_eq!(
            S::PublishedPendingVerification.apply(A::MoveToFinalCheck, Role::Manager),
            Ok(S::PendingFinalCheck)
        );
        assert_eq!(
            S::PendingFinalCheck.apply(A::Finalize, Role::Manager),
            Ok(S::Credited)
        );
        assert_eq!(
            S::PublishedPendingVerification.apply(A::Finalize, Role::Manager),
            Ok(S::Credited)
        );
    }

    #[test]
    fn test_no_direct_jumps() {
        use AssignmentStatus as S;
        use WorkflowAction as A;

        // The classic shortcut the table must forbid
        assert!(matches!(
            S::Draft.transition(A::Finalize),
            Err(TransitionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            S::Draft.transition(A::Publish),
            Err(TransitionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            S::AssignedToWriter.transition(A::PushToBlogger),
            Err(TransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_terminal_states_are_traps() {
        for status in [
            AssignmentStatus::Completed,
            AssignmentStatus::Credited,
            AssignmentStatus::Rejected,
        ] {
            assert!(status.is_terminal());
            for action in ALL_ACTIONS {
                assert!(
                    status.transition(action).is_err(),
                    "{:?} must not leave terminal state {:?}",
                    action,
                    status
                );
            }
        }
    }

    #[test]
    fn test_edge_count_matches_table() {
        // 9 forward edges + 4 rejectable states = 13 total edges
        let mut edges = 0;
        for status in ALL_STATUSES {
            for action in ALL_ACTIONS {
                if status.transition(action).is_ok() {
                    edges += 1;
                }
            }
        }
        assert_eq!(edges, 13);
    }

    #[test]
    fn test_actor_role_enforced() {
        use AssignmentStatus as S;
        use WorkflowAction as A;

        // A writer cannot approve their own work
        assert_eq!(
            S::PendingManagerApproval2.apply(A::PushToBlogger, Role::Writer),
            Err(TransitionError::Forbidden {
                role: Role::Writer,
                action: A::PushToBlogger
            })
        );
        // A team member cannot finalize
        assert_eq!(
            S::PublishedPendingVerification.apply(A::Finalize, Role::Team),
            Err(TransitionError::Forbidden {
                role: Role::Team,
                action: A::Finalize
            })
        );
        // Only the manager rejects
        assert!(S::PendingManagerApproval1
            .apply(A::Reject, Role::Blogger)
            .is_err());
    }

    #[test]
    fn test_reject_only_from_pending_states() {
        for status in ALL_STATUSES {
            let allowed = status.is_rejectable();
            assert_eq!(
                status.transition(WorkflowAction::Reject).is_ok(),
                allowed,
                "reject from {:?}",
                status
            );
        }
    }
}
