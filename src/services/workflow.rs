// Assignment workflow service - the single write path for task status.
// Every transition is validated against the status table, ownership is
// checked against the row, and the status flip is a compare-and-set so
// concurrent actors cannot overwrite each other.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DieselPool,
    models::{
        assignment::{Assignment, AssignmentStatus, WorkflowAction},
        notification::{NewNotification, NotificationKind},
        order::Order,
        site::Site,
        user::{Role, User},
        wallet::{NewWalletTransaction, TransactionKind, WalletTransaction},
    },
    utils::{require_reason, service_error::ServiceError},
};

/// Actor identity for a workflow call: id from the route's authenticated
/// user, role from the JWT claims.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

pub struct WorkflowService {
    diesel_pool: DieselPool,
}

impl WorkflowService {
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

    /// Validate the transition against the table and flip the status with a
    /// compare-and-set. Returns the target status; a lost race surfaces as
    /// Conflict, not a silent overwrite.
    async fn transition(
        conn: &mut AsyncPgConnection,
        assignment: &Assignment,
        action: WorkflowAction,
        actor: &Actor,
    ) -> Result<AssignmentStatus, ServiceError> {
        let from = assignment.status_enum();
        let to = from.apply(action, actor.role)?;

        let updated = Assignment::cas_status(conn, assignment.id, from, to).await?;
        if updated == 0 {
            return Err(ServiceError::Conflict(format!(
                "Assignment {} was modified by another actor",
                assignment.id
            )));
        }

        info!(
            assignment_id = %assignment.id,
            from = from.as_str(),
            to = to.as_str(),
            actor = %actor.user_id,
            "Assignment transition applied"
        );

        Ok(to)
    }

    /// Team selects a site and submits the draft for first manager approval.
    /// The placement price is copied from the site at selection time.
    #[instrument(skip(self, note))]
    pub async fn submit_to_manager(
        &self,
        actor: Actor,
        assignment_id: Uuid,
        site_id: Uuid,
        note: &str,
        anchor_text: Option<String>,
        target_url: Option<String>,
    ) -> Result<Assignment, ServiceError> {
        let note = require_reason(note).map_err(ServiceError::ValidationError)?;

        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        let order = Order::find_by_id(&mut conn, assignment.order_id).await?;

        let site = Site::find_by_id(&mut conn, site_id).await?;
        if !site.is_active {
            return Err(ServiceError::ValidationError(
                "Site is not eligible for selection".to_string(),
            ));
        }

        let price = site.price_for(order.order_type_enum());

        Self::transition(&mut conn, &assignment, WorkflowAction::SubmitToManager, &actor).await?;

        {
            use crate::schema::assignments::dsl;
            diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                .set((
                    dsl::site_id.eq(Some(site_id)),
                    dsl::note.eq(Some(note)),
                    dsl::anchor_text.eq(anchor_text),
                    dsl::target_url.eq(target_url),
                    dsl::price_cents.eq(price),
                    dsl::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await?;
        }

        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Manager approves the site selection and assigns a writer.
    #[instrument(skip(self))]
    pub async fn approve_site(
        &self,
        actor: Actor,
        assignment_id: Uuid,
        writer_id: Uuid,
    ) -> Result<Assignment, ServiceError> {
        let mut conn = self.conn().await?;

        let writer = User::find_by_id(&mut conn, writer_id).await?;
        if writer.role_enum() != Role::Writer || !writer.is_active {
            return Err(ServiceError::ValidationError(
                "Assignee must be an active writer".to_string(),
            ));
        }

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        Self::transition(&mut conn, &assignment, WorkflowAction::ApproveSite, &actor).await?;

        {
            use crate::schema::assignments::dsl;
            diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                .set((
                    dsl::writer_id.eq(Some(writer_id)),
                    dsl::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await?;
        }

        Self::notify(
            &mut conn,
            writer_id,
            NotificationKind::TaskAssigned,
            "A new writing task has been assigned to you",
            Some(assignment_id),
        )
        .await?;

        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Manager rejects a pending assignment. The reason is mandatory,
    /// persisted, and shown in rejected-task views. REJECTED is terminal.
    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        actor: Actor,
        assignment_id: Uuid,
        reason: &str,
    ) -> Result<Assignment, ServiceError> {
        let reason = require_reason(reason).map_err(ServiceError::ValidationError)?;

        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        Self::transition(&mut conn, &assignment, WorkflowAction::Reject, &actor).await?;

        {
            use crate::schema::assignments::dsl;
            diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                .set((
                    dsl::rejection_reason.eq(Some(reason.clone())),
                    dsl::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await?;
        }

        // Whoever was holding the work gets told why it bounced
        for affected in [assignment.writer_id, assignment.blogger_id]
            .into_iter()
            .flatten()
        {
            Self::notify(
                &mut conn,
                affected,
                NotificationKind::TaskRejected,
                &format!("Task was rejected: {}", reason),
                Some(assignment_id),
            )
            .await?;
        }

        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Writer picks up the assigned task.
    #[instrument(skip(self))]
    pub async fn start_writing(
        &self,
        actor: Actor,
        assignment_id: Uuid,
    ) -> Result<Assignment, ServiceError> {
        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        Self::check_owner(assignment.writer_id, actor.user_id, "writer")?;

        Self::transition(&mut conn, &assignment, WorkflowAction::StartWriting, &actor).await?;
        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Writer submits finished content for second manager approval.
    #[instrument(skip(self, content))]
    pub async fn submit_content(
        &self,
        actor: Actor,
        assignment_id: Uuid,
        content: &str,
    ) -> Result<Assignment, ServiceError> {
        let content = require_reason(content)
            .map_err(|_| ServiceError::ValidationError("Content is required".to_string()))?;

        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        Self::check_owner(assignment.writer_id, actor.user_id, "writer")?;

        Self::transition(&mut conn, &assignment, WorkflowAction::SubmitContent, &actor).await?;

        {
            use crate::schema::assignments::dsl;
            diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                .set((dsl::content.eq(Some(content)), dsl::updated_at.eq(Utc::now())))
                .execute(&mut conn)
                .await?;
        }

        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Manager approves content and routes the task to the owner of the
    /// selected site.
    #[instrument(skip(self))]
    pub async fn push_to_blogger(
        &self,
        actor: Actor,
        assignment_id: Uuid,
    ) -> Result<Assignment, ServiceError> {
        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;

        let site_id = assignment.site_id.ok_or_else(|| {
            ServiceError::InvalidTransition("Assignment has no selected site".to_string())
        })?;
        let site = Site::find_by_id(&mut conn, site_id).await?;

        Self::transition(&mut conn, &assignment, WorkflowAction::PushToBlogger, &actor).await?;

        {
            use crate::schema::assignments::dsl;
            diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                .set((
                    dsl::blogger_id.eq(Some(site.blogger_id)),
                    dsl::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await?;
        }

        Self::notify(
            &mut conn,
            site.blogger_id,
            NotificationKind::TaskAssigned,
            &format!("A publishing task is waiting for {}", site.domain),
            Some(assignment_id),
        )
        .await?;

        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Blogger publishes the content and submits the live URL.
    #[instrument(skip(self))]
    pub async fn publish(
        &self,
        actor: Actor,
        assignment_id: Uuid,
        live_url: &str,
    ) -> Result<Assignment, ServiceError> {
        let live_url = require_reason(live_url)
            .map_err(|_| ServiceError::ValidationError("Live URL is required".to_string()))?;

        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        Self::check_owner(assignment.blogger_id, actor.user_id, "blogger")?;

        Self::transition(&mut conn, &assignment, WorkflowAction::Publish, &actor).await?;

        {
            use crate::schema::assignments::dsl;
            diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                .set((
                    dsl::live_url.eq(Some(live_url)),
                    dsl::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await?;
        }

        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Manager stages a published assignment for the final check queue.
    #[instrument(skip(self))]
    pub async fn move_to_final_check(
        &self,
        actor: Actor,
        assignment_id: Uuid,
    ) -> Result<Assignment, ServiceError> {
        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        Self::transition(&mut conn, &assignment, WorkflowAction::MoveToFinalCheck, &actor).await?;
        Ok(Assignment::find_by_id(&mut conn, assignment_id).await?)
    }

    /// Manager verifies the live placement and finalizes the assignment.
    ///
    /// Applies the wallet credit exactly once per assignment: the ledger
    /// insert, balance increment, credited_at stamp and status flip share
    /// one transaction. Calling finalize on an already-finalized assignment
    /// is a no-op returning the current row, never a second credit.
    #[instrument(skip(self))]
    pub async fn finalize(
        &self,
        actor: Actor,
        assignment_id: Uuid,
    ) -> Result<Assignment, ServiceError> {
        let mut conn = self.conn().await?;

        let assignment = Assignment::find_by_id(&mut conn, assignment_id).await?;
        let from = assignment.status_enum();

        // Idempotent repeat: already finalized, nothing to do
        if matches!(
            from,
            AssignmentStatus::Completed | AssignmentStatus::Credited
        ) {
            info!(
                assignment_id = %assignment_id,
                status = from.as_str(),
                "Finalize repeated on settled assignment; no-op"
            );
            return Ok(assignment);
        }

        // Validate the edge (and the actor) before opening the transaction
        from.apply(WorkflowAction::Finalize, actor.role)?;

        let payee = assignment.blogger_id.ok_or_else(|| {
            ServiceError::InvalidTransition("Assignment has no blogger to credit".to_string())
        })?;
        let price = assignment.price_cents;

        // Zero-price placements complete without a wallet credit
        let target = if price == 0 {
            AssignmentStatus::Completed
        } else {
            AssignmentStatus::Credited
        };

        let (settled, credited_now): (Assignment, bool) = conn
            .transaction::<_, ServiceError, _>(|tx| {
                Box::pin(async move {
                    // Ledger backstop: one credit per assignment, ever. A
                    // concurrent finalize that won the race leaves a row here.
                    if WalletTransaction::credit_exists_for_assignment(tx, assignment_id).await? {
                        return Ok((Assignment::find_by_id(tx, assignment_id).await?, false));
                    }

                    let updated =
                        Assignment::cas_status(tx, assignment_id, from, target).await?;
                    if updated == 0 {
                        return Err(ServiceError::Conflict(format!(
                            "Assignment {} was modified by another actor",
                            assignment_id
                        )));
                    }

                    if price > 0 {
                        let entry = NewWalletTransaction {
                            id: Uuid::new_v4(),
                            user_id: payee,
                            assignment_id: Some(assignment_id),
                            withdrawal_request_id: None,
                            amount_cents: price,
                            kind: TransactionKind::AssignmentCredit.as_str().to_string(),
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
                            diesel::update(dsl::users.filter(dsl::id.eq(payee)))
                                .set((
                                    dsl::wallet_balance_cents
                                        .eq(dsl::wallet_balance_cents + price),
                                    dsl::updated_at.eq(Utc::now()),
                                ))
                                .execute(tx)
                                .await?;
                        }
                    }

                    {
                        use crate::schema::assignments::dsl;
                        diesel::update(dsl::assignments.filter(dsl::id.eq(assignment_id)))
                            .set((
                                dsl::credited_at.eq(Some(Utc::now())),
                                dsl::updated_at.eq(Utc::now()),
                            ))
                            .execute(tx)
                            .await?;
                    }

                    Ok((Assignment::find_by_id(tx, assignment_id).await?, true))
                })
            })
            .await?;

        if credited_now && price > 0 {
            Self::notify(
                &mut conn,
                payee,
                NotificationKind::TaskCredited,
                &format!("Your wallet was credited {} cents", price),
                Some(assignment_id),
            )
            .await?;
        }

        info!(
            assignment_id = %assignment_id,
            payee = %payee,
            amount_cents = price,
            "Assignment finalized"
        );

        Ok(settled)
    }

    fn check_owner(owner: Option<Uuid>, actor_id: Uuid, role_name: &str) -> Result<(), ServiceError> {
        match owner {
            Some(id) if id == actor_id => Ok(()),
            _ => Err(ServiceError::Forbidden(format!(
                "Only the assigned {} may perform this action",
                role_name
            ))),
        }
    }

    async fn notify(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        kind: NotificationKind,
        body: &str,
        assignment_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        use crate::schema::notifications::dsl;

        let row = NewNotification {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.as_str().to_string(),
            body: body.to_string(),
            assignment_id,
        };

        diesel::insert_into(dsl::notifications)
            .values(&row)
            .execute(conn)
            .await?;

        Ok(())
    }
}
