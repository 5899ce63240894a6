// Support thread service - create, append, set status.
// The conversation is a linear append-only log; either participant may
// change the shared status, with no gating between values.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app::AppState,
    db::DieselPool,
    models::thread::{
        NewThread, NewThreadMessage, Thread, ThreadMessage, ThreadPriority, ThreadStatus,
    },
    utils::service_error::ServiceError,
};

pub struct ThreadService {
    diesel_pool: DieselPool,
}

/// A thread with its full message log
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ThreadView {
    pub thread: Thread,
    pub messages: Vec<ThreadMessage>,
}

impl ThreadService {
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

    /// Open a thread with its initial message
    #[instrument(skip(self, subject, message))]
    pub async fn create_thread(
        &self,
        opened_by: Uuid,
        counterpart_id: Uuid,
        subject: &str,
        priority: ThreadPriority,
        message: &str,
    ) -> Result<ThreadView, ServiceError> {
        if opened_by == counterpart_id {
            return Err(ServiceError::ValidationError(
                "Cannot open a thread with yourself".to_string(),
            ));
        }

        let mut conn = self.conn().await?;

        let thread_row = NewThread {
            id: Uuid::new_v4(),
            subject: subject.trim().to_string(),
            opened_by,
            counterpart_id,
            priority: priority.as_str().to_string(),
            status: ThreadStatus::Open.as_str().to_string(),
        };

        let thread: Thread = {
            use crate::schema::threads::dsl;
            diesel::insert_into(dsl::threads)
                .values(&thread_row)
                .get_result(&mut conn)
                .await?
        };

        let first = NewThreadMessage {
            id: Uuid::new_v4(),
            thread_id: thread.id,
            sender_id: opened_by,
            body: message.trim().to_string(),
        };

        let messages: Vec<ThreadMessage> = {
            use crate::schema::thread_messages::dsl;
            vec![diesel::insert_into(dsl::thread_messages)
                .values(&first)
                .get_result(&mut conn)
                .await?]
        };

        Ok(ThreadView { thread, messages })
    }

    /// Threads the user participates in, newest activity first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Thread>, i64), ServiceError> {
        use crate::schema::threads::dsl;
        use diesel::dsl::count_star;

        let mut conn = self.conn().await?;

        let participant =
            dsl::opened_by.eq(user_id).or(dsl::counterpart_id.eq(user_id));

        let total: i64 = dsl::threads
            .filter(participant)
            .select(count_star())
            .first(&mut conn)
            .await?;

        let rows = dsl::threads
            .filter(participant)
            .order((dsl::updated_at.desc(), dsl::id.desc()))
            .offset(offset)
            .limit(limit)
            .load::<Thread>(&mut conn)
            .await?;

        Ok((rows, total))
    }

    /// Full thread with ordered message log; participants only
    pub async fn get_thread(
        &self,
        thread_id: Uuid,
        user_id: Uuid,
    ) -> Result<ThreadView, ServiceError> {
        let mut conn = self.conn().await?;

        let thread = Thread::find_by_id(&mut conn, thread_id).await?;
        if !thread.is_participant(user_id) {
            return Err(ServiceError::Forbidden(
                "Not a participant in this thread".to_string(),
            ));
        }

        let messages = ThreadMessage::find_by_thread(&mut conn, thread_id).await?;

        Ok(ThreadView { thread, messages })
    }

    /// Append a message. Messages are never edited or deleted.
    #[instrument(skip(self, body))]
    pub async fn post_message(
        &self,
        thread_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<ThreadMessage, ServiceError> {
        let mut conn = self.conn().await?;

        let thread = Thread::find_by_id(&mut conn, thread_id).await?;
        if !thread.is_participant(sender_id) {
            return Err(ServiceError::Forbidden(
                "Not a participant in this thread".to_string(),
            ));
        }

        let row = NewThreadMessage {
            id: Uuid::new_v4(),
            thread_id,
            sender_id,
            body: body.trim().to_string(),
        };

        let message: ThreadMessage = {
            use crate::schema::thread_messages::dsl;
            diesel::insert_into(dsl::thread_messages)
                .values(&row)
                .get_result(&mut conn)
                .await?
        };

        {
            use crate::schema::threads::dsl;
            diesel::update(dsl::threads.filter(dsl::id.eq(thread_id)))
                .set(dsl::updated_at.eq(Utc::now()))
                .execute(&mut conn)
                .await?;
        }

        Ok(message)
    }

    /// Set the shared status; any participant, any value
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        thread_id: Uuid,
        user_id: Uuid,
        status: ThreadStatus,
    ) -> Result<Thread, ServiceError> {
        let mut conn = self.conn().await?;

        let thread = Thread::find_by_id(&mut conn, thread_id).await?;
        if !thread.is_participant(user_id) {
            return Err(ServiceError::Forbidden(
                "Not a participant in this thread".to_string(),
            ));
        }

        let updated: Thread = {
            use crate::schema::threads::dsl;
            diesel::update(dsl::threads.filter(dsl::id.eq(thread_id)))
                .set((
                    dsl::status.eq(status.as_str()),
                    dsl::updated_at.eq(Utc::now()),
                ))
                .get_result(&mut conn)
                .await?
        };

        Ok(updated)
    }
}
