// Support thread tests: linear append-only log, participant gating,
// ungated status changes.

mod common;

use common::{create_test_user, setup_test_state};
use linkmart_backend_core::{
    models::{
        thread::{ThreadPriority, ThreadStatus},
        user::Role,
    },
    services::thread::ThreadService,
    utils::service_error::ServiceError,
};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn messages_append_in_order() {
    let state = setup_test_state().await;

    let blogger = create_test_user(&state, Role::Blogger).await;
    let admin = create_test_user(&state, Role::Admin).await;

    let service = ThreadService::new(&state);

    let view = service
        .create_thread(
            blogger.id,
            admin.id,
            "Payment not reflected",
            ThreadPriority::High,
            "My June payout is missing from the wallet.",
        )
        .await
        .unwrap();

    assert_eq!(view.messages.len(), 1);

    service
        .post_message(view.thread.id, admin.id, "Checking the ledger now.")
        .await
        .unwrap();
    service
        .post_message(view.thread.id, blogger.id, "Thanks, any update?")
        .await
        .unwrap();

    let reloaded = service.get_thread(view.thread.id, blogger.id).await.unwrap();
    let bodies: Vec<&str> = reloaded.messages.iter().map(|m| m.body.as_str()).collect();

    assert_eq!(
        bodies,
        vec![
            "My June payout is missing from the wallet.",
            "Checking the ledger now.",
            "Thanks, any update?"
        ]
    );
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn outsiders_cannot_read_or_post() {
    let state = setup_test_state().await;

    let writer = create_test_user(&state, Role::Writer).await;
    let manager = create_test_user(&state, Role::Manager).await;
    let outsider = create_test_user(&state, Role::Team).await;

    let service = ThreadService::new(&state);

    let view = service
        .create_thread(
            writer.id,
            manager.id,
            "Brief unclear",
            ThreadPriority::Normal,
            "What anchor text should task 3 use?",
        )
        .await
        .unwrap();

    let read = service.get_thread(view.thread.id, outsider.id).await;
    assert!(matches!(read, Err(ServiceError::Forbidden(_))));

    let post = service
        .post_message(view.thread.id, outsider.id, "let me in")
        .await;
    assert!(matches!(post, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn either_participant_sets_any_status() {
    let state = setup_test_state().await;

    let blogger = create_test_user(&state, Role::Blogger).await;
    let admin = create_test_user(&state, Role::Admin).await;

    let service = ThreadService::new(&state);

    let view = service
        .create_thread(
            blogger.id,
            admin.id,
            "Site metrics update",
            ThreadPriority::Low,
            "DA moved from 50 to 55, please re-check pricing.",
        )
        .await
        .unwrap();

    // No gating between status values, either direction
    let t = service
        .update_status(view.thread.id, admin.id, ThreadStatus::Closed)
        .await
        .unwrap();
    assert_eq!(t.status, "closed");

    let t = service
        .update_status(view.thread.id, blogger.id, ThreadStatus::Open)
        .await
        .unwrap();
    assert_eq!(t.status, "open");
}
