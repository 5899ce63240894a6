// Finalize crediting tests
// The property that matters: an assignment credits its payee wallet exactly
// once, no matter how many times finalize is invoked.

mod common;

use common::{
    create_test_assignment, create_test_order, create_test_site, create_test_user,
    force_assignment_state, reload_user, setup_test_state,
};
use linkmart_backend_core::{
    models::{assignment::AssignmentStatus, user::Role, wallet::WalletTransaction},
    services::workflow::{Actor, WorkflowService},
    utils::service_error::ServiceError,
};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn finalize_credits_blogger_wallet_exactly_once() {
    let state = setup_test_state().await;

    let manager = create_test_user(&state, Role::Manager).await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    let site = create_test_site(&state, &blogger, 5000).await;
    let order = create_test_order(&state, &manager, 1).await;
    let assignment = create_test_assignment(&state, &order, AssignmentStatus::Draft).await;

    // A $50.00 placement awaiting verification
    force_assignment_state(
        &state,
        assignment.id,
        AssignmentStatus::PublishedPendingVerification,
        Some(site.id),
        None,
        Some(blogger.id),
        5000,
    )
    .await;

    let service = WorkflowService::new(&state);
    let actor = Actor {
        user_id: manager.id,
        role: Role::Manager,
    };

    let balance_before = reload_user(&state, blogger.id).await.wallet_balance_cents;

    let settled = service.finalize(actor, assignment.id).await.unwrap();
    assert_eq!(settled.status_enum(), AssignmentStatus::Credited);
    assert!(settled.credited_at.is_some());

    let balance_after = reload_user(&state, blogger.id).await.wallet_balance_cents;
    assert_eq!(balance_after - balance_before, 5000);

    // Second finalize is a no-op, not a second credit
    let repeated = service.finalize(actor, assignment.id).await.unwrap();
    assert_eq!(repeated.status_enum(), AssignmentStatus::Credited);

    let balance_final = reload_user(&state, blogger.id).await.wallet_balance_cents;
    assert_eq!(balance_final, balance_after, "repeat finalize must not re-credit");

    // Exactly one ledger row for this assignment
    let mut conn = state.diesel_pool.get().await.unwrap();
    let credits: Vec<WalletTransaction> =
        WalletTransaction::find_by_user_id(&mut conn, blogger.id)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.assignment_id == Some(assignment.id))
            .collect();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].amount_cents, 5000);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn finalize_requires_the_manager_role() {
    let state = setup_test_state().await;

    let manager = create_test_user(&state, Role::Manager).await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    let team = create_test_user(&state, Role::Team).await;
    let site = create_test_site(&state, &blogger, 3000).await;
    let order = create_test_order(&state, &manager, 1).await;
    let assignment = create_test_assignment(&state, &order, AssignmentStatus::Draft).await;

    force_assignment_state(
        &state,
        assignment.id,
        AssignmentStatus::PublishedPendingVerification,
        Some(site.id),
        None,
        Some(blogger.id),
        3000,
    )
    .await;

    let service = WorkflowService::new(&state);
    let result = service
        .finalize(
            Actor {
                user_id: team.id,
                role: Role::Team,
            },
            assignment.id,
        )
        .await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let balance = reload_user(&state, blogger.id).await.wallet_balance_cents;
    assert_eq!(balance, 0);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn finalize_from_draft_is_rejected() {
    let state = setup_test_state().await;

    let manager = create_test_user(&state, Role::Manager).await;
    let order = create_test_order(&state, &manager, 1).await;
    let assignment = create_test_assignment(&state, &order, AssignmentStatus::Draft).await;

    let service = WorkflowService::new(&state);
    let result = service
        .finalize(
            Actor {
                user_id: manager.id,
                role: Role::Manager,
            },
            assignment.id,
        )
        .await;

    assert!(matches!(result, Err(ServiceError::InvalidTransition(_))));
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn reject_persists_the_reason() {
    let state = setup_test_state().await;

    let manager = create_test_user(&state, Role::Manager).await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    let writer = create_test_user(&state, Role::Writer).await;
    let site = create_test_site(&state, &blogger, 4000).await;
    let order = create_test_order(&state, &manager, 1).await;
    let assignment = create_test_assignment(&state, &order, AssignmentStatus::Draft).await;

    force_assignment_state(
        &state,
        assignment.id,
        AssignmentStatus::PendingManagerApproval2,
        Some(site.id),
        Some(writer.id),
        None,
        4000,
    )
    .await;

    let service = WorkflowService::new(&state);
    let actor = Actor {
        user_id: manager.id,
        role: Role::Manager,
    };

    // Blank reasons are refused
    let blank = service.reject(actor, assignment.id, "   ").await;
    assert!(matches!(blank, Err(ServiceError::ValidationError(_))));

    let rejected = service
        .reject(actor, assignment.id, "duplicate content")
        .await
        .unwrap();

    assert_eq!(rejected.status_enum(), AssignmentStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("duplicate content"));
}
