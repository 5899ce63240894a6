// End-to-end workflow service test: a draft assignment walks the full
// lifecycle through every actor and lands credited.

mod common;

use common::{
    create_test_assignment, create_test_order, create_test_site, create_test_user, reload_user,
    setup_test_state,
};
use linkmart_backend_core::{
    models::{assignment::AssignmentStatus, user::Role},
    services::workflow::{Actor, WorkflowService},
    utils::service_error::ServiceError,
};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn full_lifecycle_from_draft_to_credited() {
    let state = setup_test_state().await;

    let manager = create_test_user(&state, Role::Manager).await;
    let team = create_test_user(&state, Role::Team).await;
    let writer = create_test_user(&state, Role::Writer).await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    let site = create_test_site(&state, &blogger, 12_000).await;
    let order = create_test_order(&state, &manager, 1).await;
    let assignment = create_test_assignment(&state, &order, AssignmentStatus::Draft).await;

    let service = WorkflowService::new(&state);
    let as_team = Actor {
        user_id: team.id,
        role: Role::Team,
    };
    let as_manager = Actor {
        user_id: manager.id,
        role: Role::Manager,
    };
    let as_writer = Actor {
        user_id: writer.id,
        role: Role::Writer,
    };
    let as_blogger = Actor {
        user_id: blogger.id,
        role: Role::Blogger,
    };

    // Team selects the site; the guest post price is copied onto the row
    let submitted = service
        .submit_to_manager(
            as_team,
            assignment.id,
            site.id,
            "High DR tech site, fits the niche",
            Some("best widgets".to_string()),
            Some("https://client.example.com/widgets".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(
        submitted.status_enum(),
        AssignmentStatus::PendingManagerApproval1
    );
    assert_eq!(submitted.price_cents, 12_000);
    assert_eq!(submitted.site_id, Some(site.id));

    // Manager approves and assigns the writer
    let approved = service
        .approve_site(as_manager, assignment.id, writer.id)
        .await
        .unwrap();
    assert_eq!(approved.status_enum(), AssignmentStatus::AssignedToWriter);
    assert_eq!(approved.writer_id, Some(writer.id));

    // A different writer cannot act on the row
    let stranger = create_test_user(&state, Role::Writer).await;
    let forbidden = service
        .start_writing(
            Actor {
                user_id: stranger.id,
                role: Role::Writer,
            },
            assignment.id,
        )
        .await;
    assert!(matches!(forbidden, Err(ServiceError::Forbidden(_))));

    // Writer works and submits
    service.start_writing(as_writer, assignment.id).await.unwrap();
    let drafted = service
        .submit_content(as_writer, assignment.id, "Article body with the backlink.")
        .await
        .unwrap();
    assert_eq!(
        drafted.status_enum(),
        AssignmentStatus::PendingManagerApproval2
    );

    // Manager pushes to the site owner; blogger resolved from the site
    let routed = service
        .push_to_blogger(as_manager, assignment.id)
        .await
        .unwrap();
    assert_eq!(routed.status_enum(), AssignmentStatus::AssignedToBlogger);
    assert_eq!(routed.blogger_id, Some(blogger.id));

    // Blogger publishes
    let published = service
        .publish(as_blogger, assignment.id, "https://site.example.com/post")
        .await
        .unwrap();
    assert_eq!(
        published.status_enum(),
        AssignmentStatus::PublishedPendingVerification
    );
    assert_eq!(
        published.live_url.as_deref(),
        Some("https://site.example.com/post")
    );

    // Manager stages and settles
    service
        .move_to_final_check(as_manager, assignment.id)
        .await
        .unwrap();
    let settled = service.finalize(as_manager, assignment.id).await.unwrap();

    assert_eq!(settled.status_enum(), AssignmentStatus::Credited);
    assert_eq!(
        reload_user(&state, blogger.id).await.wallet_balance_cents,
        12_000
    );
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn inactive_sites_are_not_selectable() {
    let state = setup_test_state().await;

    let manager = create_test_user(&state, Role::Manager).await;
    let team = create_test_user(&state, Role::Team).await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    let site = create_test_site(&state, &blogger, 5_000).await;
    let order = create_test_order(&state, &manager, 1).await;
    let assignment = create_test_assignment(&state, &order, AssignmentStatus::Draft).await;

    {
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use linkmart_backend_core::schema::sites::dsl;

        let mut conn = state.diesel_pool.get().await.unwrap();
        diesel::update(dsl::sites.filter(dsl::id.eq(site.id)))
            .set(dsl::is_active.eq(false))
            .execute(&mut conn)
            .await
            .unwrap();
    }

    let service = WorkflowService::new(&state);
    let result = service
        .submit_to_manager(
            Actor {
                user_id: team.id,
                role: Role::Team,
            },
            assignment.id,
            site.id,
            "note",
            None,
            None,
        )
        .await;

    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}
