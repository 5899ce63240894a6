// Assignment status machine tests
// Pure table checks; no database required.

use linkmart_backend_core::models::assignment::{
    AssignmentStatus, TransitionError, WorkflowAction,
};
use linkmart_backend_core::models::user::Role;

use AssignmentStatus as S;
use WorkflowAction as A;

const ALL_STATUSES: [S; 11] = [
    S::Draft,
    S::PendingManagerApproval1,
    S::AssignedToWriter,
    S::WritingInProgress,
    S::PendingManagerApproval2,
    S::AssignedToBlogger,
    S::PublishedPendingVerification,
    S::PendingFinalCheck,
    S::Completed,
    S::Credited,
    S::Rejected,
];

const ALL_ACTIONS: [A; 9] = [
    A::SubmitToManager,
    A::ApproveSite,
    A::StartWriting,
    A::SubmitContent,
    A::PushToBlogger,
    A::Publish,
    A::MoveToFinalCheck,
    A::Finalize,
    A::Reject,
];

const ALL_ROLES: [Role; 5] = [
    Role::Admin,
    Role::Manager,
    Role::Team,
    Role::Writer,
    Role::Blogger,
];

#[test]
fn full_lifecycle_follows_the_table() {
    let mut status = S::Draft;

    status = status.apply(A::SubmitToManager, Role::Team).unwrap();
    assert_eq!(status, S::PendingManagerApproval1);

    status = status.apply(A::ApproveSite, Role::Manager).unwrap();
    assert_eq!(status, S::AssignedToWriter);

    status = status.apply(A::StartWriting, Role::Writer).unwrap();
    assert_eq!(status, S::WritingInProgress);

    status = status.apply(A::SubmitContent, Role::Writer).unwrap();
    assert_eq!(status, S::PendingManagerApproval2);

    status = status.apply(A::PushToBlogger, Role::Manager).unwrap();
    assert_eq!(status, S::AssignedToBlogger);

    status = status.apply(A::Publish, Role::Blogger).unwrap();
    assert_eq!(status, S::PublishedPendingVerification);

    status = status.apply(A::MoveToFinalCheck, Role::Manager).unwrap();
    assert_eq!(status, S::PendingFinalCheck);

    status = status.apply(A::Finalize, Role::Manager).unwrap();
    assert_eq!(status, S::Credited);
    assert!(status.is_terminal());
}

#[test]
fn finalize_is_reachable_without_the_final_check_stage() {
    assert_eq!(
        S::PublishedPendingVerification.apply(A::Finalize, Role::Manager),
        Ok(S::Credited)
    );
}

#[test]
fn exactly_the_table_edges_exist() {
    // 9 forward edges plus reject from the 4 pending states
    let mut edges: Vec<(S, A)> = Vec::new();
    for status in ALL_STATUSES {
        for action in ALL_ACTIONS {
            if status.transition(action).is_ok() {
                edges.push((status, action));
            }
        }
    }

    assert_eq!(edges.len(), 13, "unexpected edge set: {:?}", edges);
}

#[test]
fn no_direct_jumps_to_terminal_states() {
    for status in [
        S::Draft,
        S::PendingManagerApproval1,
        S::AssignedToWriter,
        S::WritingInProgress,
        S::PendingManagerApproval2,
        S::AssignedToBlogger,
    ] {
        assert!(
            matches!(
                status.transition(A::Finalize),
                Err(TransitionError::InvalidTransition { .. })
            ),
            "finalize must not be reachable from {:?}",
            status
        );
    }
}

#[test]
fn rejected_is_a_trap_state() {
    for action in ALL_ACTIONS {
        assert!(S::Rejected.transition(action).is_err());
    }
}

#[test]
fn settled_assignments_admit_no_actions() {
    for status in [S::Completed, S::Credited] {
        for action in ALL_ACTIONS {
            assert!(status.transition(action).is_err());
        }
    }
}

#[test]
fn reject_is_limited_to_pending_states() {
    let rejectable = [
        S::PendingManagerApproval1,
        S::PendingManagerApproval2,
        S::PublishedPendingVerification,
        S::PendingFinalCheck,
    ];

    for status in ALL_STATUSES {
        let expected = rejectable.contains(&status);
        assert_eq!(
            status.transition(A::Reject).is_ok(),
            expected,
            "reject from {:?}",
            status
        );
    }
}

#[test]
fn only_the_table_role_may_act() {
    for status in ALL_STATUSES {
        for action in ALL_ACTIONS {
            let Ok((required_role, expected_target)) = status.transition(action) else {
                continue;
            };

            for role in ALL_ROLES {
                let result = status.apply(action, role);
                if role == required_role {
                    assert_eq!(result, Ok(expected_target));
                } else {
                    assert_eq!(
                        result,
                        Err(TransitionError::Forbidden { role, action }),
                        "{:?} acting as {:?} from {:?}",
                        action,
                        role,
                        status
                    );
                }
            }
        }
    }
}

#[test]
fn admin_holds_no_workflow_edges() {
    for status in ALL_STATUSES {
        for action in ALL_ACTIONS {
            assert!(status.apply(action, Role::Admin).is_err());
        }
    }
}

#[test]
fn status_strings_round_trip() {
    use std::str::FromStr;

    for status in ALL_STATUSES {
        assert_eq!(
            AssignmentStatus::from_str(status.as_str()),
            Ok(status),
            "round trip for {:?}",
            status
        );
    }
}
