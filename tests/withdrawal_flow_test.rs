// Withdrawal settlement tests
// Pending -> Paid debits the wallet with mandatory remarks; Pending ->
// Rejected leaves the balance alone; both are terminal.

mod common;

use common::{create_test_user, reload_user, setup_test_state};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use linkmart_backend_core::{
    models::{user::Role, withdrawal::PayoutMethod, withdrawal::WithdrawalStatus},
    services::wallet::WalletService,
    utils::service_error::ServiceError,
};
use serial_test::serial;

async fn fund_wallet(
    state: &linkmart_backend_core::app::AppState,
    user_id: uuid::Uuid,
    cents: i64,
) {
    use linkmart_backend_core::schema::users::dsl;

    let mut conn = state.diesel_pool.get().await.unwrap();
    diesel::update(dsl::users.filter(dsl::id.eq(user_id)))
        .set(dsl::wallet_balance_cents.eq(cents))
        .execute(&mut conn)
        .await
        .unwrap();
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn approval_debits_wallet_and_sets_clearance_date() {
    let state = setup_test_state().await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    fund_wallet(&state, blogger.id, 30_000).await;

    let service = WalletService::new(&state);

    let request = service
        .create_withdrawal(blogger.id, 25_000, PayoutMethod::Paypal, "payout@example.com")
        .await
        .unwrap();
    assert_eq!(request.status_enum(), WithdrawalStatus::Pending);

    // Remarks are mandatory
    let missing = service.approve_withdrawal(request.id, "  ").await;
    assert!(matches!(missing, Err(ServiceError::ValidationError(_))));

    let paid = service
        .approve_withdrawal(request.id, "Paid via PayPal batch #42")
        .await
        .unwrap();

    assert_eq!(paid.status_enum(), WithdrawalStatus::Paid);
    assert!(paid.clearance_date.is_some());
    assert_eq!(paid.admin_remarks.as_deref(), Some("Paid via PayPal batch #42"));

    let balance = reload_user(&state, blogger.id).await.wallet_balance_cents;
    assert_eq!(balance, 5_000);

    // Terminal: a second decision conflicts
    let repeated = service.approve_withdrawal(request.id, "again").await;
    assert!(matches!(repeated, Err(ServiceError::Conflict(_))));
    let rejected_after = service.reject_withdrawal(request.id, "too late").await;
    assert!(matches!(rejected_after, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn rejection_preserves_the_balance() {
    let state = setup_test_state().await;
    let writer = create_test_user(&state, Role::Writer).await;
    fund_wallet(&state, writer.id, 12_000).await;

    let service = WalletService::new(&state);

    let request = service
        .create_withdrawal(writer.id, 10_000, PayoutMethod::Upi, "writer@upi")
        .await
        .unwrap();

    let rejected = service
        .reject_withdrawal(request.id, "Account details do not match")
        .await
        .unwrap();

    assert_eq!(rejected.status_enum(), WithdrawalStatus::Rejected);
    assert_eq!(
        rejected.admin_remarks.as_deref(),
        Some("Account details do not match")
    );

    let balance = reload_user(&state, writer.id).await.wallet_balance_cents;
    assert_eq!(balance, 12_000);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn requests_cannot_exceed_the_balance() {
    let state = setup_test_state().await;
    let blogger = create_test_user(&state, Role::Blogger).await;
    fund_wallet(&state, blogger.id, 8_000).await;

    let service = WalletService::new(&state);

    let over = service
        .create_withdrawal(blogger.id, 9_000, PayoutMethod::Qr, "qr-code")
        .await;
    assert!(matches!(over, Err(ServiceError::InsufficientBalance)));

    // Pending requests reserve balance
    service
        .create_withdrawal(blogger.id, 6_000, PayoutMethod::Qr, "qr-code")
        .await
        .unwrap();

    let second = service
        .create_withdrawal(blogger.id, 3_000, PayoutMethod::Qr, "qr-code")
        .await;
    assert!(matches!(second, Err(ServiceError::InsufficientBalance)));
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn only_wallet_roles_may_request() {
    let state = setup_test_state().await;
    let team = create_test_user(&state, Role::Team).await;

    let service = WalletService::new(&state);
    let result = service
        .create_withdrawal(team.id, 1_000, PayoutMethod::BankTransfer, "IBAN123")
        .await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}
