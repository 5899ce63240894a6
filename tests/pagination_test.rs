// Pagination windowing tests
// Pure checks on the shared Pagination helper plus a database round trip.

mod common;

use linkmart_backend_core::utils::pagination::{Paginated, Pagination};

#[test]
fn page_two_of_fifty_over_120_rows_is_rows_51_to_100() {
    let rows: Vec<u32> = (1..=120).collect();
    let p = Pagination {
        page: 2,
        per_page: 50,
    };

    let window: Vec<u32> = rows
        .iter()
        .skip(p.offset() as usize)
        .take(p.limit() as usize)
        .copied()
        .collect();

    assert_eq!(window.len(), 50);
    assert_eq!(*window.first().unwrap(), 51);
    assert_eq!(*window.last().unwrap(), 100);
}

#[test]
fn windows_partition_the_collection() {
    // Every row appears in exactly one page
    let rows: Vec<u32> = (1..=120).collect();
    let per_page = 50;

    let mut seen = Vec::new();
    for page in 1..=3 {
        let p = Pagination { page, per_page };
        seen.extend(
            rows.iter()
                .skip(p.offset() as usize)
                .take(p.limit() as usize)
                .copied(),
        );
    }

    assert_eq!(seen, rows);
}

#[test]
fn envelope_reports_normalized_parameters() {
    let p = Pagination {
        page: 0,
        per_page: 1000,
    };
    let envelope = Paginated::new(vec![1, 2, 3], &p, 3);

    assert_eq!(envelope.page, 1);
    assert_eq!(envelope.per_page, 100);
    assert_eq!(envelope.total, 3);
}

#[tokio::test]
#[serial_test::serial]
#[ignore] // Requires database
async fn user_listing_windows_match_the_ordered_collection() {
    use common::{create_test_user, setup_test_state};
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;
    use linkmart_backend_core::models::user::{Role, User};
    use linkmart_backend_core::schema::users::dsl;

    let state = setup_test_state().await;

    for _ in 0..5 {
        create_test_user(&state, Role::Writer).await;
    }

    let mut conn = state.diesel_pool.get().await.unwrap();

    let all: Vec<User> = dsl::users
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .load(&mut conn)
        .await
        .unwrap();

    let p = Pagination {
        page: 2,
        per_page: 2,
    };
    let page: Vec<User> = dsl::users
        .order((dsl::created_at.desc(), dsl::id.desc()))
        .offset(p.offset())
        .limit(p.limit())
        .load(&mut conn)
        .await
        .unwrap();

    let expected: Vec<uuid::Uuid> = all.iter().skip(2).take(2).map(|u| u.id).collect();
    let actual: Vec<uuid::Uuid> = page.iter().map(|u| u.id).collect();

    assert_eq!(actual, expected);
}
