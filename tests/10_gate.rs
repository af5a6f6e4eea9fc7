mod common;

use chrono::Utc;

use atlas_admin_api::gate::{check_global_access, Decision};
use atlas_admin_api::types::UserRole;
use common::{window_at, TestStore};

#[tokio::test]
async fn active_window_blocks_regular_user() {
    // window = {start: T-1h, end: T+1h, is_active: true}, role = user
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, -1, 1, true)]);

    let decision = check_global_access(&store, "/dashboard", UserRole::User, now).await;
    assert_eq!(
        decision,
        Decision::Block { redirect_to: "/maintenance".to_string() }
    );
}

#[tokio::test]
async fn active_window_blocks_company_admin() {
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, -1, 1, true)]);

    let decision = check_global_access(&store, "/companies", UserRole::CompanyAdmin, now).await;
    assert!(matches!(decision, Decision::Block { .. }));
}

#[tokio::test]
async fn active_window_lets_super_admin_through() {
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, -1, 1, true)]);

    let decision = check_global_access(&store, "/dashboard", UserRole::SuperAdmin, now).await;
    assert_eq!(decision, Decision::Allow);
}

#[tokio::test]
async fn maintenance_page_never_redirects_to_itself() {
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, -1, 1, true)]);

    for role in [UserRole::SuperAdmin, UserRole::CompanyAdmin, UserRole::User] {
        let decision = check_global_access(&store, "/maintenance", role, now).await;
        assert!(
            !matches!(decision, Decision::Block { .. }),
            "gate produced a redirect loop for {:?}",
            role
        );
    }
}

#[tokio::test]
async fn ended_window_sends_parked_user_home() {
    // window = {start: T-2h, end: T-1h}, user still on the maintenance page
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, -2, -1, true)]);

    let decision = check_global_access(&store, "/maintenance", UserRole::User, now).await;
    assert_eq!(decision, Decision::RedirectHome);
}

#[tokio::test]
async fn canceled_window_is_ignored_for_all_roles() {
    // Canceled but inside its time range: treated as no effective window
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, -1, 1, false)]);

    for role in [UserRole::SuperAdmin, UserRole::CompanyAdmin, UserRole::User] {
        let decision = check_global_access(&store, "/dashboard", role, now).await;
        assert_eq!(decision, Decision::Allow);
    }
}

#[tokio::test]
async fn store_failure_fails_open_for_all_roles() {
    let now = Utc::now();
    let store = TestStore::failing();

    for role in [UserRole::SuperAdmin, UserRole::CompanyAdmin, UserRole::User] {
        let decision = check_global_access(&store, "/dashboard", role, now).await;
        assert_eq!(decision, Decision::Allow);
    }
}

#[tokio::test]
async fn overlapping_windows_resolve_to_earliest_start() {
    let now = Utc::now();
    let earlier = window_at(now, -3, 2, true);
    let later = window_at(now, -1, 3, true);
    let earlier_id = earlier.id;
    let store = TestStore::with_windows(vec![later, earlier]);

    // Still blocks a regular user...
    let decision = check_global_access(&store, "/dashboard", UserRole::User, now).await;
    assert!(matches!(decision, Decision::Block { .. }));

    // ...and the selection itself is deterministic
    let windows = {
        use atlas_admin_api::store::MaintenanceStore;
        store.effective_windows(now).await.unwrap()
    };
    let picked = atlas_admin_api::gate::select_effective(windows, now).unwrap();
    assert_eq!(picked.id, earlier_id);
}

#[tokio::test]
async fn upcoming_window_does_not_gate_yet() {
    let now = Utc::now();
    let store = TestStore::with_windows(vec![window_at(now, 1, 2, true)]);

    let decision = check_global_access(&store, "/dashboard", UserRole::User, now).await;
    assert_eq!(decision, Decision::Allow);
}
