use chrono::{DateTime, Utc};

use crate::config;
use crate::store::MaintenanceStore;
use crate::types::UserRole;

use super::decision::{evaluate_global_access, select_effective, Decision};

/// Query the store and evaluate route access in one step.
///
/// This is the single entry point for every call site that needs a live
/// answer (route guard, landing endpoint). A store failure fails open: a
/// transient backend error must never lock non-admin users out, so it is
/// logged and treated as "no effective window".
pub async fn check_global_access(
    store: &dyn MaintenanceStore,
    current_path: &str,
    role: UserRole,
    now: DateTime<Utc>,
) -> Decision {
    let effective = match store.effective_windows(now).await {
        Ok(windows) => select_effective(windows, now),
        Err(err) => {
            tracing::error!(
                path = current_path,
                role = %role,
                error = %err,
                "maintenance store query failed; failing open"
            );
            None
        }
    };

    evaluate_global_access(
        current_path,
        role,
        effective.as_ref(),
        &config::config().maintenance.page_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::MaintenanceWindow;
    use crate::store::{NewMaintenanceWindow, StoreError};
    use async_trait::async_trait;
    use chrono::Duration;
    use uuid::Uuid;

    /// Store that either returns a fixed window set or always errors
    struct FixedStore {
        windows: Vec<MaintenanceWindow>,
        fail: bool,
    }

    #[async_trait]
    impl MaintenanceStore for FixedStore {
        async fn effective_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
            if self.fail {
                return Err(StoreError::Backend("connection refused".to_string()));
            }
            Ok(self
                .windows
                .iter()
                .filter(|w| crate::gate::is_effective(w, now))
                .cloned()
                .collect())
        }

        async fn upcoming_windows(&self, _now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
            Ok(Vec::new())
        }

        async fn history(&self, _limit: i64) -> Result<Vec<MaintenanceWindow>, StoreError> {
            Ok(Vec::new())
        }

        async fn create(&self, _window: NewMaintenanceWindow) -> Result<MaintenanceWindow, StoreError> {
            Err(StoreError::Backend("read-only".to_string()))
        }

        async fn cancel(&self, _id: Uuid) -> Result<(), StoreError> {
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    fn active_window(now: DateTime<Utc>) -> MaintenanceWindow {
        MaintenanceWindow {
            id: Uuid::new_v4(),
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            message_tr: "Bakım".to_string(),
            message_en: "Maintenance".to_string(),
            affected_services: None,
            is_active: true,
            scheduled_by: Uuid::new_v4(),
            created_at: now - Duration::days(1),
        }
    }

    #[tokio::test]
    async fn blocks_regular_user_during_window() {
        let now = Utc::now();
        let store = FixedStore { windows: vec![active_window(now)], fail: false };

        let decision = check_global_access(&store, "/dashboard", UserRole::User, now).await;
        assert!(matches!(decision, Decision::Block { .. }));
    }

    #[tokio::test]
    async fn fails_open_for_every_role_when_store_errors() {
        let now = Utc::now();
        let store = FixedStore { windows: Vec::new(), fail: true };

        for role in [UserRole::SuperAdmin, UserRole::CompanyAdmin, UserRole::User] {
            let decision = check_global_access(&store, "/dashboard", role, now).await;
            assert_eq!(decision, Decision::Allow);
        }
    }

    #[tokio::test]
    async fn store_error_on_maintenance_page_sends_caller_home() {
        // Fail-open means "no effective window"; parked on the landing page
        // that resolves to the redirect-home transition
        let now = Utc::now();
        let store = FixedStore { windows: Vec::new(), fail: true };

        let decision = check_global_access(&store, "/maintenance", UserRole::User, now).await;
        assert_eq!(decision, Decision::RedirectHome);
    }
}
