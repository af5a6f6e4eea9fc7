use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::database::models::MaintenanceWindow;
use crate::store::MaintenanceStore;

use super::decision::select_effective;

/// Published gate state. `Checking` is the initial value on start: callers
/// must render a neutral state, never content and never the maintenance
/// page, until the first poll resolves.
#[derive(Debug, Clone)]
pub enum GateStatus {
    Checking,
    Active(MaintenanceWindow),
    Clear,
}

impl GateStatus {
    pub fn is_maintenance(&self) -> bool {
        matches!(self, GateStatus::Active(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateStatus::Checking => "checking",
            GateStatus::Active(_) => "maintenance",
            GateStatus::Clear => "clear",
        }
    }
}

/// Background poller that keeps a shared `GateStatus` current.
///
/// Owned explicitly by the server lifecycle: `spawn` starts the task, the
/// shutdown channel stops it, and a poll in flight at shutdown is dropped
/// without publishing. Each poll carries a monotonically increasing token
/// so a superseded response that resolves late cannot overwrite a newer
/// result.
pub struct MaintenanceWatcher {
    store: Arc<dyn MaintenanceStore>,
    status: watch::Sender<GateStatus>,
    next_token: AtomicU64,
    applied_token: AtomicU64,
}

impl MaintenanceWatcher {
    pub fn new(store: Arc<dyn MaintenanceStore>) -> Self {
        let (status, _) = watch::channel(GateStatus::Checking);
        Self {
            store,
            status,
            next_token: AtomicU64::new(1),
            applied_token: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GateStatus> {
        self.status.subscribe()
    }

    pub fn current(&self) -> GateStatus {
        self.status.borrow().clone()
    }

    /// Run one poll. Independent and idempotent; safe to call concurrently
    /// with the scheduled loop (overlapping polls are not coalesced, the
    /// token keeps the newest result in place).
    pub async fn refresh(&self) {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();

        let status = match self.store.effective_windows(now).await {
            Ok(windows) => match select_effective(windows, now) {
                Some(window) => GateStatus::Active(window),
                None => GateStatus::Clear,
            },
            Err(err) => {
                // Fail open: a poll failure is not evidence of maintenance
                tracing::error!(error = %err, "maintenance poll failed; failing open");
                GateStatus::Clear
            }
        };

        self.apply(token, status);
    }

    fn apply(&self, token: u64, status: GateStatus) {
        let newest = self.applied_token.fetch_max(token, Ordering::SeqCst);
        if newest > token {
            tracing::debug!(token, newest, "stale maintenance poll discarded");
            return;
        }

        let previous = self.status.borrow().label();
        if previous != status.label() {
            match &status {
                GateStatus::Active(window) => {
                    tracing::info!(window_id = %window.id, end_time = %window.end_time, "maintenance window now in effect");
                }
                GateStatus::Clear => {
                    tracing::info!("maintenance window cleared");
                }
                GateStatus::Checking => {}
            }
        }

        self.status.send_replace(status);
    }

    /// Start the polling loop. The first poll runs immediately, then on the
    /// fixed interval, until the shutdown channel fires or its sender drops.
    pub fn spawn(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(interval_secs = interval.as_secs(), "maintenance watcher started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = self.refresh() => {}
                            // Shutdown mid-poll: the in-flight future is
                            // dropped, nothing is published
                            _ = shutdown.changed() => break,
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }

            tracing::info!("maintenance watcher stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewMaintenanceWindow, StoreError};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Store whose window set and failure mode can be swapped mid-test
    struct ScriptedStore {
        windows: Mutex<Vec<MaintenanceWindow>>,
        fail: Mutex<bool>,
    }

    impl ScriptedStore {
        fn new() -> Self {
            Self {
                windows: Mutex::new(Vec::new()),
                fail: Mutex::new(false),
            }
        }

        fn set_windows(&self, windows: Vec<MaintenanceWindow>) {
            *self.windows.lock().unwrap() = windows;
        }

        fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl MaintenanceStore for ScriptedStore {
        async fn effective_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
            if *self.fail.lock().unwrap() {
                return Err(StoreError::Backend("boom".to_string()));
            }
            Ok(self
                .windows
                .lock()
                .unwrap()
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

    fn active_window() -> MaintenanceWindow {
        let now = Utc::now();
        MaintenanceWindow {
            id: Uuid::new_v4(),
            start_time: now - ChronoDuration::hours(1),
            end_time: now + ChronoDuration::hours(1),
            message_tr: "Bakım".to_string(),
            message_en: "Maintenance".to_string(),
            affected_services: None,
            is_active: true,
            scheduled_by: Uuid::new_v4(),
            created_at: now - ChronoDuration::days(1),
        }
    }

    #[tokio::test]
    async fn starts_in_checking_state() {
        let watcher = MaintenanceWatcher::new(Arc::new(ScriptedStore::new()));
        assert_eq!(watcher.current().label(), "checking");
    }

    #[tokio::test]
    async fn refresh_publishes_active_then_clear() {
        let store = Arc::new(ScriptedStore::new());
        let watcher = MaintenanceWatcher::new(store.clone());

        store.set_windows(vec![active_window()]);
        watcher.refresh().await;
        assert!(watcher.current().is_maintenance());

        store.set_windows(Vec::new());
        watcher.refresh().await;
        assert_eq!(watcher.current().label(), "clear");
    }

    #[tokio::test]
    async fn poll_failure_fails_open() {
        let store = Arc::new(ScriptedStore::new());
        let watcher = MaintenanceWatcher::new(store.clone());

        store.set_fail(true);
        watcher.refresh().await;
        assert_eq!(watcher.current().label(), "clear");
    }

    #[tokio::test]
    async fn stale_poll_result_is_discarded() {
        let store = Arc::new(ScriptedStore::new());
        let watcher = MaintenanceWatcher::new(store);

        // Newer token applies first; the older in-flight result must lose
        watcher.apply(2, GateStatus::Clear);
        watcher.apply(1, GateStatus::Active(active_window()));

        assert_eq!(watcher.current().label(), "clear");
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let store = Arc::new(ScriptedStore::new());
        store.set_windows(vec![active_window()]);

        let watcher = Arc::new(MaintenanceWatcher::new(store));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = watcher.clone().spawn(Duration::from_millis(10), shutdown_rx);

        // Let at least the immediate first tick land
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(watcher.current().is_maintenance());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("watcher did not stop after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn dropping_the_shutdown_sender_also_stops_the_loop() {
        let watcher = Arc::new(MaintenanceWatcher::new(Arc::new(ScriptedStore::new())));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = watcher.spawn(Duration::from_millis(10), shutdown_rx);
        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("watcher did not stop after sender drop")
            .unwrap();
    }
}
