#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use atlas_admin_api::database::models::MaintenanceWindow;
use atlas_admin_api::gate;
use atlas_admin_api::store::{MaintenanceStore, NewMaintenanceWindow, StoreError};

/// In-memory maintenance store for gate and watcher tests. Window set and
/// failure mode can be swapped while a test is running.
pub struct TestStore {
    windows: Mutex<Vec<MaintenanceWindow>>,
    fail: Mutex<bool>,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
            fail: Mutex::new(false),
        }
    }

    pub fn with_windows(windows: Vec<MaintenanceWindow>) -> Self {
        Self {
            windows: Mutex::new(windows),
            fail: Mutex::new(false),
        }
    }

    pub fn failing() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
            fail: Mutex::new(true),
        }
    }

    pub fn set_windows(&self, windows: Vec<MaintenanceWindow>) {
        *self.windows.lock().unwrap() = windows;
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check_fail(&self) -> Result<(), StoreError> {
        if *self.fail.lock().unwrap() {
            return Err(StoreError::Backend("simulated backend outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MaintenanceStore for TestStore {
    async fn effective_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
        self.check_fail()?;
        Ok(self
            .windows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| gate::is_effective(w, now))
            .cloned()
            .collect())
    }

    async fn upcoming_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError> {
        self.check_fail()?;
        let mut upcoming: Vec<MaintenanceWindow> = self
            .windows
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.is_active && w.start_time > now)
            .cloned()
            .collect();
        upcoming.sort_by_key(|w| w.start_time);
        Ok(upcoming)
    }

    async fn history(&self, limit: i64) -> Result<Vec<MaintenanceWindow>, StoreError> {
        self.check_fail()?;
        let mut all = self.windows.lock().unwrap().clone();
        all.sort_by_key(|w| std::cmp::Reverse(w.start_time));
        all.truncate(limit as usize);
        Ok(all)
    }

    async fn create(&self, window: NewMaintenanceWindow) -> Result<MaintenanceWindow, StoreError> {
        self.check_fail()?;
        let created = MaintenanceWindow {
            id: Uuid::new_v4(),
            start_time: window.start_time,
            end_time: window.end_time,
            message_tr: window.message_tr,
            message_en: window.message_en,
            affected_services: window.affected_services,
            is_active: true,
            scheduled_by: window.scheduled_by,
            created_at: Utc::now(),
        };
        self.windows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn cancel(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_fail()?;
        // Idempotent: nothing to do when the id is unknown or already canceled
        for window in self.windows.lock().unwrap().iter_mut() {
            if window.id == id {
                window.is_active = false;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.check_fail()?;
        let mut windows = self.windows.lock().unwrap();
        let before = windows.len();
        windows.retain(|w| w.id != id);
        if windows.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

/// Window fixture relative to `now`, offsets in hours
pub fn window_at(now: DateTime<Utc>, start_offset_h: i64, end_offset_h: i64, is_active: bool) -> MaintenanceWindow {
    MaintenanceWindow {
        id: Uuid::new_v4(),
        start_time: now + Duration::hours(start_offset_h),
        end_time: now + Duration::hours(end_offset_h),
        message_tr: "Planlı bakım çalışması".to_string(),
        message_en: "Planned maintenance".to_string(),
        affected_services: None,
        is_active,
        scheduled_by: Uuid::new_v4(),
        created_at: now - Duration::days(1),
    }
}
