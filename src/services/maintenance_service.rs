use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config;
use crate::database::models::MaintenanceWindow;
use crate::store::{MaintenanceStore, NewMaintenanceWindow, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("Invalid maintenance window: {field}: {message}")]
    InvalidWindow { field: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Application service over the maintenance-window store: input validation
/// plus the anomaly-resolving active-window read.
pub struct MaintenanceService {
    store: Arc<dyn MaintenanceStore>,
}

impl MaintenanceService {
    pub fn new(store: Arc<dyn MaintenanceStore>) -> Self {
        Self { store }
    }

    /// Schedule a new window. Rejects `end_time <= start_time` and empty
    /// notice text before anything reaches the store.
    pub async fn schedule(&self, window: NewMaintenanceWindow) -> Result<MaintenanceWindow, MaintenanceError> {
        validate_new_window(&window)?;

        let created = self.store.create(window).await?;
        tracing::info!(
            window_id = %created.id,
            start_time = %created.start_time,
            end_time = %created.end_time,
            scheduled_by = %created.scheduled_by,
            "maintenance window scheduled"
        );

        Ok(created)
    }

    /// The currently effective window, if any. Overlaps are resolved to the
    /// earliest start and logged by the gate's selection function.
    pub async fn active_window(&self) -> Result<Option<MaintenanceWindow>, MaintenanceError> {
        let now = Utc::now();
        let windows = self.store.effective_windows(now).await?;
        Ok(crate::gate::select_effective(windows, now))
    }

    pub async fn upcoming(&self) -> Result<Vec<MaintenanceWindow>, MaintenanceError> {
        Ok(self.store.upcoming_windows(Utc::now()).await?)
    }

    /// Most recent windows, newest first. `limit` falls back to the API
    /// default and is capped by configuration.
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<MaintenanceWindow>, MaintenanceError> {
        let api = &config::config().api;
        let limit = limit
            .unwrap_or(api.history_default_limit)
            .clamp(1, api.history_max_limit);

        Ok(self.store.history(limit).await?)
    }

    /// Cancel a window. Idempotent: canceling an already-canceled window
    /// succeeds without effect.
    pub async fn cancel(&self, id: Uuid) -> Result<(), MaintenanceError> {
        self.store.cancel(id).await?;
        tracing::info!(window_id = %id, "maintenance window canceled");
        Ok(())
    }

    /// Hard delete. Terminal; errors when the window does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), MaintenanceError> {
        self.store.delete(id).await?;
        tracing::info!(window_id = %id, "maintenance window deleted");
        Ok(())
    }
}

fn validate_new_window(window: &NewMaintenanceWindow) -> Result<(), MaintenanceError> {
    if window.end_time <= window.start_time {
        return Err(MaintenanceError::InvalidWindow {
            field: "end_time".to_string(),
            message: "end_time must be after start_time".to_string(),
        });
    }

    if window.message_tr.trim().is_empty() {
        return Err(MaintenanceError::InvalidWindow {
            field: "message_tr".to_string(),
            message: "notice text is required".to_string(),
        });
    }

    if window.message_en.trim().is_empty() {
        return Err(MaintenanceError::InvalidWindow {
            field: "message_en".to_string(),
            message: "notice text is required".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(start_offset_h: i64, end_offset_h: i64) -> NewMaintenanceWindow {
        let now = Utc::now();
        NewMaintenanceWindow {
            start_time: now + Duration::hours(start_offset_h),
            end_time: now + Duration::hours(end_offset_h),
            message_tr: "Planlı bakım".to_string(),
            message_en: "Planned maintenance".to_string(),
            affected_services: Some(vec!["WhatsApp Bot".to_string()]),
            scheduled_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn accepts_well_formed_window() {
        assert!(validate_new_window(&request(1, 2)).is_ok());
    }

    #[test]
    fn rejects_end_before_start() {
        let err = validate_new_window(&request(2, 1)).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidWindow { ref field, .. } if field == "end_time"));
    }

    #[test]
    fn rejects_end_equal_to_start() {
        let err = validate_new_window(&request(1, 1)).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidWindow { .. }));
    }

    #[test]
    fn rejects_blank_notice_text() {
        let mut req = request(1, 2);
        req.message_en = "   ".to_string();
        let err = validate_new_window(&req).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidWindow { ref field, .. } if field == "message_en"));

        let mut req = request(1, 2);
        req.message_tr = String::new();
        let err = validate_new_window(&req).unwrap_err();
        assert!(matches!(err, MaintenanceError::InvalidWindow { ref field, .. } if field == "message_tr"));
    }
}
