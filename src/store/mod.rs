pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::MaintenanceWindow;

pub use postgres::PgMaintenanceStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Maintenance window not found: {0}")]
    NotFound(Uuid),

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Input for scheduling a window. Validation (end after start, non-empty
/// messages) happens in MaintenanceService before this reaches a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMaintenanceWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub message_tr: String,
    pub message_en: String,
    pub affected_services: Option<Vec<String>>,
    pub scheduled_by: Uuid,
}

/// Persistence contract for maintenance windows.
///
/// The gate, the watcher, and the admin handlers all consume this trait, so
/// tests can substitute an in-memory implementation without touching the
/// decision logic.
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// Windows whose time range contains `now` and which have not been
    /// canceled. Normally zero or one; the gate deterministically resolves
    /// overlaps (`gate::decision::select_effective`).
    async fn effective_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError>;

    /// Windows with `start_time > now AND is_active`, ascending by start
    async fn upcoming_windows(&self, now: DateTime<Utc>) -> Result<Vec<MaintenanceWindow>, StoreError>;

    /// Most recent windows regardless of active state, newest first
    async fn history(&self, limit: i64) -> Result<Vec<MaintenanceWindow>, StoreError>;

    async fn create(&self, window: NewMaintenanceWindow) -> Result<MaintenanceWindow, StoreError>;

    /// Sets `is_active = false`. Idempotent: canceling twice is not an error.
    async fn cancel(&self, id: Uuid) -> Result<(), StoreError>;

    /// Hard delete. Terminal; `NotFound` when the row does not exist.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
