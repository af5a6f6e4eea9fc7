use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A scheduled maintenance window.
///
/// `is_active` only records that the window has not been canceled. Whether a
/// window is *currently in effect* is always computed from the clock at query
/// time (`gate::decision::is_effective`), never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MaintenanceWindow {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub message_tr: String,
    pub message_en: String,
    /// Human-readable service names, None meaning "all services".
    /// Informational only; gating reads the instance/type status fields.
    pub affected_services: Option<Vec<String>>,
    pub is_active: bool,
    pub scheduled_by: Uuid,
    pub created_at: DateTime<Utc>,
}
