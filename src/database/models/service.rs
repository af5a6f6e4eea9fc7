use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::ServiceStatus;

/// A service offering shared across all companies (e.g. "WhatsApp Automation")
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceType {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub status: ServiceStatus,
    pub maintenance_message: Option<String>,
}

/// One company's configured instantiation of a service type
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceInstance {
    pub id: Uuid,
    pub company_id: Uuid,
    pub service_type_id: Uuid,
    pub status: ServiceStatus,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceInstance {
    /// Operator-entered reason on the instance, when one was recorded
    pub fn maintenance_reason(&self) -> Option<&str> {
        self.metadata.get("maintenance_reason").and_then(|v| v.as_str())
    }
}
