/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Role carried in JWT claims; the gate only ever inspects this one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    CompanyAdmin,
    User,
}

impl UserRole {
    pub fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "super_admin"),
            UserRole::CompanyAdmin => write!(f, "company_admin"),
            UserRole::User => write!(f, "user"),
        }
    }
}

/// Operational status of a service type or a per-company service instance.
/// The two scopes are independent rows; precedence between them lives in
/// `gate::decision::evaluate_service_access`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ServiceStatus {
    Active,
    Maintenance,
    Inactive,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Active => write!(f, "active"),
            ServiceStatus::Maintenance => write!(f, "maintenance"),
            ServiceStatus::Inactive => write!(f, "inactive"),
        }
    }
}
