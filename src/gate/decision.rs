use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::MaintenanceWindow;
use crate::types::{ServiceStatus, UserRole};

/// Outcome of a global (route-level) gate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Block { redirect_to: String },
    RedirectHome,
}

/// Outcome of a per-service-instance gate evaluation.
/// `Unavailable` is the operator kill-switch, stronger than maintenance;
/// it is never downgraded, not even for super admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum ServiceAccess {
    Allow,
    Maintenance { reason: String },
    Unavailable,
}

/// A window is in effect iff it has not been canceled and its time range
/// contains `now`. Both bounds are inclusive.
pub fn is_effective(window: &MaintenanceWindow, now: DateTime<Utc>) -> bool {
    window.is_active && window.start_time <= now && now <= window.end_time
}

/// Resolve the store result to at most one effective window.
///
/// Normal operation has zero or one; overlapping windows are anomalous
/// input, resolved deterministically by earliest `start_time` (id as the
/// final tie-break) and logged.
pub fn select_effective(windows: Vec<MaintenanceWindow>, now: DateTime<Utc>) -> Option<MaintenanceWindow> {
    let mut effective: Vec<MaintenanceWindow> =
        windows.into_iter().filter(|w| is_effective(w, now)).collect();

    if effective.len() > 1 {
        let ids: Vec<String> = effective.iter().map(|w| w.id.to_string()).collect();
        tracing::warn!(
            windows = ?ids,
            "multiple maintenance windows effective at once; selecting earliest start"
        );
    }

    effective.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    effective.into_iter().next()
}

/// Route-level gate decision.
///
/// The maintenance page itself is never blocked, so a blocked user cannot
/// be redirected in a loop; once no window is in effect, a caller parked on
/// that page is sent home.
pub fn evaluate_global_access(
    current_path: &str,
    role: UserRole,
    effective: Option<&MaintenanceWindow>,
    page_path: &str,
) -> Decision {
    if current_path == page_path {
        return match effective {
            Some(_) => Decision::Allow,
            None => Decision::RedirectHome,
        };
    }

    match effective {
        None => Decision::Allow,
        Some(window) => {
            if role.is_super_admin() {
                tracing::debug!(
                    window_id = %window.id,
                    path = current_path,
                    "maintenance window in effect; super admin bypass"
                );
                Decision::Allow
            } else {
                Decision::Block {
                    redirect_to: page_path.to_string(),
                }
            }
        }
    }
}

pub const TYPE_MAINTENANCE_FALLBACK: &str = "service type is in maintenance for all users";

/// Dual-scope service gate decision.
///
/// Precedence: type-level `inactive` wins over everything (kill-switch),
/// then maintenance on either scope, then allow. Super admins enter
/// maintained services to fix them, but a killed service type stays killed.
pub fn evaluate_service_access(
    instance_status: ServiceStatus,
    type_status: ServiceStatus,
    instance_reason: Option<&str>,
    type_message: Option<&str>,
    role: UserRole,
) -> ServiceAccess {
    if type_status == ServiceStatus::Inactive {
        return ServiceAccess::Unavailable;
    }

    if type_status == ServiceStatus::Maintenance || instance_status == ServiceStatus::Maintenance {
        if role.is_super_admin() {
            return ServiceAccess::Allow;
        }

        let reason = instance_reason
            .or(type_message)
            .unwrap_or(TYPE_MAINTENANCE_FALLBACK)
            .to_string();

        return ServiceAccess::Maintenance { reason };
    }

    ServiceAccess::Allow
}
