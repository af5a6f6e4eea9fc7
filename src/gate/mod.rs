//! Maintenance-window gate.
//!
//! Whether the platform (or one service instance) is under maintenance is
//! decided here and only here: the route-guard middleware, the maintenance
//! landing endpoint, the per-service access check, and the background
//! watcher all resolve through the same functions in `decision`.

pub mod check;
pub mod countdown;
pub mod decision;
pub mod watcher;

pub use check::check_global_access;
pub use countdown::TimeRemaining;
pub use decision::{evaluate_global_access, evaluate_service_access, is_effective, select_effective, Decision, ServiceAccess};
pub use watcher::{GateStatus, MaintenanceWatcher};
