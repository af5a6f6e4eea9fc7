pub mod maintenance_service;
pub mod service_registry;

pub use maintenance_service::{MaintenanceError, MaintenanceService};
pub use service_registry::{RegistryError, ServiceRegistry};
