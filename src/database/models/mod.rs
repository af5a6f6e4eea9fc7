pub mod company;
pub mod maintenance_window;
pub mod service;

pub use company::Company;
pub use maintenance_window::MaintenanceWindow;
pub use service::{ServiceInstance, ServiceType};
