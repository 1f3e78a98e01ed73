pub mod client;
pub mod error;
pub mod model;

pub use client::MaintenanceApi;
pub use error::MaintenanceError;
pub use model::*;
