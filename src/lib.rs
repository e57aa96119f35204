pub mod cluster;
pub mod config;
pub mod error;
pub mod instance;
pub mod manager;
pub mod resources;
pub mod telemetry;
pub mod utils;

pub use error::{Error, Result};
pub use instance::{InstanceState, InstanceStatus};
pub use manager::InstanceManager;
