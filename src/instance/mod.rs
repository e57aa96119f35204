//! Per-team instance bookkeeping.

pub mod record;
pub mod registry;
pub mod state;

pub use record::{InstanceRecord, InstanceStatus, RecordGuard, TeardownTicket};
pub use registry::InstanceRegistry;
pub use state::InstanceState;
