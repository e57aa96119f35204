use super::InstanceState;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};

/// Last known local state of an instance
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub state: InstanceState,

    /// `host:port`, only set while running
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub resource_name: String,

    /// When the state last changed
    pub since: DateTime<Utc>,
}

/// One team's deployment.
///
/// `lock` serializes state-changing operations for this team only. The status
/// sits behind its own short-lived lock so readers never wait on an in-flight
/// cluster call; it is only written through a [`RecordGuard`].
#[derive(Debug)]
pub struct InstanceRecord {
    team_id: String,
    resource_name: String,
    lock: Mutex<()>,
    status: RwLock<InstanceStatus>,
    teardown_active: AtomicBool,
}

impl InstanceRecord {
    pub fn new(team_id: &str, resource_name: &str) -> Self {
        Self {
            team_id: team_id.to_string(),
            resource_name: resource_name.to_string(),
            lock: Mutex::new(()),
            status: RwLock::new(InstanceStatus {
                state: InstanceState::Destroyed,
                endpoint: None,
                resource_name: resource_name.to_string(),
                since: Utc::now(),
            }),
            teardown_active: AtomicBool::new(false),
        }
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    /// Name of the namespace and of every object inside it
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// Quick read, does not wait for an operation holding the lock
    pub fn state(&self) -> InstanceState {
        self.status.read().state
    }

    pub fn status(&self) -> InstanceStatus {
        self.status.read().clone()
    }

    /// Whether a destroy call is currently working on this record. A record
    /// left `Destroying` by a failed teardown reports false.
    pub fn teardown_in_flight(&self) -> bool {
        self.teardown_active.load(Ordering::Acquire)
    }

    /// Claim the right to tear this instance down. `None` if another destroy
    /// holds it; the claim is released when the ticket drops.
    pub fn try_begin_teardown(&self) -> Option<TeardownTicket<'_>> {
        self.teardown_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TeardownTicket { record: self })
    }

    /// Wait until no other operation is mutating this record
    pub async fn lock(&self) -> RecordGuard<'_> {
        RecordGuard {
            record: self,
            _guard: self.lock.lock().await,
        }
    }
}

/// Held by the one destroy call allowed to run for a record
#[derive(Debug)]
pub struct TeardownTicket<'a> {
    record: &'a InstanceRecord,
}

impl Drop for TeardownTicket<'_> {
    fn drop(&mut self) {
        self.record.teardown_active.store(false, Ordering::Release);
    }
}

/// Exclusive access to a record's state
pub struct RecordGuard<'a> {
    record: &'a InstanceRecord,
    _guard: MutexGuard<'a, ()>,
}

impl RecordGuard<'_> {
    pub fn state(&self) -> InstanceState {
        self.record.state()
    }

    pub fn endpoint(&self) -> Option<String> {
        self.record.status.read().endpoint.clone()
    }

    pub fn mark_running(&mut self, endpoint: String) {
        self.transition(InstanceState::Running, Some(endpoint));
    }

    pub fn mark_destroying(&mut self) {
        self.transition(InstanceState::Destroying, None);
    }

    pub fn mark_destroyed(&mut self) {
        self.transition(InstanceState::Destroyed, None);
    }

    fn transition(&mut self, next: InstanceState, endpoint: Option<String>) {
        let mut status = self.record.status.write();
        debug_assert!(
            status.state.can_transition_to(next),
            "illegal transition {} -> {}",
            status.state,
            next
        );
        if status.state != next {
            status.since = Utc::now();
        }
        status.state = next;
        status.endpoint = endpoint;
    }
}
