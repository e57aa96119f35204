use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a team's instance. Cycles Destroyed → Running → Destroying → Destroyed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstanceState {
    /// Nothing exists in the cluster; the only state creation may start from
    #[default]
    Destroyed,

    /// Resources exist and the endpoint is valid
    Running,

    /// Teardown started. Resources may still exist but must not be touched
    /// by another create or delete.
    Destroying,
}

impl InstanceState {
    pub fn can_transition_to(self, next: InstanceState) -> bool {
        use InstanceState::*;
        matches!(
            (self, next),
            (Destroyed, Running)
                | (Running, Destroying)
                // teardown of whatever a failed create left behind
                | (Destroyed, Destroying)
                | (Destroying, Destroying)
                | (Destroying, Destroyed)
        )
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Destroyed => "destroyed",
            InstanceState::Running => "running",
            InstanceState::Destroying => "destroying",
        };
        f.write_str(s)
    }
}
