//! Pure builders for the cluster objects making up a team's instance.

use crate::{
    config::ManagerConfig,
    error::{Error, Result},
    utils,
};
use k8s_openapi::api::{apps::v1::Deployment, core::v1::{Namespace, Service}};
use serde::Serialize;

pub mod deployment;
pub mod labels;
pub mod namespace;
pub mod service;

/// Who an instance belongs to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamIdentity {
    pub id: String,
    /// Free-form team name, only ever stored as an annotation
    pub display_name: Option<String>,
}

impl TeamIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

/// Everything created inside the instance namespace
#[derive(Clone, Debug, Serialize)]
pub struct Workload {
    pub deployment: Deployment,
    pub service: Service,
}

#[derive(Clone, Debug, Serialize)]
pub struct InstanceDescriptors {
    pub namespace: Namespace,
    pub workload: Workload,
}

/// Build the namespace and workload descriptors for a team.
/// Identical inputs always produce identical descriptors.
pub fn build_descriptors(team: &TeamIdentity, config: &ManagerConfig) -> Result<InstanceDescriptors> {
    let name = utils::resource_name(&config.challenge_name, &team.id);
    if !utils::is_dns1123_label(&name) {
        return Err(Error::DescriptorError {
            resource_type: "Namespace".to_string(),
            reason: format!("{:?} is not a valid namespace name", name),
        });
    }

    Ok(InstanceDescriptors {
        namespace: namespace::build_namespace(team, &config.challenge_name, &name),
        workload: Workload {
            deployment: deployment::build_deployment(team, config, &name),
            service: service::build_service(team, config, &name),
        },
    })
}
