use super::InstanceManager;
use crate::{
    cluster::{Exposure, NamespaceCreate},
    error::{Error, Result},
    instance::{InstanceRecord, InstanceState, RecordGuard},
    resources::{self, TeamIdentity},
    utils,
};
use tracing::{debug, error, info, instrument};

#[instrument(skip(manager, team), fields(team_id = %team.id))]
pub(super) async fn create(manager: &InstanceManager, team: &TeamIdentity) -> Result<String> {
    let name = utils::resource_name(&manager.config.challenge_name, &team.id);
    let record = manager
        .registry
        .get_or_create(&team.id, || InstanceRecord::new(&team.id, &name));

    // held until the instance is running or the attempt has failed
    let mut guard = record.lock().await;

    match guard.state() {
        InstanceState::Running => {
            debug!("Instance {} already running", record.resource_name());
            return Ok(guard.endpoint().unwrap_or_default());
        }
        InstanceState::Destroying => {
            info!("Instance {} is being torn down, refusing to create", record.resource_name());
            return Err(Error::TeardownInProgress {
                team_id: team.id.clone(),
            });
        }
        InstanceState::Destroyed => {}
    }

    match provision(manager, team, &mut guard).await {
        Ok(endpoint) => {
            manager.metrics.record_create();
            info!("Instance {} running at {}", record.resource_name(), endpoint);
            Ok(endpoint)
        }
        Err(e) => {
            // state stays Destroyed; a namespace created before the failure
            // is removed by the next destroy
            manager.metrics.record_create_failure();
            error!("Failed to create instance {}: {}", record.resource_name(), e);
            Err(e)
        }
    }
}

async fn provision(
    manager: &InstanceManager,
    team: &TeamIdentity,
    guard: &mut RecordGuard<'_>,
) -> Result<String> {
    let descriptors = resources::build_descriptors(team, &manager.config)?;
    let name = descriptors
        .namespace
        .metadata
        .name
        .clone()
        .unwrap_or_default();

    // 1. Namespace
    let created = manager
        .call(
            "create namespace",
            manager.cluster.create_namespace(&descriptors.namespace),
        )
        .await?;
    if created == NamespaceCreate::AlreadyExists {
        info!("Reusing existing namespace {}", name);
    }

    // 2. Deployment and service inside it
    let exposure = manager
        .call(
            "create workload",
            manager.cluster.create_workload(&name, &descriptors.workload),
        )
        .await?;

    let endpoint = endpoint(manager, exposure);
    guard.mark_running(endpoint.clone());
    Ok(endpoint)
}

fn endpoint(manager: &InstanceManager, exposure: Exposure) -> String {
    let port = exposure.node_port.unwrap_or(manager.config.challenge_port);
    format!("{}:{}", manager.config.public_host, port)
}
