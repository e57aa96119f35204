use super::InstanceManager;
use crate::{
    cluster::NamespaceLookup,
    error::{Error, Result},
    instance::{InstanceRecord, InstanceState},
};
use tracing::{debug, error, info, instrument};

#[instrument(skip(manager))]
pub(super) async fn destroy(manager: &InstanceManager, team_id: &str) -> Result<()> {
    let record = manager
        .registry
        .get(team_id)
        .ok_or_else(|| Error::UnknownTeam {
            team_id: team_id.to_string(),
        })?;

    // don't queue up behind a teardown that is already running
    if record.state() == InstanceState::Destroying && record.teardown_in_flight() {
        debug!("Instance {} is already being destroyed", record.resource_name());
        return Ok(());
    }

    let (ticket, prior) = {
        let mut guard = record.lock().await;
        let Some(ticket) = record.try_begin_teardown() else {
            debug!("Instance {} is already being destroyed", record.resource_name());
            return Ok(());
        };
        let prior = guard.state();
        if prior == InstanceState::Running {
            manager.metrics.record_stopped();
        }
        guard.mark_destroying();
        (ticket, prior)
    };

    // the lock is released here so status readers see Destroying while the
    // cluster is queried
    let result = cleanup(manager, &record).await;
    drop(ticket);

    match result {
        Ok(deleted) => {
            // a pass over an instance that was already gone is not a teardown
            if deleted || prior != InstanceState::Destroyed {
                manager.metrics.record_destroy();
            }
            info!("Instance {} destroyed", record.resource_name());
            Ok(())
        }
        Err(e) => {
            // stays Destroying; the next destroy call retries
            manager.metrics.record_destroy_failure();
            error!("Failed to destroy instance {}: {}", record.resource_name(), e);
            Err(e)
        }
    }
}

/// Returns whether this pass issued the namespace delete
async fn cleanup(manager: &InstanceManager, record: &InstanceRecord) -> Result<bool> {
    let name = record.resource_name();

    let lookup = manager
        .call("get namespace", manager.cluster.get_namespace(name))
        .await?;
    let delete = match lookup {
        NamespaceLookup::NotFound => {
            info!("Namespace {} already deleted", name);
            record.lock().await.mark_destroyed();
            return Ok(false);
        }
        // an earlier delete was accepted; deleting again would conflict
        NamespaceLookup::Terminating => {
            info!("Namespace {} is already terminating", name);
            false
        }
        NamespaceLookup::Found => true,
    };

    let mut guard = record.lock().await;

    // Delete namespace (cascades to the deployment and service)
    if delete {
        manager
            .call("delete namespace", manager.cluster.delete_namespace(name))
            .await?;
    }

    if manager.config.await_teardown {
        manager
            .with_deadline(
                "wait for namespace removal",
                manager.config.teardown_timeout(),
                wait_for_removal(manager, name),
            )
            .await?;
    }

    guard.mark_destroyed();
    Ok(delete)
}

/// Poll until the namespace is gone, so a create reusing the name never
/// races the old namespace's termination
async fn wait_for_removal(manager: &InstanceManager, name: &str) -> Result<()> {
    loop {
        let lookup = manager
            .call("get namespace", manager.cluster.get_namespace(name))
            .await?;
        if lookup == NamespaceLookup::NotFound {
            return Ok(());
        }
        debug!("Namespace {} still terminating", name);
        tokio::time::sleep(manager.config.teardown_poll_interval()).await;
    }
}
