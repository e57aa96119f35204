use crate::{
    cluster::{credentials, ClusterClient, KubeCluster},
    config::ManagerConfig,
    error::{Error, Result},
    instance::{InstanceRegistry, InstanceState, InstanceStatus},
    resources::TeamIdentity,
    telemetry::Metrics,
};
use std::{future::Future, sync::Arc, time::Duration};
use tracing::{info, warn};

mod provision;
mod teardown;

/// Creates, destroys and reports on per-team challenge instances.
///
/// Operations on different teams never wait on each other. Operations on the
/// same team are serialized by that team's record lock, which is never held
/// by the registry itself.
#[derive(Clone)]
pub struct InstanceManager {
    cluster: Arc<dyn ClusterClient>,
    registry: Arc<InstanceRegistry>,
    config: Arc<ManagerConfig>,
    metrics: Arc<Metrics>,
}

impl InstanceManager {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        registry: Arc<InstanceRegistry>,
        config: Arc<ManagerConfig>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            cluster,
            registry,
            config,
            metrics,
        }
    }

    /// Resolve cluster credentials and build a manager with a fresh registry
    pub async fn connect(config: ManagerConfig) -> Result<Self> {
        config.validate()?;
        let client = credentials::connect(&config).await?;
        info!("Connected to Kubernetes cluster");

        Ok(Self::new(
            Arc::new(KubeCluster::new(client)),
            Arc::new(InstanceRegistry::new()),
            Arc::new(config),
            Arc::new(Metrics::default()),
        ))
    }

    /// Provision the team's instance (or return the running one) and hand
    /// back its `host:port` endpoint
    pub async fn create(&self, team_id: &str) -> Result<String> {
        self.create_for(&TeamIdentity::new(team_id)).await
    }

    /// Like [`create`](Self::create), also recording the team's display name
    pub async fn create_for(&self, team: &TeamIdentity) -> Result<String> {
        provision::create(self, team).await
    }

    /// Tear down the team's instance. Fails for teams that never created one.
    pub async fn destroy(&self, team_id: &str) -> Result<()> {
        teardown::destroy(self, team_id).await
    }

    /// Last known state, without asking the cluster. `None` if the team
    /// never created an instance.
    pub fn get_status(&self, team_id: &str) -> Option<InstanceStatus> {
        self.registry.get(team_id).map(|record| record.status())
    }

    pub fn running_count(&self) -> usize {
        self.registry
            .records()
            .iter()
            .filter(|r| r.state() == InstanceState::Running)
            .count()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Run a cluster call under the configured deadline
    async fn call<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.with_deadline(operation, self.config.cluster_call_timeout(), fut)
            .await
    }

    async fn with_deadline<T, F>(&self, operation: &str, deadline: Duration, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} did not finish within {:?}", operation, deadline);
                self.metrics.record_timeout();
                Err(Error::Timeout {
                    operation: operation.to_string(),
                    seconds: deadline.as_secs(),
                })
            }
        }
    }
}
