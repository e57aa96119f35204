//! The operations the instance manager needs from the cluster control plane.

use crate::{
    error::{Error, Result},
    resources::{service, Workload},
};
use async_trait::async_trait;
use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{Namespace, Service},
};
use kube::{
    api::{Api, DeleteParams, PostParams},
    Client,
};
use tracing::{debug, info};

pub mod credentials;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceCreate {
    Created,
    AlreadyExists,
}

/// Result of a namespace lookup that reached the API server.
/// Failed lookups are errors, never `NotFound`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceLookup {
    Found,
    /// Deletion already accepted, finalizers still running
    Terminating,
    NotFound,
}

/// How the workload is reachable once created
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Exposure {
    pub node_port: Option<u16>,
}

/// Stateless access to the cluster; every call reflects the cluster's truth.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn create_namespace(&self, namespace: &Namespace) -> Result<NamespaceCreate>;

    async fn get_namespace(&self, name: &str) -> Result<NamespaceLookup>;

    /// Delete with foreground propagation. Deleting a missing or terminating
    /// namespace succeeds.
    async fn delete_namespace(&self, name: &str) -> Result<()>;

    async fn create_workload(&self, namespace: &str, workload: &Workload) -> Result<Exposure>;
}

/// [`ClusterClient`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn create_namespace(&self, namespace: &Namespace) -> Result<NamespaceCreate> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let name = namespace.metadata.name.as_deref().unwrap_or_default();

        match api.create(&PostParams::default(), namespace).await {
            Ok(_) => {
                info!("Created namespace {}", name);
                Ok(NamespaceCreate::Created)
            }
            Err(kube::Error::Api(ae)) if ae.code == 409 => {
                info!("Namespace {} already exists", name);
                Ok(NamespaceCreate::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn get_namespace(&self, name: &str) -> Result<NamespaceLookup> {
        let api: Api<Namespace> = Api::all(self.client.clone());

        match api.get(name).await {
            Ok(ns) if ns.metadata.deletion_timestamp.is_some() => {
                Ok(NamespaceLookup::Terminating)
            }
            Ok(_) => Ok(NamespaceLookup::Found),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(NamespaceLookup::NotFound),
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn delete_namespace(&self, name: &str) -> Result<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());

        match api.delete(name, &DeleteParams::foreground()).await {
            Ok(_) => {
                info!("Deleting namespace {}", name);
                Ok(())
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                info!("Namespace {} already deleted", name);
                Ok(())
            }
            Err(kube::Error::Api(ae)) if ae.code == 409 => {
                info!("Namespace {} is already terminating", name);
                Ok(())
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    async fn create_workload(&self, namespace: &str, workload: &Workload) -> Result<Exposure> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let services: Api<Service> = Api::namespaced(self.client.clone(), namespace);

        match deployments
            .create(&PostParams::default(), &workload.deployment)
            .await
        {
            Ok(_) => info!("Created deployment in {}", namespace),
            // left over from an earlier attempt that failed after this step
            Err(kube::Error::Api(ae)) if ae.code == 409 => {
                info!("Deployment in {} already exists", namespace)
            }
            Err(e) => return Err(e.into()),
        }

        let svc = match services.create(&PostParams::default(), &workload.service).await {
            Ok(svc) => {
                info!("Created service in {}", namespace);
                svc
            }
            Err(kube::Error::Api(ae)) if ae.code == 409 => {
                let name = workload.service.metadata.name.as_deref().unwrap_or_default();
                services.get(name).await?
            }
            Err(e) => return Err(e.into()),
        };

        let exposure = Exposure {
            node_port: service::node_port(&svc),
        };
        debug!("Workload in {} exposed as {:?}", namespace, exposure);
        Ok(exposure)
    }
}
