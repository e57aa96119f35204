//! Resolve which credentials to talk to the cluster with.
//!
//! Load order:
//!   - the configured kubeconfig path
//!   - an injected service account
//!   - `$KUBECONFIG`, then `~/.kube/config`

use crate::{
    config::ManagerConfig,
    error::{Error, Result},
};
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Client, Config,
};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// Kubeconfig named in configuration
    Explicit(PathBuf),
    InCluster,
    /// Kubeconfig found in the usual local places, current context
    LocalProfile(PathBuf),
}

/// Pick the first credential source that is available
pub fn select_source(
    explicit: Option<&Path>,
    service_account_dir: &Path,
    local_candidates: &[PathBuf],
) -> Result<CredentialSource> {
    if let Some(path) = explicit {
        // a configured path that is missing is an error, not a fallthrough
        if path.is_file() {
            return Ok(CredentialSource::Explicit(path.to_path_buf()));
        }
        return Err(Error::CredentialsError(format!(
            "configured kubeconfig {} does not exist",
            path.display()
        )));
    }

    if service_account_dir.is_dir() {
        return Ok(CredentialSource::InCluster);
    }

    local_candidates
        .iter()
        .find(|p| p.is_file())
        .map(|p| CredentialSource::LocalProfile(p.clone()))
        .ok_or_else(|| Error::CredentialsError("couldn't find a kubeconfig to load".into()))
}

/// `$KUBECONFIG` (first entry) and `$HOME/.kube/config`
pub fn default_local_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(kubeconfig) = std::env::var_os("KUBECONFIG") {
        if let Some(first) = std::env::split_paths(&kubeconfig).next() {
            candidates.push(first);
        }
    }
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(".kube").join("config"));
    }
    candidates
}

pub async fn load_config(source: &CredentialSource) -> Result<Config> {
    match source {
        CredentialSource::Explicit(path) | CredentialSource::LocalProfile(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::CredentialsError(format!("failed to read {}: {}", path.display(), e))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::CredentialsError(format!("failed to load {}: {}", path.display(), e))
                })
        }
        CredentialSource::InCluster => Config::incluster()
            .map_err(|e| Error::CredentialsError(format!("failed to load in-cluster config: {}", e))),
    }
}

/// Resolve credentials and build a client whose reads are bounded by the
/// configured cluster call timeout
pub async fn connect(config: &ManagerConfig) -> Result<Client> {
    let source = select_source(
        config.k8s_config_path.as_deref(),
        Path::new(SERVICE_ACCOUNT_DIR),
        &default_local_candidates(),
    )?;
    info!("Using cluster credentials from {:?}", source);

    let mut kube_config = load_config(&source).await?;
    kube_config.connect_timeout = Some(CONNECT_TIMEOUT);
    kube_config.read_timeout = Some(config.cluster_call_timeout());
    Ok(Client::try_from(kube_config)?)
}
