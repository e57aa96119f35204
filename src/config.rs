use crate::error::{Error, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// Name of the optional config file (any format the `config` crate understands)
pub const CONFIG_FILE: &str = "chaldeploy";

/// Prefix for environment overrides, e.g. `CHALDEPLOY_CHALLENGE_IMAGE`
pub const ENV_PREFIX: &str = "CHALDEPLOY";

#[derive(Clone, Debug, Deserialize)]
pub struct ManagerConfig {
    /// Challenge identity, hashed into every resource name
    pub challenge_name: String,

    /// Container image deployed for each team
    pub challenge_image: String,

    /// Port the challenge container listens on
    pub challenge_port: u16,

    #[serde(default = "default_cpu_limit")]
    pub cpu_limit: String,

    #[serde(default = "default_memory_limit")]
    pub memory_limit: String,

    #[serde(default = "default_image_pull_policy")]
    pub image_pull_policy: String,

    /// Host presented to teams in connection endpoints
    #[serde(default = "default_public_host")]
    pub public_host: String,

    /// Explicit kubeconfig path, takes priority over every other credential source
    #[serde(default)]
    pub k8s_config_path: Option<PathBuf>,

    #[serde(default = "default_cluster_call_timeout")]
    pub cluster_call_timeout_secs: u64,

    /// Wait for the namespace to disappear before reporting a teardown as done
    #[serde(default = "default_await_teardown")]
    pub await_teardown: bool,

    #[serde(default = "default_teardown_timeout")]
    pub teardown_timeout_secs: u64,

    #[serde(default = "default_teardown_poll_interval")]
    pub teardown_poll_interval_ms: u64,
}

impl ManagerConfig {
    /// Load from `chaldeploy.*` (if present) overlaid with `CHALDEPLOY_*` env vars
    pub fn load() -> Result<Self> {
        let cfg = ::config::Config::builder()
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: ::config::Config) -> Result<Self> {
        let config: ManagerConfig = cfg.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Minimal configuration with defaults for everything optional
    pub fn new(challenge_name: &str, challenge_image: &str, challenge_port: u16) -> Self {
        Self {
            challenge_name: challenge_name.to_string(),
            challenge_image: challenge_image.to_string(),
            challenge_port,
            cpu_limit: default_cpu_limit(),
            memory_limit: default_memory_limit(),
            image_pull_policy: default_image_pull_policy(),
            public_host: default_public_host(),
            k8s_config_path: None,
            cluster_call_timeout_secs: default_cluster_call_timeout(),
            await_teardown: default_await_teardown(),
            teardown_timeout_secs: default_teardown_timeout(),
            teardown_poll_interval_ms: default_teardown_poll_interval(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.challenge_name.trim().is_empty() {
            return Err(Error::ConfigError("challenge_name must not be empty".into()));
        }
        if self.challenge_image.trim().is_empty() {
            return Err(Error::ConfigError("challenge_image must not be empty".into()));
        }
        if self.challenge_port == 0 {
            return Err(Error::ConfigError("challenge_port must be non-zero".into()));
        }
        if self.public_host.trim().is_empty() {
            return Err(Error::ConfigError("public_host must not be empty".into()));
        }
        for (field, value) in [("cpu_limit", &self.cpu_limit), ("memory_limit", &self.memory_limit)] {
            if !is_quantity(value) {
                return Err(Error::ConfigError(format!(
                    "{} is not a valid quantity: {:?}",
                    field, value
                )));
            }
        }
        if self.teardown_poll_interval_ms == 0 {
            return Err(Error::ConfigError(
                "teardown_poll_interval_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn cluster_call_timeout(&self) -> Duration {
        Duration::from_secs(self.cluster_call_timeout_secs)
    }

    pub fn teardown_timeout(&self) -> Duration {
        Duration::from_secs(self.teardown_timeout_secs)
    }

    pub fn teardown_poll_interval(&self) -> Duration {
        Duration::from_millis(self.teardown_poll_interval_ms)
    }

    pub fn cpu_quantity(&self) -> Quantity {
        Quantity(self.cpu_limit.clone())
    }

    pub fn memory_quantity(&self) -> Quantity {
        Quantity(self.memory_limit.clone())
    }
}

/// Accepts the decimal and binary suffixes Kubernetes uses for cpu/memory
fn is_quantity(value: &str) -> bool {
    const SUFFIXES: [&str; 15] = [
        "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "n", "u", "m", "k", "M", "G", "T", "P", "E",
    ];
    let number = SUFFIXES
        .iter()
        .find_map(|s| value.strip_suffix(s))
        .unwrap_or(value);
    !number.is_empty()
        && number
            .parse::<f64>()
            .map(|n| n.is_finite() && n > 0.0)
            .unwrap_or(false)
}

fn default_cpu_limit() -> String {
    "500m".to_string()
}

fn default_memory_limit() -> String {
    "256Mi".to_string()
}

fn default_image_pull_policy() -> String {
    "IfNotPresent".to_string()
}

fn default_public_host() -> String {
    "127.0.0.1".to_string()
}

fn default_cluster_call_timeout() -> u64 {
    30
}

fn default_await_teardown() -> bool {
    true
}

fn default_teardown_timeout() -> u64 {
    120
}

fn default_teardown_poll_interval() -> u64 {
    1000
}
