use crate::{
    config::ManagerConfig,
    resources::{labels, TeamIdentity},
};
use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{
            Capabilities, Container, ContainerPort, PodSpec, PodTemplateSpec,
            ResourceRequirements, SecurityContext,
        },
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use std::collections::BTreeMap;

pub const CONTAINER_NAME: &str = "challenge";
pub const PORT_NAME: &str = "challenge";

pub fn build_deployment(
    team: &TeamIdentity,
    config: &ManagerConfig,
    name: &str,
) -> Deployment {
    let container = Container {
        name: CONTAINER_NAME.to_string(),
        image: Some(config.challenge_image.clone()),
        image_pull_policy: Some(config.image_pull_policy.clone()),
        ports: Some(vec![ContainerPort {
            name: Some(PORT_NAME.to_string()),
            container_port: i32::from(config.challenge_port),
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        resources: Some(build_resources(config)),
        security_context: Some(build_security_context()),
        ..Default::default()
    };

    let mut pod_annotations = BTreeMap::new();
    pod_annotations.insert(
        "cluster-autoscaler.kubernetes.io/safe-to-evict".to_string(),
        "false".to_string(),
    );

    let pod_template = PodTemplateSpec {
        metadata: Some(kube::api::ObjectMeta {
            labels: Some(labels::instance_labels(team, &config.challenge_name, name)),
            annotations: Some(pod_annotations),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers: vec![container],
            enable_service_links: Some(false),
            automount_service_account_token: Some(false),
            termination_grace_period_seconds: Some(0),
            ..Default::default()
        }),
    };

    Deployment {
        metadata: kube::api::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(name.to_string()),
            labels: Some(labels::instance_labels(team, &config.challenge_name, name)),
            annotations: Some(labels::instance_annotations(team)),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels::selector_labels(team, name)),
                ..Default::default()
            },
            template: pod_template,
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_resources(config: &ManagerConfig) -> ResourceRequirements {
    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), config.cpu_quantity());
    limits.insert("memory".to_string(), config.memory_quantity());

    ResourceRequirements {
        limits: Some(limits),
        ..Default::default()
    }
}

fn build_security_context() -> SecurityContext {
    SecurityContext {
        privileged: Some(false),
        allow_privilege_escalation: Some(false),
        capabilities: Some(Capabilities {
            drop: Some(vec!["NET_RAW".to_string()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}
