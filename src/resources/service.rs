use crate::{
    config::ManagerConfig,
    resources::{deployment::PORT_NAME, labels, TeamIdentity},
};
use k8s_openapi::{
    api::core::v1::{Service, ServicePort, ServiceSpec},
    apimachinery::pkg::util::intstr::IntOrString,
};

/// NodePort service exposing the challenge port outside the cluster
pub fn build_service(team: &TeamIdentity, config: &ManagerConfig, name: &str) -> Service {
    let port = i32::from(config.challenge_port);

    Service {
        metadata: kube::api::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(name.to_string()),
            labels: Some(labels::instance_labels(team, &config.challenge_name, name)),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("NodePort".to_string()),
            selector: Some(labels::selector_labels(team, name)),
            ports: Some(vec![ServicePort {
                name: Some(PORT_NAME.to_string()),
                port,
                target_port: Some(IntOrString::Int(port)),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Node port the cluster allocated, if any
pub fn node_port(service: &Service) -> Option<u16> {
    service
        .spec
        .as_ref()?
        .ports
        .as_ref()?
        .iter()
        .find_map(|p| p.node_port)
        .and_then(|p| u16::try_from(p).ok())
}
