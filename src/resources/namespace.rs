use crate::resources::{labels, TeamIdentity};
use k8s_openapi::api::core::v1::Namespace;

/// Build the Namespace holding one team's instance.
/// Deleting it tears down everything inside.
pub fn build_namespace(team: &TeamIdentity, challenge_name: &str, name: &str) -> Namespace {
    Namespace {
        metadata: kube::api::ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(labels::instance_labels(team, challenge_name, name)),
            annotations: Some(labels::instance_annotations(team)),
            ..Default::default()
        },
        ..Default::default()
    }
}
