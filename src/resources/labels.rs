use crate::{resources::TeamIdentity, utils};
use std::collections::BTreeMap;

pub const APP_LABEL: &str = "app";
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const CHALLENGE_LABEL: &str = "chaldeploy.captaingee.ch/chal";
pub const TEAM_ID_LABEL: &str = "chaldeploy.captaingee.ch/team-id";
/// Marker the reconciliation tooling selects on
pub const RECONCILE_MARKER_LABEL: &str = "chaldeploy.captaingee.ch/managed-by";

pub const TEAM_ID_ANNOTATION: &str = "chaldeploy.captaingee.ch/team-id";
pub const TEAM_NAME_ANNOTATION: &str = "chaldeploy.captaingee.ch/team-name";

pub const MANAGER_NAME: &str = "chaldeploy";

/// Labels carried by every object of an instance
pub fn instance_labels(
    team: &TeamIdentity,
    challenge_name: &str,
    resource_name: &str,
) -> BTreeMap<String, String> {
    let mut labels = selector_labels(team, resource_name);
    labels.insert(MANAGED_BY_LABEL.to_string(), MANAGER_NAME.to_string());
    labels.insert(CHALLENGE_LABEL.to_string(), utils::challenge_hash(challenge_name));
    labels.insert(RECONCILE_MARKER_LABEL.to_string(), "yes".to_string());
    labels
}

/// Generate selector labels for the challenge pod
pub fn selector_labels(team: &TeamIdentity, resource_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(APP_LABEL.to_string(), resource_name.to_string());
    labels.insert(TEAM_ID_LABEL.to_string(), utils::label_value(&team.id));
    labels
}

/// The raw team id and display name, which may not be label-safe
pub fn instance_annotations(team: &TeamIdentity) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    annotations.insert(TEAM_ID_ANNOTATION.to_string(), team.id.clone());
    if let Some(ref name) = team.display_name {
        annotations.insert(TEAM_NAME_ANNOTATION.to_string(), name.clone());
    }
    annotations
}
