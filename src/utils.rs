//! Utility functions for chaldeploy

use sha2::{Digest, Sha256};

const NAME_PREFIX: &str = "chaldeploy";
const CHALLENGE_HASH_LEN: usize = 8;
const TEAM_HASH_LEN: usize = 12;
const SLUG_MAX_LEN: usize = 20;
const MAX_LABEL_LEN: usize = 63;

/// Hex-encoded SHA-256 of a string
pub fn hash_string(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Short challenge hash used in names and the `chal` label
pub fn challenge_hash(challenge_name: &str) -> String {
    hash_string(challenge_name)[..CHALLENGE_HASH_LEN].to_string()
}

/// Lower-cased team id with everything outside `[a-z0-9]` dropped
pub fn team_slug(team_id: &str) -> String {
    team_id
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .take(SLUG_MAX_LEN)
        .collect()
}

/// Generate the resource name (and namespace name) for a team's instance.
///
/// The slug keeps names readable; the team hash keeps ids that only differ in
/// formatting (`T-100` vs `T100`) apart.
pub fn resource_name(challenge_name: &str, team_id: &str) -> String {
    let team_hash = &hash_string(team_id)[..TEAM_HASH_LEN];
    let slug = team_slug(team_id);
    if slug.is_empty() {
        format!("{}-{}-{}", NAME_PREFIX, challenge_hash(challenge_name), team_hash)
    } else {
        format!(
            "{}-{}-{}-{}",
            NAME_PREFIX,
            challenge_hash(challenge_name),
            slug,
            team_hash
        )
    }
}

/// Coerce an arbitrary string into a valid label value
pub fn label_value(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .take(MAX_LABEL_LEN)
        .collect();
    cleaned
        .trim_matches(|c: char| !c.is_ascii_alphanumeric())
        .to_string()
}

/// DNS-1123 label check, the rule namespace names must satisfy
pub fn is_dns1123_label(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_LABEL_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}
