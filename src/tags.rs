//! Tag derivation rules.
//!
//! Everything in this module is pure: principal resolution over a fetched tag
//! set, profile-field-to-tag mapping, and team roster parsing. The EC2 and
//! Synapse calls that feed these functions live in `handler`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::synapse::UserProfile;

/// Namespace prefix for all directory-derived tags.
pub const SYNAPSE_TAG_PREFIX: &str = "synapse";

/// Tag applied by Service Catalog carrying the provisioning principal ARN.
pub const PRINCIPAL_ARN_TAG_KEY: &str = "aws:servicecatalog:provisioningPrincipalArn";

/// Profile fields that never become tags. Note: ignoring `userName` also
/// suppresses the derived email tags.
pub const DEFAULT_IGNORED_PROFILE_FIELDS: &[&str] = &["createdOn"];

/// A key/value label attached to a cloud resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Enforce the invariant that a provisioned instance carries tags. An empty
/// tag set means the principal ARN tag cannot exist either, so it is bad
/// data rather than an empty answer.
pub fn require_tags(tags: Vec<Tag>, instance_id: &str) -> Result<Vec<Tag>, AppError> {
    if tags.is_empty() {
        return Err(AppError::Data(format!(
            "no tags returned for instance {instance_id}"
        )));
    }
    Ok(tags)
}

/// Find the provisioning principal's directory id among the instance tags.
///
/// The principal ARN tag value looks like
/// `arn:aws:sts::111111111:assumed-role/ServiceCatalogEndusers/1234567`; the
/// trailing path segment is the Synapse user id. The first occurrence of the
/// tag wins; tag sets are not guaranteed de-duplicated.
pub fn principal_id(tags: &[Tag]) -> Result<String, AppError> {
    tags.iter()
        .find(|tag| tag.key == PRINCIPAL_ARN_TAG_KEY)
        .and_then(|tag| tag.value.split('/').next_back())
        .map(str::to_owned)
        .ok_or_else(|| {
            AppError::Data("Could not derive a provisioningPrincipalArn from tags".into())
        })
}

/// Derive tags from Synapse user profile fields.
///
/// Fields are visited in profile order; names in `ignore` are skipped. A
/// `userName` field additionally emits `synapse:email` and the legacy
/// `OwnerEmail` tag ahead of its generic tag. Because the email tags hang off
/// the `userName` field, ignoring `userName` suppresses them as well.
pub fn profile_tags(profile: &UserProfile, ignore: &[&str]) -> Vec<Tag> {
    let mut tags = Vec::new();
    for (field, value) in profile {
        if ignore.contains(&field.as_str()) {
            continue;
        }

        let value = coerce(value);
        if field == "userName" {
            let email = format!("{value}@synapse.org");
            tags.push(Tag::new(format!("{SYNAPSE_TAG_PREFIX}:email"), &email));
            // legacy unprefixed key, kept for older consumers
            tags.push(Tag::new("OwnerEmail", email));
        }

        tags.push(Tag::new(format!("{SYNAPSE_TAG_PREFIX}:{field}"), value));
    }
    tags
}

/// The one optional team tag appended after the profile tags.
pub fn team_tag(team_id: impl Into<String>) -> Tag {
    Tag::new(format!("{SYNAPSE_TAG_PREFIX}:teamId"), team_id.into())
}

#[derive(Debug, Deserialize)]
struct RosterEntry {
    #[serde(rename = "teamId")]
    team_id: String,
}

/// Parse the team roster parameter value into an ordered list of team ids.
///
/// The parameter holds a JSON array of `{"teamId": .., "roleArn": ..}`
/// objects; only `teamId` is consumed here.
pub fn parse_team_ids(raw: &str) -> Result<Vec<String>, AppError> {
    let roster: Vec<RosterEntry> = serde_json::from_str(raw)
        .map_err(|e| AppError::Data(format!("malformed team roster parameter: {e}")))?;
    Ok(roster.into_iter().map(|entry| entry.team_id).collect())
}

/// Render a profile field value as a tag value. Strings come through
/// unquoted; anything else keeps its JSON rendering.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
