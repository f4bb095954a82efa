//! Lifecycle event handling: the tag synchronization pipeline.
//!
//! Create and update events run one sequential pass: decode the event, read
//! the instance's tags, resolve the provisioning principal, derive Synapse
//! tags, write them back. Delete events are a no-op. Any failure aborts the
//! invocation; partial tag writes are not rolled back.

use std::sync::Arc;

use aws_sdk_ec2::types::Filter;
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    context::{AppContext, TEAM_ROSTER_PARAM_ENV},
    error::{lambda_error, AppError},
    event::{CustomResourceEvent, RequestType},
    synapse::{Directory, UserProfile},
    tags::{self, Tag, DEFAULT_IGNORED_PROFILE_FIELDS},
};

/// Top-level event dispatcher used by the Lambda runtime.
pub async fn handle_event(
    ctx: Arc<AppContext>,
    event: LambdaEvent<Value>,
) -> Result<Value, LambdaError> {
    debug!(payload = %event.payload, "received event");
    let event: CustomResourceEvent = serde_json::from_value(event.payload).map_err(|e| {
        lambda_error(AppError::Configuration(format!(
            "malformed lifecycle event: {e}"
        )))
    })?;

    match event.request_type {
        RequestType::Create | RequestType::Update => create_or_update(ctx.as_ref(), &event)
            .await
            .map_err(lambda_error),
        RequestType::Delete => {
            info!("delete event received, nothing to do");
            Ok(json!({}))
        }
    }
}

async fn create_or_update(
    ctx: &AppContext,
    event: &CustomResourceEvent,
) -> Result<Value, AppError> {
    info!("start tag synchronization");
    let instance_id = event.instance_id()?;
    let instance_tags = instance_tags(ctx, instance_id).await?;
    let principal_id = tags::principal_id(&instance_tags)?;
    debug!(%instance_id, %principal_id, "resolved provisioning principal");

    let profile = ctx.directory().user_profile(&principal_id).await?;
    let roster = team_ids(ctx).await?;
    let synapse_tags = derive_tags(ctx.directory(), &principal_id, &profile, &roster).await?;
    debug!(?synapse_tags, "tags to apply");

    write_tags(ctx, instance_id, &synapse_tags).await?;
    Ok(json!({ "instanceId": instance_id, "tagCount": synapse_tags.len() }))
}

/// Look up the instance's current tags, which must not be empty.
async fn instance_tags(ctx: &AppContext, instance_id: &str) -> Result<Vec<Tag>, AppError> {
    let response = ctx
        .ec2()
        .describe_tags()
        .filters(
            Filter::builder()
                .name("resource-id")
                .values(instance_id)
                .build(),
        )
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    debug!(?response, "EC2 describe tags response");

    let instance_tags: Vec<Tag> = response
        .tags
        .unwrap_or_default()
        .into_iter()
        .filter_map(|tag| match (tag.key, tag.value) {
            (Some(key), value) if !key.is_empty() => {
                Some(Tag::new(key, value.unwrap_or_default()))
            }
            _ => None,
        })
        .collect();

    tags::require_tags(instance_tags, instance_id)
}

/// Fetch the team roster parameter and reduce it to an ordered id list.
async fn team_ids(ctx: &AppContext) -> Result<Vec<String>, AppError> {
    let name = ctx.roster_parameter().ok_or_else(|| {
        AppError::Configuration(format!("{TEAM_ROSTER_PARAM_ENV} is not set"))
    })?;
    let response = ctx
        .ssm()
        .get_parameter()
        .name(name)
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let raw = response
        .parameter
        .and_then(|parameter| parameter.value)
        .ok_or_else(|| AppError::Data(format!("parameter `{name}` has no value")))?;
    debug!(parameter = %name, value = %raw, "team roster parameter");

    let team_ids = tags::parse_team_ids(&raw)?;
    debug!(?team_ids, "synapse team ids");
    Ok(team_ids)
}

/// Derive the full Synapse tag set for a principal's already-fetched
/// profile: profile tags first, then the team tag if the principal belongs
/// to a roster team.
pub async fn derive_tags(
    directory: &dyn Directory,
    principal_id: &str,
    profile: &UserProfile,
    roster: &[String],
) -> Result<Vec<Tag>, AppError> {
    let mut derived = tags::profile_tags(profile, DEFAULT_IGNORED_PROFILE_FIELDS);
    if let Some(team_id) = user_team_id(directory, principal_id, roster).await? {
        derived.push(tags::team_tag(team_id));
    }
    Ok(derived)
}

/// First roster team the principal is a member of, probing in roster order.
/// Membership in no team is a normal outcome, not an error.
pub async fn user_team_id(
    directory: &dyn Directory,
    user_id: &str,
    team_ids: &[String],
) -> Result<Option<String>, AppError> {
    for team_id in team_ids {
        let status = directory.membership_status(user_id, team_id).await?;
        if status.is_member {
            debug!(%team_id, "synapse user team");
            return Ok(Some(team_id.clone()));
        }
    }
    Ok(None)
}

/// Apply the derived tags to the instance. Duplicate keys, if any, are
/// written as-is.
async fn write_tags(ctx: &AppContext, instance_id: &str, tags: &[Tag]) -> Result<(), AppError> {
    let ec2_tags: Vec<aws_sdk_ec2::types::Tag> = tags
        .iter()
        .map(|tag| {
            aws_sdk_ec2::types::Tag::builder()
                .key(&tag.key)
                .value(&tag.value)
                .build()
        })
        .collect();

    let response = ctx
        .ec2()
        .create_tags()
        .resources(instance_id)
        .set_tags(Some(ec2_tags))
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    debug!(?response, "tagging response");
    Ok(())
}
