use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_ec2::config::Region;
use serde_json::Value;
use set_instance_tags::synapse::{Directory, MembershipStatus, UserProfile};
use set_instance_tags::AppError;

/// Build a profile fixture from a JSON literal.
#[allow(dead_code)]
pub fn profile(value: Value) -> UserProfile {
    match value {
        Value::Object(map) => map,
        _ => panic!("profile fixtures must be JSON objects"),
    }
}

/// Directory double that replays a fixed profile and membership table while
/// recording every call it receives.
pub struct ScriptedDirectory {
    profile: UserProfile,
    memberships: HashMap<String, bool>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedDirectory {
    pub fn new(profile_fixture: Value, memberships: &[(&str, bool)]) -> Self {
        Self {
            profile: profile(profile_fixture),
            memberships: memberships
                .iter()
                .map(|(team, member)| (team.to_string(), *member))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl Directory for ScriptedDirectory {
    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        self.record(format!("userProfile/{user_id}"));
        Ok(self.profile.clone())
    }

    async fn membership_status(
        &self,
        user_id: &str,
        team_id: &str,
    ) -> Result<MembershipStatus, AppError> {
        self.record(format!("membership/{team_id}/{user_id}"));
        Ok(MembershipStatus {
            is_member: self.memberships.get(team_id).copied().unwrap_or(false),
        })
    }
}

/// EC2 client wired to an unroutable endpoint; any request against it fails
/// fast, so tests exercising the no-outbound-call paths stay offline.
#[allow(dead_code)]
pub fn offline_ec2_client() -> aws_sdk_ec2::Client {
    let config = aws_sdk_ec2::Config::builder()
        .endpoint_url("http://127.0.0.1:1")
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
        .behavior_version_latest()
        .build();
    aws_sdk_ec2::Client::from_conf(config)
}

#[allow(dead_code)]
pub fn offline_ssm_client() -> aws_sdk_ssm::Client {
    let config = aws_sdk_ssm::Config::builder()
        .endpoint_url("http://127.0.0.1:1")
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("akid", "secret", None, None, "test"))
        .behavior_version_latest()
        .build();
    aws_sdk_ssm::Client::from_conf(config)
}
