//! Synapse directory service client.
//!
//! Thin REST client over the two Synapse endpoints this function needs: user
//! profile lookup and team membership status. The `Directory` trait is the
//! seam the handler works against, so tests can script directory responses
//! without a network.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://repo-prod.prod.sagebase.org/repo/v1";
pub const BASE_URL_ENV: &str = "SYNAPSE_BASE_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile fields for one Synapse user. Field names are opaque to this
/// function apart from `userName`, which drives email tag derivation.
pub type UserProfile = Map<String, Value>;

/// Answer to a (user, team) membership query.
#[derive(Debug, Deserialize)]
pub struct MembershipStatus {
    #[serde(rename = "isMember")]
    pub is_member: bool,
}

/// Directory operations the tag pipeline depends on.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, AppError>;

    async fn membership_status(
        &self,
        user_id: &str,
        team_id: &str,
    ) -> Result<MembershipStatus, AppError>;
}

/// Reqwest-backed client for the Synapse REST API.
pub struct SynapseClient {
    http: Client,
    base_url: String,
}

impl SynapseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Base URL from `SYNAPSE_BASE_URL`, falling back to the production stack.
    pub fn base_url_from_env() -> String {
        env::var(BASE_URL_ENV)
            .ok()
            .map(|raw| raw.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("synapse request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "synapse returned {status} for {path}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid synapse response for {path}: {e}")))
    }
}

#[async_trait]
impl Directory for SynapseClient {
    async fn user_profile(&self, user_id: &str) -> Result<UserProfile, AppError> {
        let profile: UserProfile = self.get_json(&format!("userProfile/{user_id}")).await?;
        debug!(%user_id, ?profile, "synapse user profile");
        Ok(profile)
    }

    async fn membership_status(
        &self,
        user_id: &str,
        team_id: &str,
    ) -> Result<MembershipStatus, AppError> {
        let status: MembershipStatus = self
            .get_json(&format!("team/{team_id}/member/{user_id}/membershipStatus"))
            .await?;
        debug!(%user_id, %team_id, is_member = status.is_member, "synapse membership status");
        Ok(status)
    }
}
