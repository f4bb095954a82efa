//! Application-scoped context shared across invocations.

use std::env;
use std::sync::Arc;

use crate::synapse::Directory;

/// Environment variable naming the SSM parameter that holds the team roster.
pub const TEAM_ROSTER_PARAM_ENV: &str = "TEAM_TO_ROLE_ARN_MAP_PARAM_NAME";

/// Holds shared clients and configuration (EC2, SSM, Synapse directory).
#[derive(Clone)]
pub struct AppContext {
    ec2: aws_sdk_ec2::Client,
    ssm: aws_sdk_ssm::Client,
    directory: Arc<dyn Directory>,
    roster_parameter: Option<String>,
}

impl AppContext {
    /// Construct a new context for the given clients and roster parameter name.
    pub fn new(
        ec2: aws_sdk_ec2::Client,
        ssm: aws_sdk_ssm::Client,
        directory: Arc<dyn Directory>,
        roster_parameter: Option<String>,
    ) -> Self {
        Self {
            ec2,
            ssm,
            directory,
            roster_parameter,
        }
    }

    /// Borrow the underlying EC2 client.
    pub fn ec2(&self) -> &aws_sdk_ec2::Client {
        &self.ec2
    }

    /// Borrow the underlying SSM client.
    pub fn ssm(&self) -> &aws_sdk_ssm::Client {
        &self.ssm
    }

    /// Borrow the Synapse directory client.
    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    /// Name of the SSM parameter holding the team roster, if configured.
    pub fn roster_parameter(&self) -> Option<&str> {
        self.roster_parameter.as_deref()
    }
}

/// Roster parameter name from the environment; empty values count as unset.
pub fn roster_parameter_from_env() -> Option<String> {
    env::var(TEAM_ROSTER_PARAM_ENV)
        .ok()
        .map(|raw| raw.trim().to_owned())
        .filter(|name| !name.is_empty())
}
