//! Lambda entrypoint.
//!
//! The binary initialises logging, reads the roster parameter name from the
//! environment, constructs the AWS and Synapse clients once, and then hands
//! execution to `lambda_runtime`. Each invocation reuses the `AppContext` so
//! the clients are cached across requests.

use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error as LambdaError};
use set_instance_tags::{
    handle_event, roster_parameter_from_env, synapse::SynapseClient, AppContext,
    TEAM_ROSTER_PARAM_ENV,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .json()
        .with_current_span(false)
        .init();

    let roster_parameter = roster_parameter_from_env();
    if roster_parameter.is_none() {
        // Startup proceeds: delete events never need the roster, and
        // create/update fail with a configuration error when they do.
        warn!(
            variable = TEAM_ROSTER_PARAM_ENV,
            "roster parameter name is not configured"
        );
    }

    let base_url = SynapseClient::base_url_from_env();
    info!(
        roster_parameter = roster_parameter.as_deref().unwrap_or("<unset>"),
        synapse_base_url = %base_url,
        "initialising Lambda runtime"
    );

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let ec2 = aws_sdk_ec2::Client::new(&config);
    let ssm = aws_sdk_ssm::Client::new(&config);
    let directory = Arc::new(SynapseClient::new(base_url));

    let ctx = Arc::new(AppContext::new(ec2, ssm, directory, roster_parameter));
    run(service_fn(move |event| {
        let ctx = Arc::clone(&ctx);
        handle_event(ctx, event)
    }))
    .await
}
