//! Custom resource lifecycle event decoding.
//!
//! CloudFormation invokes the function with a JSON payload describing the
//! lifecycle transition of the custom resource. Only the request type and the
//! `InstanceId` resource property matter here; everything else is ignored.

use serde::Deserialize;

use crate::error::AppError;

pub const MISSING_INSTANCE_ID_ERROR_MESSAGE: &str = "InstanceId parameter is required";

/// Lifecycle transition reported by CloudFormation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Caller-supplied properties of the custom resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default)]
    pub instance_id: Option<String>,
}

/// One custom resource invocation payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub resource_properties: Option<ResourceProperties>,
}

impl CustomResourceEvent {
    /// Extract the target instance id, failing closed when it is missing or empty.
    pub fn instance_id(&self) -> Result<&str, AppError> {
        self.resource_properties
            .as_ref()
            .and_then(|props| props.instance_id.as_deref())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Configuration(MISSING_INSTANCE_ID_ERROR_MESSAGE.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> CustomResourceEvent {
        serde_json::from_value(value).expect("event decodes")
    }

    #[test]
    fn create_event_exposes_instance_id() {
        let event = decode(json!({
            "RequestType": "Create",
            "ResourceProperties": {
                "InstanceId": "i-0123456789abcdef0",
                "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:tagger"
            }
        }));
        assert_eq!(event.request_type, RequestType::Create);
        assert_eq!(event.instance_id().unwrap(), "i-0123456789abcdef0");
    }

    #[test]
    fn missing_properties_is_a_configuration_error() {
        let event = decode(json!({ "RequestType": "Update" }));
        let err = event.instance_id().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            format!("configuration error: {MISSING_INSTANCE_ID_ERROR_MESSAGE}")
        );
    }

    #[test]
    fn empty_instance_id_is_a_configuration_error() {
        let event = decode(json!({
            "RequestType": "Create",
            "ResourceProperties": { "InstanceId": "" }
        }));
        assert!(matches!(
            event.instance_id(),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn delete_event_decodes_without_properties() {
        let event = decode(json!({ "RequestType": "Delete" }));
        assert_eq!(event.request_type, RequestType::Delete);
    }

    #[test]
    fn unknown_request_type_fails_to_decode() {
        let result: Result<CustomResourceEvent, _> =
            serde_json::from_value(json!({ "RequestType": "Rollback" }));
        assert!(result.is_err());
    }
}
