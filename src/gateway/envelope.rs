//! Uniform response envelope returned for every call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::types::GatewayError;

/// Three-field response shape: `{result, error, errorData}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub result: Option<Value>,
    pub error: bool,
    pub error_data: Option<String>,
}

impl Envelope {
    /// Successful call. `None` means the call produced no result.
    pub fn success(result: Option<Value>) -> Self {
        Self {
            result,
            error: false,
            error_data: None,
        }
    }

    /// Failed call carrying only the error message.
    pub fn failure(error: &GatewayError) -> Self {
        Self {
            result: None,
            error: true,
            error_data: Some(error.to_string()),
        }
    }

    /// Request rejected before reaching the gateway.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: true,
            error_data: Some(message.into()),
        }
    }

    /// Normalize a dispatch outcome. Never fails.
    pub fn from_outcome(outcome: Result<Option<Value>, GatewayError>) -> Self {
        match outcome {
            Ok(value) => Self::success(value),
            Err(e) => Self::failure(&e),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

impl From<Result<Option<Value>, GatewayError>> for Envelope {
    fn from(outcome: Result<Option<Value>, GatewayError>) -> Self {
        Self::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let env = Envelope::from_outcome(Ok(Some(json!("SUCCESS"))));
        assert_eq!(env.result, Some(json!("SUCCESS")));
        assert!(!env.error);
        assert!(env.error_data.is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let env = Envelope::from_outcome(Err(GatewayError::Connection("peer0 unreachable".into())));
        assert!(env.result.is_none());
        assert!(env.error);
        assert_eq!(env.error_data.as_deref(), Some("connection error: peer0 unreachable"));
    }

    #[test]
    fn test_wire_shape() {
        let env = Envelope::success(Some(json!({"make": "Toyota"})));
        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(
            wire,
            json!({"result": {"make": "Toyota"}, "error": false, "errorData": null})
        );

        let env = Envelope::failure(&GatewayError::UnknownFunction("DeleteCar".into()));
        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(
            wire,
            json!({"result": null, "error": true, "errorData": "unknown function: DeleteCar"})
        );
    }
}
