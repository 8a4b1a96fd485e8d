//! Identity service boundary

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::journey::Step;
use crate::session::UserInfo;

use super::error::ServiceError;

/// Terminal success of a journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub user_info: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// What the service answers to a start/continue call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceResponse {
    /// Next step requiring input
    Step { step: Step },
    /// Journey complete, session established
    Success(SessionResult),
    /// Journey ended without a session and without a retry step
    Failure { reason: String },
}

/// External identity service
///
/// Performs the actual protocol work. The driver and terminator only see
/// this trait, so tests can swap in a scripted implementation.
pub trait IdentityService: Send + Sync {
    /// Start the journey `flow_id` (no step) or continue it with a filled step
    fn start_or_continue<'a>(
        &'a self,
        flow_id: &'a str,
        submitted: Option<Step>,
    ) -> BoxFuture<'a, Result<ServiceResponse, ServiceError>>;

    /// End the current server-side session
    fn logout(&self) -> BoxFuture<'_, Result<(), ServiceError>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_step_response() {
        let resp: ServiceResponse = serde_json::from_value(json!({
            "type": "step",
            "step": {"type": "name-password", "fields": [{"name": "username"}]}
        }))
        .unwrap();
        match resp {
            ServiceResponse::Step { step } => assert_eq!(step.tag(), "name-password"),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_success_response() {
        let resp: ServiceResponse = serde_json::from_value(json!({
            "type": "success",
            "userInfo": {"sub": "demo"},
            "sessionToken": "tok"
        }))
        .unwrap();
        match resp {
            ServiceResponse::Success(result) => {
                assert_eq!(result.user_info.claim("sub"), Some("demo"));
                assert_eq!(result.session_token.as_deref(), Some("tok"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_success_without_user_record_is_error() {
        for user_info in [json!(null), json!("demo"), json!([])] {
            let result = serde_json::from_value::<ServiceResponse>(json!({
                "type": "success",
                "userInfo": user_info
            }));
            assert!(result.is_err());
        }

        let missing = serde_json::from_value::<ServiceResponse>(json!({"type": "success"}));
        assert!(missing.is_err());
    }

    #[test]
    fn test_deserialize_failure_response() {
        let resp: ServiceResponse =
            serde_json::from_value(json!({"type": "failure", "reason": "Account locked"})).unwrap();
        assert_eq!(
            resp,
            ServiceResponse::Failure {
                reason: "Account locked".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_response_type_is_error() {
        let result = serde_json::from_value::<ServiceResponse>(json!({"type": "redirect"}));
        assert!(result.is_err());
    }
}
