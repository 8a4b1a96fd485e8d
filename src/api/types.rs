//! Session API request/response types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::journey::FlowStatus;
use crate::logout::{LogoutStatus, NavigationRecord, RedirectIntent};
use crate::session::UserInfo;

// ============ Session ============

/// Session state response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    pub logout: LogoutStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_redirect: Option<RedirectIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_navigation: Option<NavigationRecord>,
}

// ============ Renderers ============

/// Renderer resolution response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererResponse {
    pub tag: String,
    pub renderer: String,
    pub fallback: bool,
}

// ============ Journey ============

/// Start journey request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJourneyRequest {
    /// Journey name, config default when omitted
    #[serde(default)]
    pub journey: Option<String>,
}

/// Submit current step request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStepRequest {
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Journey progress response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResponse {
    #[serde(flatten)]
    pub status: FlowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

// ============ Logout ============

/// Logout response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
    pub redirect: RedirectIntent,
}

/// Cancel redirect response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelRedirectResponse {
    pub cancelled: bool,
}

// ============ Errors ============

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                error_type: error_type.into(),
                message: message.into(),
            },
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new("invalid_request", message)
    }

    pub fn authentication_error() -> Self {
        Self::new("authentication_error", "Invalid or missing API key")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", message)
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::new("upstream_error", message)
    }
}
