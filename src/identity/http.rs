//! HTTP identity service client
//!
//! Talks to an identity gateway over a small JSON contract:
//! - `POST {base}/authenticate` with `{"flowId", "step"?}` answers a tagged
//!   [`ServiceResponse`]; `401` means the submission was rejected
//! - `POST {base}/logout` ends the session held by the bearer token

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::http_client::{ProxyConfig, build_client};
use crate::journey::Step;
use crate::model::config::Config;

use super::error::ServiceError;
use super::service::{IdentityService, ServiceResponse};

/// Authenticate request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    flow_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<Step>,
}

/// Error body returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    #[serde(alias = "message")]
    reason: Option<String>,
}

/// Identity service over HTTP
pub struct HttpIdentityService {
    base_url: String,
    client: reqwest::Client,
    /// Token from the last successful journey, sent on logout
    session_token: Mutex<Option<String>>,
}

impl HttpIdentityService {
    pub fn new(config: &Config, proxy: Option<&ProxyConfig>) -> anyhow::Result<Self> {
        let client = build_client(proxy, config.request_timeout_secs, config.tls_backend)?;
        Ok(Self::with_client(&config.identity_url, client))
    }

    /// Use an already configured client
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            session_token: Mutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub fn has_session_token(&self) -> bool {
        self.session_token.lock().is_some()
    }

    async fn authenticate(
        &self,
        flow_id: &str,
        step: Option<Step>,
    ) -> Result<ServiceResponse, ServiceError> {
        let url = self.endpoint("authenticate");
        tracing::debug!("Identity service request: {} (flow {})", url, flow_id);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&AuthenticateRequest { flow_id, step })
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Rejected(error_reason(&body, "Authentication failed")));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = match status.as_u16() {
                404 => "Unknown journey",
                429 => "Too many requests, rate limited",
                500..=599 => "Identity service temporarily unavailable",
                _ => "Unexpected response",
            };
            return Err(ServiceError::Transport(format!("{}: {} {}", reason, status, body)));
        }

        let result: ServiceResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Transport(format!("Invalid response body: {}", e)))?;

        if let ServiceResponse::Success(session) = &result {
            *self.session_token.lock() = session.session_token.clone();
        }

        Ok(result)
    }

    async fn end_session(&self) -> Result<(), ServiceError> {
        let url = self.endpoint("logout");
        let token = self.session_token.lock().clone();

        let mut request = self.client.post(&url).header("Accept", "application/json");
        if let Some(token) = &token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = error_reason(&body, "Logout failed");
            return Err(if status.is_client_error() {
                ServiceError::Rejected(reason)
            } else {
                ServiceError::Transport(format!("{} (status {})", reason, status))
            });
        }

        self.session_token.lock().take();
        Ok(())
    }
}

/// Pull a human readable reason out of an error body
fn error_reason(body: &str, default: &str) -> String {
    serde_json::from_str::<GatewayErrorResponse>(body)
        .ok()
        .and_then(|e| e.reason)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                default.to_string()
            } else {
                body.trim().to_string()
            }
        })
}

impl IdentityService for HttpIdentityService {
    fn start_or_continue<'a>(
        &'a self,
        flow_id: &'a str,
        submitted: Option<Step>,
    ) -> BoxFuture<'a, Result<ServiceResponse, ServiceError>> {
        self.authenticate(flow_id, submitted).boxed()
    }

    fn logout(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        self.end_session().boxed()
    }
}
