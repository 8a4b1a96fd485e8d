//! Session API business logic

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex as TokioMutex;

use crate::identity::IdentityService;
use crate::journey::{AuthFlowDriver, FlowProgress, StepRegistry};
use crate::logout::{NavigationLog, SessionTerminator};
use crate::model::config::Config;
use crate::session::SessionStore;

use super::error::ApiError;
use super::types::{
    CancelRedirectResponse, JourneyResponse, LogoutResponse, RendererResponse, SessionResponse,
};

/// Session service
///
/// Owns the single journey of this client. Starting a new journey replaces
/// the current one; a step still waiting for input is dropped with it.
pub struct SessionService {
    default_journey: String,
    service: Arc<dyn IdentityService>,
    registry: Arc<StepRegistry>,
    store: SessionStore,
    terminator: SessionTerminator,
    navigation: Arc<NavigationLog>,
    journey: TokioMutex<Option<AuthFlowDriver>>,
}

impl SessionService {
    pub fn new(
        config: &Config,
        service: Arc<dyn IdentityService>,
        registry: Arc<StepRegistry>,
        store: SessionStore,
    ) -> Self {
        let navigation = Arc::new(NavigationLog::new());
        let terminator = SessionTerminator::new(
            service.clone(),
            store.clone(),
            navigation.clone(),
            config.home_path.clone(),
            config.redirect_delay(),
        );

        Self {
            default_journey: config.default_journey.clone(),
            service,
            registry,
            store,
            terminator,
            navigation,
            journey: TokioMutex::new(None),
        }
    }

    /// Current session state plus logout/redirect bookkeeping
    pub fn session(&self) -> SessionResponse {
        let state = self.store.get();
        SessionResponse {
            authenticated: state.is_authenticated(),
            user_info: state.user_info().cloned(),
            logout: self.terminator.status(),
            pending_redirect: self.terminator.pending_redirect(),
            last_navigation: self.navigation.last(),
        }
    }

    /// Which renderer a step type resolves to
    pub fn renderer(&self, tag: &str) -> RendererResponse {
        let resolution = self.registry.resolve(tag);
        RendererResponse {
            tag: tag.to_string(),
            renderer: resolution.renderer().name().to_string(),
            fallback: resolution.is_fallback(),
        }
    }

    /// Start a journey, replacing any current one
    pub async fn start_journey(&self, journey: Option<String>) -> Result<JourneyResponse, ApiError> {
        let flow_id = journey
            .map(|j| j.trim().to_string())
            .filter(|j| !j.is_empty())
            .unwrap_or_else(|| self.default_journey.clone());

        let mut current = self.journey.lock().await;
        if let Some(previous) = current.as_ref().filter(|d| !d.state().is_terminal()) {
            tracing::info!(
                "Abandoning journey '{}' (attempt {})",
                previous.flow_id(),
                previous.attempt_id()
            );
        }

        let mut driver = AuthFlowDriver::new(
            self.service.clone(),
            self.registry.clone(),
            self.store.clone(),
            flow_id,
        );
        let progress = driver.start().await?;
        let response = journey_response(&driver, progress);
        *current = Some(driver);
        Ok(response)
    }

    pub async fn journey(&self) -> Result<JourneyResponse, ApiError> {
        let current = self.journey.lock().await;
        let driver = current.as_ref().ok_or(ApiError::NoJourney)?;
        Ok(JourneyResponse {
            status: driver.status(),
            user_info: None,
        })
    }

    /// Fill the current step with `values` and submit it
    pub async fn submit(&self, values: BTreeMap<String, String>) -> Result<JourneyResponse, ApiError> {
        let mut current = self.journey.lock().await;
        let driver = current.as_mut().ok_or(ApiError::NoJourney)?;

        for (name, value) in values {
            driver.fill(&name, value)?;
        }
        let progress = driver.submit().await?;
        Ok(journey_response(driver, progress))
    }

    pub async fn logout(&self) -> Result<LogoutResponse, ApiError> {
        let redirect = self.terminator.logout().await?;
        Ok(LogoutResponse {
            success: true,
            message: "Logged out".to_string(),
            redirect,
        })
    }

    pub fn cancel_redirect(&self) -> CancelRedirectResponse {
        CancelRedirectResponse {
            cancelled: self.terminator.cancel_redirect(),
        }
    }
}

fn journey_response(driver: &AuthFlowDriver, progress: FlowProgress) -> JourneyResponse {
    let user_info = match progress {
        FlowProgress::Succeeded(info) => Some(info),
        FlowProgress::NeedsInput(_) | FlowProgress::Failed(_) => None,
    };
    JourneyResponse {
        status: driver.status(),
        user_info,
    }
}
