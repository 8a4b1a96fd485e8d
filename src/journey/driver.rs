//! Auth flow driver
//!
//! Drives one journey against the identity service:
//! AwaitingStep -> Rendering -> AwaitingUserInput -> Submitting -> (loop | Succeeded | Failed)

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::identity::{IdentityService, ServiceError, ServiceResponse};
use crate::session::{SessionState, SessionStore, UserInfo};

use super::error::FlowError;
use super::registry::StepRegistry;
use super::renderer::StepView;
use super::step::Step;

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    AwaitingStep,
    Rendering,
    AwaitingUserInput,
    Submitting,
    Succeeded,
    Failed,
}

impl FlowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FlowState::Succeeded | FlowState::Failed)
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::AwaitingStep => "awaiting_step",
            FlowState::Rendering => "rendering",
            FlowState::AwaitingUserInput => "awaiting_user_input",
            FlowState::Submitting => "submitting",
            FlowState::Succeeded => "succeeded",
            FlowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a driver round trip
#[derive(Debug, Clone, PartialEq)]
pub enum FlowProgress {
    /// A step is waiting for user input
    NeedsInput(StepView),
    Succeeded(UserInfo),
    Failed(ServiceError),
}

/// Step awaiting input, together with what was rendered for it
#[derive(Debug, Clone)]
struct PendingStep {
    step: Step,
    view: StepView,
    fallback: bool,
}

/// Serializable snapshot of a driver
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStatus {
    pub flow_id: String,
    pub attempt_id: Uuid,
    pub state: FlowState,
    pub rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<StepView>,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

/// Holds the driver in `Submitting` for one round trip
///
/// Dropped before [`SubmitGuard::complete`] means the submission future was
/// cancelled; the driver goes back to `AwaitingUserInput`.
struct SubmitGuard<'a> {
    state: &'a mut FlowState,
    flow_id: &'a str,
    completed: bool,
}

impl<'a> SubmitGuard<'a> {
    fn new(state: &'a mut FlowState, flow_id: &'a str) -> Self {
        *state = FlowState::Submitting;
        Self {
            state,
            flow_id,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            tracing::warn!(
                "Journey '{}': submission interrupted, step kept for resubmission",
                self.flow_id
            );
            *self.state = FlowState::AwaitingUserInput;
        }
    }
}

/// Auth flow driver
pub struct AuthFlowDriver {
    service: Arc<dyn IdentityService>,
    registry: Arc<StepRegistry>,
    store: SessionStore,
    flow_id: String,
    attempt_id: Uuid,
    state: FlowState,
    pending: Option<PendingStep>,
    rounds: usize,
    failure: Option<ServiceError>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl AuthFlowDriver {
    pub fn new(
        service: Arc<dyn IdentityService>,
        registry: Arc<StepRegistry>,
        store: SessionStore,
        flow_id: impl Into<String>,
    ) -> Self {
        Self {
            service,
            registry,
            store,
            flow_id: flow_id.into(),
            attempt_id: Uuid::new_v4(),
            state: FlowState::AwaitingStep,
            pending: None,
            rounds: 0,
            failure: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.pending.as_ref().map(|p| &p.step)
    }

    pub fn current_view(&self) -> Option<&StepView> {
        self.pending.as_ref().map(|p| &p.view)
    }

    /// Whether the current step is shown through the fallback renderer
    pub fn is_fallback(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| p.fallback)
    }

    pub fn failure(&self) -> Option<&ServiceError> {
        self.failure.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Ask the service for the first step
    pub async fn start(&mut self) -> Result<FlowProgress, FlowError> {
        if self.state.is_terminal() {
            return Err(FlowError::Finished { state: self.state });
        }
        if self.state != FlowState::AwaitingStep || self.rounds > 0 {
            return Err(FlowError::AlreadyStarted);
        }

        tracing::info!("Starting journey '{}' (attempt {})", self.flow_id, self.attempt_id);
        let service = self.service.clone();
        let response = service.start_or_continue(&self.flow_id, None).await;
        Ok(self.handle_response(response))
    }

    /// Accept a step from the service and render it
    ///
    /// A step still waiting for input is discarded without being submitted.
    pub fn receive_step(&mut self, step: Step) -> Result<&StepView, FlowError> {
        if self.state.is_terminal() {
            return Err(FlowError::Finished { state: self.state });
        }

        if let Some(previous) = self.pending.take() {
            tracing::warn!(
                "Journey '{}': discarding unsubmitted step '{}'",
                self.flow_id,
                previous.step.tag()
            );
        }

        self.state = FlowState::Rendering;
        let resolution = self.registry.resolve(step.tag());
        let fallback = resolution.is_fallback();
        let view = resolution.renderer().render(&step);

        if fallback {
            tracing::info!(
                "Journey '{}': unrecognized step type '{}', using fallback renderer",
                self.flow_id,
                step.tag()
            );
        } else {
            tracing::debug!(
                "Journey '{}': step '{}' rendered by '{}'",
                self.flow_id,
                step.tag(),
                view.renderer
            );
        }
        if let Some(error) = &step.error {
            tracing::warn!("Journey '{}': previous submission rejected: {}", self.flow_id, error);
        }

        self.rounds += 1;
        self.state = FlowState::AwaitingUserInput;
        let pending = self.pending.insert(PendingStep {
            step,
            view,
            fallback,
        });
        Ok(&pending.view)
    }

    /// Capture user input for a field of the current step
    pub fn fill(&mut self, field: &str, value: impl Into<String>) -> Result<(), FlowError> {
        if self.state != FlowState::AwaitingUserInput {
            return Err(self.not_awaiting_input());
        }
        let Some(pending) = self.pending.as_mut() else {
            return Err(FlowError::NoPendingStep { state: self.state });
        };

        if !pending.view.accepts(field) {
            return Err(FlowError::UnknownField(field.to_string()));
        }
        pending.step.set_value(field, value)
    }

    /// Required inputs of the current step that are still empty
    pub fn missing_fields(&self) -> Vec<String> {
        let Some(pending) = &self.pending else {
            return Vec::new();
        };

        pending
            .view
            .inputs
            .iter()
            .filter(|input| input.required)
            .filter(|input| {
                !pending
                    .step
                    .field(&input.name)
                    .is_some_and(|f| f.is_filled())
            })
            .map(|input| input.name.clone())
            .collect()
    }

    /// Send the current step back to the service
    pub async fn submit(&mut self) -> Result<FlowProgress, FlowError> {
        if self.state != FlowState::AwaitingUserInput || self.pending.is_none() {
            return Err(self.not_awaiting_input());
        }

        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FlowError::MissingFields(missing));
        }

        let Some(step) = self.current_step().cloned() else {
            return Err(self.not_awaiting_input());
        };
        tracing::debug!("Journey '{}': submitting step '{}'", self.flow_id, step.tag());

        // The pending step stays in place until the service answers, so a
        // dropped round trip leaves the step ready to submit again
        let service = self.service.clone();
        let flow_id = self.flow_id.clone();
        let response = {
            let guard = SubmitGuard::new(&mut self.state, &flow_id);
            let response = service.start_or_continue(&flow_id, Some(step)).await;
            guard.complete();
            response
        };

        self.pending = None;
        self.state = FlowState::AwaitingStep;
        Ok(self.handle_response(response))
    }

    pub fn status(&self) -> FlowStatus {
        FlowStatus {
            flow_id: self.flow_id.clone(),
            attempt_id: self.attempt_id,
            state: self.state,
            rounds: self.rounds,
            view: self.current_view().cloned(),
            fallback: self.is_fallback(),
            error: self.failure.as_ref().map(|e| e.to_string()),
            started_at: self.started_at.to_rfc3339(),
            finished_at: self.finished_at.map(|t| t.to_rfc3339()),
        }
    }

    fn handle_response(
        &mut self,
        response: Result<ServiceResponse, ServiceError>,
    ) -> FlowProgress {
        match response {
            Ok(ServiceResponse::Step { step }) => match self.receive_step(step).cloned() {
                Ok(view) => FlowProgress::NeedsInput(view),
                // Only reachable from a terminal state, which never submits
                Err(e) => self.fail(ServiceError::Transport(e.to_string())),
            },
            Ok(ServiceResponse::Success(result)) if !result.user_info.is_record() => self.fail(
                ServiceError::Transport("Success response without a user record".to_string()),
            ),
            Ok(ServiceResponse::Success(result)) => {
                self.pending = None;
                self.state = FlowState::Succeeded;
                self.finished_at = Some(Utc::now());
                self.store
                    .set(SessionState::authenticated(result.user_info.clone()));
                tracing::info!(
                    "Journey '{}' succeeded after {} step(s)",
                    self.flow_id,
                    self.rounds
                );
                FlowProgress::Succeeded(result.user_info)
            }
            Ok(ServiceResponse::Failure { reason }) => self.fail(ServiceError::Rejected(reason)),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: ServiceError) -> FlowProgress {
        match &error {
            ServiceError::Rejected(_) => {
                tracing::warn!("Journey '{}' failed: {}", self.flow_id, error);
            }
            ServiceError::Transport(_) => {
                tracing::error!("Journey '{}' failed: {}", self.flow_id, error);
            }
        }
        self.pending = None;
        self.state = FlowState::Failed;
        self.finished_at = Some(Utc::now());
        self.failure = Some(error.clone());
        FlowProgress::Failed(error)
    }

    fn not_awaiting_input(&self) -> FlowError {
        if self.state.is_terminal() {
            FlowError::Finished { state: self.state }
        } else {
            FlowError::NoPendingStep { state: self.state }
        }
    }
}
