//! Scripted identity service for tests

use std::collections::VecDeque;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::journey::Step;

use super::error::ServiceError;
use super::service::{IdentityService, ServiceResponse};

/// Answers queued responses in order and records every submission
#[derive(Default)]
pub struct ScriptedIdentityService {
    responses: Mutex<VecDeque<Result<ServiceResponse, ServiceError>>>,
    logout_results: Mutex<VecDeque<Result<(), ServiceError>>>,
    submissions: Mutex<Vec<(String, Option<Step>)>>,
    logout_calls: Mutex<usize>,
    stalled_calls: Mutex<usize>,
}

impl ScriptedIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<ServiceResponse, ServiceError>) -> &Self {
        self.responses.lock().push_back(response);
        self
    }

    pub fn push_step(&self, step: Step) -> &Self {
        self.push(Ok(ServiceResponse::Step { step }))
    }

    pub fn push_logout(&self, result: Result<(), ServiceError>) -> &Self {
        self.logout_results.lock().push_back(result);
        self
    }

    /// Next start/continue call never completes
    pub fn stall_next(&self) -> &Self {
        *self.stalled_calls.lock() += 1;
        self
    }

    pub fn submissions(&self) -> Vec<(String, Option<Step>)> {
        self.submissions.lock().clone()
    }

    pub fn logout_calls(&self) -> usize {
        *self.logout_calls.lock()
    }
}

impl IdentityService for ScriptedIdentityService {
    fn start_or_continue<'a>(
        &'a self,
        flow_id: &'a str,
        submitted: Option<Step>,
    ) -> BoxFuture<'a, Result<ServiceResponse, ServiceError>> {
        self.submissions
            .lock()
            .push((flow_id.to_string(), submitted));

        {
            let mut stalled = self.stalled_calls.lock();
            if *stalled > 0 {
                *stalled -= 1;
                return futures::future::pending::<Result<ServiceResponse, ServiceError>>()
                    .boxed();
            }
        }

        let next = self
            .responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("script exhausted".to_string())));
        async move { next }.boxed()
    }

    fn logout(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        *self.logout_calls.lock() += 1;
        let result = self.logout_results.lock().pop_front().unwrap_or(Ok(()));
        async move { result }.boxed()
    }
}
