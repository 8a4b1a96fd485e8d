//! Session terminator
//!
//! Ends the server-side session, clears the local session store and
//! schedules a delayed redirect home. The redirect is an owned task that can
//! be cancelled while the delay is running.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::identity::IdentityService;
use crate::session::{SessionState, SessionStore};

use super::error::LogoutError;
use super::navigator::Navigator;

/// Where to go after logout, and when
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectIntent {
    pub destination: String,
    #[serde(serialize_with = "serialize_millis", rename = "delayMs")]
    pub delay: Duration,
}

fn serialize_millis<S: serde::Serializer>(delay: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(delay.as_millis() as u64)
}

/// Outcome of the most recent logout attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LogoutStatus {
    /// No logout attempted yet
    Idle,
    LoggedOut { at: DateTime<Utc> },
    /// Service did not confirm the logout; the server-side session may
    /// still be alive even though the user asked to leave
    LogoutUncertain { reason: String, at: DateTime<Utc> },
}

struct ScheduledRedirect {
    id: u64,
    intent: RedirectIntent,
    handle: JoinHandle<()>,
}

/// Session terminator
pub struct SessionTerminator {
    service: Arc<dyn IdentityService>,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    home: String,
    delay: Duration,
    redirect: Arc<Mutex<Option<ScheduledRedirect>>>,
    next_redirect_id: AtomicU64,
    status: Mutex<LogoutStatus>,
}

impl SessionTerminator {
    pub fn new(
        service: Arc<dyn IdentityService>,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
        home: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            service,
            store,
            navigator,
            home: home.into(),
            delay,
            redirect: Arc::new(Mutex::new(None)),
            next_redirect_id: AtomicU64::new(0),
            status: Mutex::new(LogoutStatus::Idle),
        }
    }

    /// Log the user out
    ///
    /// On success the store is cleared and a redirect is scheduled. On
    /// failure nothing local changes: the session cannot be claimed ended
    /// when the service did not confirm it.
    pub async fn logout(&self) -> Result<RedirectIntent, LogoutError> {
        if let Err(e) = self.service.logout().await {
            let error = LogoutError(e);
            tracing::error!("Error: {}", error);
            *self.status.lock() = LogoutStatus::LogoutUncertain {
                reason: error.to_string(),
                at: Utc::now(),
            };
            return Err(error);
        }

        self.store.set(SessionState::anonymous());
        *self.status.lock() = LogoutStatus::LoggedOut { at: Utc::now() };
        tracing::info!("Logged out, redirecting to {} in {:?}", self.home, self.delay);

        let intent = RedirectIntent {
            destination: self.home.clone(),
            delay: self.delay,
        };
        self.schedule_redirect(intent.clone());
        Ok(intent)
    }

    fn schedule_redirect(&self, intent: RedirectIntent) {
        let id = self.next_redirect_id.fetch_add(1, Ordering::Relaxed);
        let navigator = self.navigator.clone();
        let slot = self.redirect.clone();
        let destination = intent.destination.clone();
        let delay = intent.delay;

        // Hold the slot while spawning so the task cannot finish before it is recorded
        let mut pending = self.redirect.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Claim the slot before navigating; a cancel that took it first wins
            let claimed = {
                let mut pending = slot.lock();
                if pending.as_ref().is_some_and(|r| r.id == id) {
                    pending.take();
                    true
                } else {
                    false
                }
            };
            if claimed {
                navigator.navigate(&destination);
            }
        });

        if let Some(previous) = pending.replace(ScheduledRedirect { id, intent, handle }) {
            tracing::debug!("Replacing pending redirect to {}", previous.intent.destination);
            previous.handle.abort();
        }
    }

    /// Cancel a pending redirect; returns whether one was cancelled
    pub fn cancel_redirect(&self) -> bool {
        match self.redirect.lock().take() {
            Some(redirect) => {
                redirect.handle.abort();
                tracing::info!("Cancelled redirect to {}", redirect.intent.destination);
                true
            }
            None => false,
        }
    }

    pub fn pending_redirect(&self) -> Option<RedirectIntent> {
        self.redirect.lock().as_ref().map(|r| r.intent.clone())
    }

    pub fn has_pending_redirect(&self) -> bool {
        self.pending_redirect().is_some()
    }

    pub fn status(&self) -> LogoutStatus {
        self.status.lock().clone()
    }
}

impl Drop for SessionTerminator {
    fn drop(&mut self) {
        if let Some(redirect) = self.redirect.lock().take() {
            redirect.handle.abort();
        }
    }
}
