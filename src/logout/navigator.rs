//! Navigation targets for post-logout redirects

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Performs a navigation to a destination path
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

/// A completed navigation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationRecord {
    pub destination: String,
    pub at: DateTime<Utc>,
}

/// Navigator that remembers the last destination
///
/// Clients poll it through the session endpoint.
#[derive(Debug, Default)]
pub struct NavigationLog {
    last: Mutex<Option<NavigationRecord>>,
}

impl NavigationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<NavigationRecord> {
        self.last.lock().clone()
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, destination: &str) {
        tracing::info!("Navigating to {}", destination);
        *self.last.lock() = Some(NavigationRecord {
            destination: destination.to_string(),
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_log_keeps_last() {
        let log = NavigationLog::new();
        assert!(log.last().is_none());

        log.navigate("/home");
        log.navigate("/login");
        assert_eq!(log.last().unwrap().destination, "/login");
    }
}
