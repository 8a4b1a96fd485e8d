//! Logout error definitions

use std::fmt;

use crate::identity::ServiceError;

/// The identity service did not confirm the logout
///
/// Local session state is left as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoutError(pub ServiceError);

impl fmt::Display for LogoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Logout did not successfully complete: {}", self.0)
    }
}

impl std::error::Error for LogoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<ServiceError> for LogoutError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}
