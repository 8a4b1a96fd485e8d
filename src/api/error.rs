//! Session API error type definitions

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::journey::FlowError;
use crate::logout::LogoutError;

use super::types::ErrorResponse;

/// Session API error types
#[derive(Debug)]
pub enum ApiError {
    /// No journey has been started
    NoJourney,
    /// Driver refused the operation
    Flow(FlowError),
    /// Identity service did not confirm the logout
    Logout(LogoutError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NoJourney => write!(f, "No journey in progress"),
            ApiError::Flow(e) => write!(f, "{}", e),
            ApiError::Logout(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<FlowError> for ApiError {
    fn from(e: FlowError) -> Self {
        Self::Flow(e)
    }
}

impl From<LogoutError> for ApiError {
    fn from(e: LogoutError) -> Self {
        Self::Logout(e)
    }
}

impl ApiError {
    /// Get corresponding HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NoJourney => StatusCode::NOT_FOUND,
            ApiError::Flow(FlowError::UnknownField(_) | FlowError::MissingFields(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Flow(_) => StatusCode::CONFLICT,
            ApiError::Logout(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Convert to API error body
    pub fn to_error_response(&self) -> ErrorResponse {
        let message = self.to_string();
        match self {
            ApiError::NoJourney => ErrorResponse::not_found(message),
            ApiError::Flow(FlowError::UnknownField(_) | FlowError::MissingFields(_)) => {
                ErrorResponse::invalid_request(message)
            }
            ApiError::Flow(_) => ErrorResponse::conflict(message),
            ApiError::Logout(_) => ErrorResponse::upstream_error(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_error_response())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ServiceError;
    use crate::journey::FlowState;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NoJourney.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Flow(FlowError::MissingFields(vec!["password".to_string()])).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Flow(FlowError::Finished {
                state: FlowState::Succeeded
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Logout(LogoutError(ServiceError::Transport("down".to_string())))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_body() {
        let body = ApiError::Flow(FlowError::UnknownField("otp".to_string())).to_error_response();
        assert_eq!(body.error.error_type, "invalid_request");
        assert_eq!(body.error.message, "Unknown field: otp");
    }
}
