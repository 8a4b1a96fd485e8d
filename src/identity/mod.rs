//! Identity service module
//!
//! The external service that performs the actual authentication protocol:
//! - `IdentityService` trait consumed by the journey driver and logout
//! - `HttpIdentityService` client for a JSON identity gateway

mod error;
mod http;
#[cfg(test)]
pub(crate) mod mock;
mod service;

pub use error::ServiceError;
pub use http::HttpIdentityService;
pub use service::{IdentityService, ServiceResponse, SessionResult};
