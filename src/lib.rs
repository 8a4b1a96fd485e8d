//! Session lifecycle coordinator for server-driven authentication journeys
//!
//! - `session`: current authentication state with change notification
//! - `journey`: step model, renderer registry, auth flow driver
//! - `identity`: external identity service boundary and HTTP client
//! - `logout`: session termination with a cancelable redirect
//! - `api`: HTTP surface for the presentation layer

pub mod api;
pub mod http_client;
pub mod identity;
pub mod journey;
pub mod logout;
pub mod model;
pub mod session;
