//! Session API module
//!
//! HTTP surface for the presentation layer
//!
//! # Features
//! - Query session state and post-logout redirect
//! - Resolve which renderer a step type maps to
//! - Start and advance an authentication journey
//! - Log out, cancel the pending redirect
//!
//! # Usage
//! ```ignore
//! let service = SessionService::new(&config, identity, registry, store);
//! let router = create_router(Arc::new(service), config.effective_api_key());
//! ```

mod error;
mod handlers;
mod middleware;
mod router;
mod service;
pub mod types;

pub use router::create_router;
pub use service::SessionService;
