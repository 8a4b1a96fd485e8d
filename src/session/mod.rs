//! Session state module
//!
//! Holds the current authentication state and notifies observers on change

mod store;
mod types;

pub use store::{SessionStore, Subscription};
pub use types::{SessionState, UserInfo};
