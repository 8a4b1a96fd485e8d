//! Logout module
//!
//! Session termination followed by a cancelable, delayed redirect

mod error;
mod navigator;
mod terminator;

pub use error::LogoutError;
pub use navigator::{NavigationLog, NavigationRecord, Navigator};
pub use terminator::{LogoutStatus, RedirectIntent, SessionTerminator};
