//! Journey error definitions

use std::fmt;

use super::driver::FlowState;

/// Auth flow driver error types
#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    /// `start` called after the flow already received a step
    AlreadyStarted,
    /// Nothing to submit: no step is awaiting input
    NoPendingStep { state: FlowState },
    /// Flow reached a terminal state
    Finished { state: FlowState },
    /// Field is not part of the current step, or the renderer does not collect it
    UnknownField(String),
    /// Required inputs left empty
    MissingFields(Vec<String>),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::AlreadyStarted => write!(f, "Journey already started"),
            FlowError::NoPendingStep { state } => {
                write!(f, "No step awaiting input (state: {})", state)
            }
            FlowError::Finished { state } => write!(f, "Journey already finished ({})", state),
            FlowError::UnknownField(name) => write!(f, "Unknown field: {}", name),
            FlowError::MissingFields(names) => {
                write!(f, "Missing required fields: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for FlowError {}

/// Renderer registry error types
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A renderer is already bound to this tag
    DuplicateBinding(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateBinding(tag) => {
                write!(f, "Renderer already registered for step type: {}", tag)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
