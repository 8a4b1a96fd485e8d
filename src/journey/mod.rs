//! Authentication journey module
//!
//! Renders an arbitrary, server-driven sequence of authentication steps:
//! - Step model and renderer registry (with an "unknown step" fallback)
//! - Auth flow driver state machine

mod driver;
mod error;
mod registry;
mod renderer;
mod step;

pub use driver::{AuthFlowDriver, FlowProgress, FlowState, FlowStatus};
pub use error::{FlowError, RegistryError};
pub use registry::{NAME_PASSWORD_TAG, RendererBinding, Resolution, StepRegistry};
pub use renderer::{FieldFormRenderer, InputView, StepRenderer, StepView, UnknownStepRenderer};
pub use step::{InputKind, Step, StepField};
