//! Step renderers
//!
//! A renderer turns a [`Step`] into a presentation-neutral [`StepView`].
//! The view's inputs are the only fields the user may fill.

use serde::Serialize;

use super::step::{InputKind, Step};

/// One input the presentation layer should collect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputView {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// What to draw for a step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub tag: String,
    pub renderer: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub inputs: Vec<InputView>,
}

impl StepView {
    pub fn accepts(&self, field: &str) -> bool {
        self.inputs.iter().any(|i| i.name == field)
    }
}

/// Rendering capability bound to a step type tag
pub trait StepRenderer: Send + Sync {
    /// Renderer name, shown in diagnostics
    fn name(&self) -> &str;

    fn render(&self, step: &Step) -> StepView;
}

/// Renders one input per step field, straight from the prompt metadata
#[derive(Debug, Default)]
pub struct FieldFormRenderer;

impl StepRenderer for FieldFormRenderer {
    fn name(&self) -> &str {
        "field-form"
    }

    fn render(&self, step: &Step) -> StepView {
        let inputs = step
            .fields
            .iter()
            .filter(|f| f.kind != InputKind::Hidden)
            .map(|f| InputView {
                name: f.name.clone(),
                label: if f.prompt.is_empty() {
                    f.name.clone()
                } else {
                    f.prompt.clone()
                },
                kind: f.kind,
                required: f.required,
                choices: f.choices.clone(),
            })
            .collect();

        StepView {
            tag: step.tag().to_string(),
            renderer: self.name().to_string(),
            title: step.header.clone().unwrap_or_else(|| "Sign In".to_string()),
            message: step.description.clone(),
            error: step.error.clone(),
            inputs,
        }
    }
}

/// Generic placeholder for step types the client does not recognize
///
/// Collects nothing, so the step is submitted back exactly as received.
#[derive(Debug, Default)]
pub struct UnknownStepRenderer;

impl StepRenderer for UnknownStepRenderer {
    fn name(&self) -> &str {
        "unknown"
    }

    fn render(&self, step: &Step) -> StepView {
        StepView {
            tag: step.tag().to_string(),
            renderer: self.name().to_string(),
            title: step.header.clone().unwrap_or_else(|| "Unknown step".to_string()),
            message: Some(format!("Step type \"{}\" is not supported", step.tag())),
            error: step.error.clone(),
            inputs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::step::StepField;

    #[test]
    fn test_form_renderer_one_input_per_field() {
        let step = Step::new(
            "name-password",
            vec![
                StepField::new("username", "User Name", InputKind::Text),
                StepField::new("password", "", InputKind::Password),
            ],
        );
        let view = FieldFormRenderer.render(&step);

        assert_eq!(view.renderer, "field-form");
        assert_eq!(view.title, "Sign In");
        assert_eq!(view.inputs.len(), 2);
        assert_eq!(view.inputs[0].label, "User Name");
        // Empty prompt falls back to the field name
        assert_eq!(view.inputs[1].label, "password");
        assert!(view.accepts("password"));
    }

    #[test]
    fn test_form_renderer_skips_hidden_fields() {
        let step = Step::new(
            "device",
            vec![
                StepField::new("fingerprint", "", InputKind::Hidden),
                StepField::new("nickname", "Device name", InputKind::Text).optional(),
            ],
        );
        let view = FieldFormRenderer.render(&step);

        assert_eq!(view.inputs.len(), 1);
        assert!(!view.accepts("fingerprint"));
        assert!(!view.inputs[0].required);
    }

    #[test]
    fn test_form_renderer_carries_error_annotation() {
        let step = Step::new("name-password", vec![]).with_error("Wrong password");
        let view = FieldFormRenderer.render(&step);
        assert_eq!(view.error.as_deref(), Some("Wrong password"));
    }

    #[test]
    fn test_unknown_renderer_accepts_nothing() {
        let step = Step::new("otp", vec![StepField::new("code", "Code", InputKind::Text)]);
        let view = UnknownStepRenderer.render(&step);

        assert_eq!(view.renderer, "unknown");
        assert!(view.inputs.is_empty());
        assert!(!view.accepts("code"));
        assert!(view.message.unwrap().contains("otp"));
    }
}
