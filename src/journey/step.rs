//! Journey step model

use serde::{Deserialize, Serialize};

use super::error::FlowError;

/// Kind of input a field expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    #[default]
    Text,
    Password,
    Choice,
    Confirmation,
    Hidden,
}

/// One named field of a step: prompt metadata plus the captured value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepField {
    pub name: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub kind: InputKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

fn default_required() -> bool {
    true
}

impl StepField {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            kind,
            required: true,
            choices: Vec::new(),
            value: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn is_filled(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.is_empty())
    }
}

/// One unit of an authentication exchange
///
/// The type tag is fixed at construction. Field values start empty and are
/// filled from user input before the step is submitted back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<StepField>,
    /// Set by the service when the previous submission was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    pub fn new(tag: impl Into<String>, fields: Vec<StepField>) -> Self {
        Self {
            tag: tag.into(),
            header: None,
            description: None,
            fields,
            error: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Step type tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn field(&self, name: &str) -> Option<&StepField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Capture a value for a named field
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), FlowError> {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .ok_or_else(|| FlowError::UnknownField(name.to_string()))?;
        field.value = Some(value.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name_password() -> Step {
        Step::new(
            "name-password",
            vec![
                StepField::new("username", "User Name", InputKind::Text),
                StepField::new("password", "Password", InputKind::Password),
            ],
        )
    }

    #[test]
    fn test_fields_start_empty() {
        let step = name_password();
        assert!(step.fields.iter().all(|f| f.value.is_none()));
        assert!(!step.field("username").unwrap().is_filled());
    }

    #[test]
    fn test_set_value() {
        let mut step = name_password();
        step.set_value("username", "demo").unwrap();
        assert_eq!(step.field("username").unwrap().value.as_deref(), Some("demo"));
        assert!(step.field("username").unwrap().is_filled());
    }

    #[test]
    fn test_set_value_unknown_field() {
        let mut step = name_password();
        let result = step.set_value("otp", "123456");
        assert!(matches!(result, Err(FlowError::UnknownField(name)) if name == "otp"));
    }

    #[test]
    fn test_empty_value_is_not_filled() {
        let mut step = name_password();
        step.set_value("password", "").unwrap();
        assert!(!step.field("password").unwrap().is_filled());
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let step: Step = serde_json::from_value(json!({
            "type": "choice",
            "header": "Pick one",
            "fields": [
                {"name": "method", "prompt": "Method", "kind": "choice", "choices": ["sms", "email"]},
                {"name": "remember", "kind": "confirmation", "required": false}
            ]
        }))
        .unwrap();

        assert_eq!(step.tag(), "choice");
        assert_eq!(step.header.as_deref(), Some("Pick one"));
        assert_eq!(step.fields[0].choices, vec!["sms", "email"]);
        assert!(step.fields[0].required);
        assert!(!step.fields[1].required);
        assert_eq!(step.fields[1].kind, InputKind::Confirmation);
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let value = serde_json::to_value(name_password().with_error("Login failure")).unwrap();
        assert_eq!(value["type"], json!("name-password"));
        assert_eq!(value["error"], json!("Login failure"));
        assert!(value.get("header").is_none());
    }
}
