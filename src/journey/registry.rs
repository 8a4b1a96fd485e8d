//! Step renderer registry

use std::collections::HashMap;
use std::sync::Arc;

use super::error::RegistryError;
use super::renderer::{FieldFormRenderer, StepRenderer, UnknownStepRenderer};

/// Step type handled by the built-in username/password form
pub const NAME_PASSWORD_TAG: &str = "name-password";

/// Association between a step type tag and its renderer
#[derive(Clone)]
pub struct RendererBinding {
    pub tag: String,
    pub renderer: Arc<dyn StepRenderer>,
}

impl std::fmt::Debug for RendererBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererBinding")
            .field("tag", &self.tag)
            .field("renderer", &self.renderer.name())
            .finish()
    }
}

/// Result of [`StepRegistry::resolve`]
#[derive(Clone)]
pub enum Resolution {
    Bound(RendererBinding),
    Fallback(Arc<dyn StepRenderer>),
}

impl Resolution {
    pub fn renderer(&self) -> &dyn StepRenderer {
        match self {
            Resolution::Bound(binding) => binding.renderer.as_ref(),
            Resolution::Fallback(renderer) => renderer.as_ref(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }
}

/// Maps step type tags to renderers
///
/// At most one binding per tag. Unbound tags resolve to the fallback
/// renderer so an unfamiliar step never stops the journey.
pub struct StepRegistry {
    bindings: HashMap<String, RendererBinding>,
    fallback: Arc<dyn StepRenderer>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StepRegistry {
    /// Empty registry with [`UnknownStepRenderer`] as fallback
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            fallback: Arc::new(UnknownStepRenderer),
        }
    }

    /// Registry with the form renderer bound to `name-password` and to each
    /// of `form_tags`; repeated tags are bound once
    pub fn with_defaults<I, S>(form_tags: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let form: Arc<dyn StepRenderer> = Arc::new(FieldFormRenderer);
        let mut registry = Self::new();
        registry.register(NAME_PASSWORD_TAG, form.clone())?;
        for tag in form_tags {
            let tag = tag.into();
            if registry.bindings.contains_key(&tag) {
                tracing::debug!("Step type '{}' already bound to the form renderer", tag);
                continue;
            }
            registry.register(tag, form.clone())?;
        }
        Ok(registry)
    }

    /// Replace the fallback renderer
    pub fn with_fallback(mut self, fallback: Arc<dyn StepRenderer>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Bind a renderer to a tag
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        renderer: Arc<dyn StepRenderer>,
    ) -> Result<(), RegistryError> {
        let tag = tag.into();
        if self.bindings.contains_key(&tag) {
            return Err(RegistryError::DuplicateBinding(tag));
        }
        tracing::debug!("Registered renderer '{}' for step type '{}'", renderer.name(), tag);
        self.bindings.insert(tag.clone(), RendererBinding { tag, renderer });
        Ok(())
    }

    /// Exact-match lookup, falling back for unbound tags
    pub fn resolve(&self, tag: &str) -> Resolution {
        match self.bindings.get(tag) {
            Some(binding) => Resolution::Bound(binding.clone()),
            None => Resolution::Fallback(self.fallback.clone()),
        }
    }

    /// Bound tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::renderer::StepView;
    use crate::journey::step::Step;

    struct OtpRenderer;

    impl StepRenderer for OtpRenderer {
        fn name(&self) -> &str {
            "otp"
        }

        fn render(&self, step: &Step) -> StepView {
            FieldFormRenderer.render(step)
        }
    }

    #[test]
    fn test_resolve_bound_tag() {
        let registry = StepRegistry::with_defaults(Vec::<String>::new()).unwrap();
        let resolution = registry.resolve("name-password");
        assert!(!resolution.is_fallback());
        assert_eq!(resolution.renderer().name(), "field-form");
    }

    #[test]
    fn test_unbound_tags_fall_back() {
        let registry = StepRegistry::with_defaults(Vec::<String>::new()).unwrap();
        for tag in ["otp", "", "NAME-PASSWORD", "name-password ", "\u{1F600}"] {
            let resolution = registry.resolve(tag);
            assert!(resolution.is_fallback(), "tag {:?} should fall back", tag);
            assert_eq!(resolution.renderer().name(), "unknown");
        }
    }

    #[test]
    fn test_empty_registry_always_falls_back() {
        let registry = StepRegistry::new();
        assert!(registry.resolve("name-password").is_fallback());
        assert!(registry.tags().is_empty());
    }

    #[test]
    fn test_duplicate_binding_rejected() {
        let mut registry = StepRegistry::new();
        registry.register("otp", Arc::new(OtpRenderer)).unwrap();
        let result = registry.register("otp", Arc::new(FieldFormRenderer));
        assert_eq!(result, Err(RegistryError::DuplicateBinding("otp".to_string())));
        // First binding wins
        assert_eq!(registry.resolve("otp").renderer().name(), "otp");
    }

    #[test]
    fn test_with_defaults_binds_form_tags() {
        let registry = StepRegistry::with_defaults(["choice", "name-password", "kba"]).unwrap();
        assert_eq!(registry.tags(), vec!["choice", "kba", "name-password"]);
        assert!(!registry.resolve("kba").is_fallback());
    }

    #[test]
    fn test_with_defaults_ignores_repeated_form_tags() {
        let registry = StepRegistry::with_defaults(["choice", "choice", "kba", "kba"]).unwrap();
        assert_eq!(registry.tags(), vec!["choice", "kba", "name-password"]);
    }

    #[test]
    fn test_custom_fallback() {
        let registry = StepRegistry::new().with_fallback(Arc::new(OtpRenderer));
        let resolution = registry.resolve("anything");
        assert!(resolution.is_fallback());
        assert_eq!(resolution.renderer().name(), "otp");
    }
}
