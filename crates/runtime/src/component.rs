//! Component contract and registry.
//!
//! A component is the only user code the engine calls into. Render output is
//! declarative data (a VNode list); asynchronous renders are modeled as
//! cooperative `Pending` results that the orchestrator re-polls, strictly
//! sequentially, until ready or out of budget.

use std::collections::HashMap;
use std::fmt;

use vdom::VNode;

/// One render's outcome.
#[derive(Debug)]
pub enum Render {
    Ready(Vec<VNode>),
    /// Not ready yet; the orchestrator polls again.
    Pending,
}

/// Failure raised by user render code; caught at the component boundary.
#[derive(Debug)]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RenderError {}

/// Scoped stylesheet contributed by a component.
#[derive(Clone, Debug)]
pub struct ComponentStyle {
    /// Unique scope id; styles attach once per id across all instances.
    pub scope_id: String,
    pub css: String,
}

/// A declarative UI component.
pub trait Component {
    /// Produce the current render output.
    fn render(&mut self) -> Result<Render, RenderError>;

    /// Observed-attribute hook; called once per host attribute before the
    /// first render with `old` of `None`.
    fn attribute_changed(&mut self, name: &str, old: Option<&str>, new: Option<&str>) {
        let _ = (name, old, new);
    }

    /// Component-generated CSS, attached idempotently by scope id.
    fn styles(&self) -> Option<ComponentStyle> {
        None
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Component>>;

/// Tag name → component factory.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under an ASCII-lowercased tag name.
    pub fn register<C, F>(&mut self, tag: &str, factory: F)
    where
        C: Component + 'static,
        F: Fn() -> C + 'static,
    {
        self.factories.insert(
            tag.to_ascii_lowercase(),
            Box::new(move || Box::new(factory())),
        );
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(&tag.to_ascii_lowercase())
    }

    pub fn create(&self, tag: &str) -> Option<Box<dyn Component>> {
        self.factories
            .get(&tag.to_ascii_lowercase())
            .map(|factory| factory())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("Registry").field("tags", &tags).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Component, Registry, Render, RenderError};
    use vdom::VNode;

    struct Probe;

    impl Component for Probe {
        fn render(&mut self) -> Result<Render, RenderError> {
            Ok(Render::Ready(vec![VNode::text("ok")]))
        }
    }

    #[test]
    fn registry_is_case_insensitive_on_tag_names() {
        let mut registry = Registry::new();
        registry.register("X-Widget", || Probe);
        assert!(registry.contains("x-widget"));
        assert!(registry.contains("X-WIDGET"));
        assert!(registry.create("x-widget").is_some());
        assert!(registry.create("x-other").is_none());
    }
}
