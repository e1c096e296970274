//! Capability-keyed component registry, passed explicitly at render time.
//!
//! There is no module-level registry: callers construct one, register the
//! components their presentation layer can resolve, and hand it to
//! [`crate::serialize::RenderPayload::render`]. Per-call overrides are just
//! different registry values.

use crate::tree::Attr;
use std::collections::HashMap;

/// A single component invocation handed to a renderer.
#[derive(Debug)]
pub struct ComponentCall<'a> {
    /// Component name as written in the document.
    pub name: &'a str,
    /// Component attributes in document order.
    pub attrs: &'a [Attr],
    /// Pre-rendered, already-sanitized slot content.
    pub children_html: &'a str,
}

impl ComponentCall<'_> {
    /// Looks up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// Renderer callback for one component kind.
pub type ComponentRenderer = Box<dyn Fn(&ComponentCall<'_>) -> String + Send + Sync>;

/// Mapping of embeddable component names to renderers.
#[derive(Default)]
pub struct ComponentRegistry {
    renderers: HashMap<String, ComponentRenderer>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a renderer for a component name, replacing any existing one.
    pub fn register<F>(&mut self, name: impl Into<String>, renderer: F)
    where
        F: Fn(&ComponentCall<'_>) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(name.into(), Box::new(renderer));
    }

    /// Returns true if a renderer is registered for the name.
    pub fn is_supported(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Renders a component call, or `None` when the name is unknown.
    pub fn render(&self, call: &ComponentCall<'_>) -> Option<String> {
        self.renderers.get(call.name).map(|renderer| renderer(call))
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.renderers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}
