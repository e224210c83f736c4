//! Component Boundary
//!
//! A component is an external collaborator: it hands the walker a root
//! element to traverse, a private state frame, and optionally its own
//! directive and component registries to merge over the caller's. The
//! walker never constructs components itself; the `@component` directive
//! resolves a factory by name from the merged registry and instantiates it
//! per mount.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::directives::DirectiveRegistry;
use crate::dom::NodeRef;
use crate::error::Result;
use crate::value::Value;

/// What a mountable component exposes to the walker.
pub trait Component {
    /// The element subtree the walker traverses. `None` is a mount error
    /// surfaced by the `@component` directive.
    fn root(&self) -> Option<NodeRef>;

    /// The component's private state, pushed as the innermost frame of the
    /// mounted subtree's scope chain.
    fn state(&self) -> Value;

    /// Directives this component contributes, merged over the caller's.
    fn directives(&self) -> DirectiveRegistry {
        DirectiveRegistry::new()
    }

    /// Sub-components this component contributes, merged over the caller's.
    fn components(&self) -> ComponentRegistry {
        ComponentRegistry::new()
    }
}

/// Constructs a fresh component instance per mount.
pub type ComponentFactory = Rc<dyn Fn() -> Result<Rc<dyn Component>>>;

/// Named component factories, merged with caller-over-callee precedence at
/// each mount boundary.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: IndexMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Result<Rc<dyn Component>> + 'static,
    {
        self.factories.insert(name.to_string(), Rc::new(factory));
    }

    /// Builder-style registration.
    pub fn with<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Rc<dyn Component>> + 'static,
    {
        self.register(name, factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<ComponentFactory> {
        self.factories.get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Merge `other` over `self`; `other`'s entries win on collision.
    pub fn merged(&self, other: &ComponentRegistry) -> ComponentRegistry {
        let mut factories = self.factories.clone();
        for (name, factory) in &other.factories {
            factories.insert(name.clone(), factory.clone());
        }
        ComponentRegistry { factories }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Value);

    impl Component for Fixed {
        fn root(&self) -> Option<NodeRef> {
            Some(NodeRef::element("div"))
        }

        fn state(&self) -> Value {
            self.0.clone()
        }
    }

    fn fixed(tag: &'static str) -> ComponentFactory {
        Rc::new(move || {
            Ok(Rc::new(Fixed(Value::from(tag))) as Rc<dyn Component>)
        })
    }

    #[test]
    fn merge_prefers_the_overriding_registry() {
        let base = ComponentRegistry::new();
        let mut base = base;
        base.register("card", move || {
            Ok(Rc::new(Fixed(Value::from("base"))) as Rc<dyn Component>)
        });

        let mut over = ComponentRegistry::new();
        over.factories.insert("card".to_string(), fixed("over"));

        let merged = base.merged(&over);
        let component = merged.get("card").unwrap()().unwrap();
        assert_eq!(component.state(), Value::from("over"));
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        assert!(ComponentRegistry::new().get("ghost").is_none());
    }
}
