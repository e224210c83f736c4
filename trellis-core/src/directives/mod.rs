//! Directive Registry & Built-ins
//!
//! Directives are the attribute-triggered behaviors the walker dispatches:
//! a handler receives one [`DirectiveContext`] per element/attribute pair
//! and installs a side effect, usually by registering a computation through
//! [`DirectiveContext::watch`] so the effect re-runs when its tracked reads
//! change.
//!
//! The reserved vocabulary (attribute names carry a leading `@` in markup,
//! stripped before lookup):
//!
//! | name         | behavior                                             |
//! |--------------|------------------------------------------------------|
//! | `text`       | reactive text-content binding with interpolation     |
//! | `if`         | `"cond; call()"` conditional statement runner        |
//! | `range`      | `"N as x"` finite repetition over a template         |
//! | `for`        | `"item in coll"` collection iteration over a template|
//! | `model`      | two-way form-field binding                           |
//! | `component`  | sub-component mount point with slot grafting         |
//! | `on<event>`  | native event wiring, one per platform event name     |
//!
//! `@:attr` reactive attribute binding is handled by the walker itself and
//! never reaches the registry. User registries merge over built-ins, user
//! entries winning on name collision.

mod component;
mod cond;
mod events;
mod iter;
mod model;
mod range;
mod text;

use std::rc::Rc;

use indexmap::IndexMap;

use crate::component::ComponentRegistry;
use crate::dom::NodeRef;
use crate::error::Result;
use crate::reactive::{watch, Computation};
use crate::scope::{Frames, ScopedView};
use crate::walker::Walker;

/// Everything a directive handler receives for one element/attribute pair.
#[derive(Clone)]
pub struct DirectiveContext {
    /// The element carrying the attribute.
    pub element: NodeRef,
    /// The raw attribute value.
    pub value: String,
    /// The fully composed scope (root state plus the node's frames).
    pub scope: ScopedView,
    /// The node's own frame list, root state excluded.
    pub scopes: Frames,
    /// The root-state frames of the walk that dispatched this directive.
    pub root: Frames,
    /// The active directive registry, for nested walks.
    pub directives: DirectiveRegistry,
    /// The active component registry, for nested walks.
    pub components: ComponentRegistry,
}

impl DirectiveContext {
    /// Register a computation. Runs the body once synchronously, tracking
    /// its reads; re-runs it on every changed write to a tracked key.
    pub fn watch<F>(&self, body: F) -> Result<Rc<Computation>>
    where
        F: Fn() -> Result<()> + 'static,
    {
        watch(body)
    }
}

impl std::fmt::Debug for DirectiveContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveContext")
            .field("element", &self.element)
            .field("value", &self.value)
            .finish()
    }
}

/// A directive handler. Installed once per element/attribute pair; free to
/// call [`DirectiveContext::watch`] zero or more times.
pub type DirectiveHandler = Rc<dyn Fn(&DirectiveContext) -> Result<()>>;

/// User-supplied directives layered over the built-in vocabulary.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    handlers: IndexMap<String, DirectiveHandler>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name` (without the `@` prefix), replacing
    /// any previous entry and shadowing a same-named built-in.
    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&DirectiveContext) -> Result<()> + 'static,
    {
        self.handlers.insert(name.to_string(), Rc::new(handler));
    }

    /// Builder-style registration.
    pub fn with<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&DirectiveContext) -> Result<()> + 'static,
    {
        self.register(name, handler);
        self
    }

    /// Merge `other` over `self`; `other`'s entries win on collision.
    pub fn merged(&self, other: &DirectiveRegistry) -> DirectiveRegistry {
        let mut handlers = self.handlers.clone();
        for (name, handler) in &other.handlers {
            handlers.insert(name.clone(), handler.clone());
        }
        DirectiveRegistry { handlers }
    }

    /// Resolve `name` to a handler: user entries first, then built-ins,
    /// then the open-ended `on<event>` convention.
    pub fn resolve(&self, name: &str) -> Option<DirectiveHandler> {
        if let Some(handler) = self.handlers.get(name) {
            return Some(handler.clone());
        }
        match name {
            "text" => Some(Rc::new(text::apply)),
            "if" => Some(Rc::new(cond::apply)),
            "range" => Some(Rc::new(range::apply)),
            "for" => Some(Rc::new(iter::apply)),
            "model" => Some(Rc::new(model::apply)),
            "component" => Some(Rc::new(component::apply)),
            _ => events::resolve(name),
        }
    }
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("names", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Shared tag-and-sweep tail of the structural directives.
///
/// Walks the freshly produced clones (already tagged and scope-seeded)
/// inside a detached fragment, then removes exactly the siblings this
/// template produced on a previous run and appends the fresh ones.
fn swap_in(template: &NodeRef, produced: Vec<NodeRef>, ctx: &DirectiveContext) -> Result<()> {
    let fragment = NodeRef::element("fragment");
    for node in &produced {
        fragment.append_child(node);
    }

    Walker::new(fragment.clone())
        .data(ctx.root.iter().cloned())
        .directives(ctx.directives.clone())
        .components(ctx.components.clone())
        .walk()?;

    let Some(parent) = template.parent() else {
        return Ok(());
    };
    parent.retain_children(|child| !child.produced_by_is(template));
    for node in fragment.take_children() {
        parent.append_child(&node);
    }
    Ok(())
}

/// Split a structural directive value on an infix keyword surrounded by
/// whitespace (`in`, `as`), tolerating arbitrary spacing.
fn split_infix(value: &str, keyword: &str) -> (String, Option<String>) {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if let Some(at) = tokens.iter().position(|t| *t == keyword) {
        let head = tokens[..at].join(" ");
        let tail = tokens[at + 1..].join(" ");
        let tail = (!tail.is_empty()).then_some(tail);
        (head, tail)
    } else {
        (value.trim().to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_directive_shadows_builtin() {
        let registry = DirectiveRegistry::new().with("text", |_ctx| Ok(()));
        assert!(registry.resolve("text").is_some());
        assert!(registry.resolve("if").is_some());
        assert!(registry.resolve("onclick").is_some());
        assert!(registry.resolve("bogus").is_none());
    }

    #[test]
    fn merged_registries_prefer_the_overlay() {
        let base = DirectiveRegistry::new().with("x", |_ctx| Ok(()));
        let over = DirectiveRegistry::new().with("x", |_ctx| Ok(()));
        let over_handler = over.resolve("x").unwrap();
        let merged = base.merged(&over);
        assert!(Rc::ptr_eq(&merged.resolve("x").unwrap(), &over_handler));
    }

    #[test]
    fn split_infix_tolerates_spacing() {
        assert_eq!(
            split_infix("item in  {coll}", "in"),
            ("item".to_string(), Some("{coll}".to_string()))
        );
        assert_eq!(split_infix("3", "as"), ("3".to_string(), None));
        assert_eq!(
            split_infix("{n} as i", "as"),
            ("{n}".to_string(), Some("i".to_string()))
        );
    }
}
