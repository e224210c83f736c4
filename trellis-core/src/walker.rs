//! Directive-Driven Tree Walker
//!
//! # How a Walk Works
//!
//! [`Walker::walk`] visits every descendant element of the root in document
//! order, exactly once per call, and gives each one its lexical
//! environment before dispatching directives:
//!
//! 1. Inherit the parent element's frame list by reference and append any
//!    frames pre-seeded on the node (structural directives seed loop
//!    frames on clones this way).
//! 2. Push a self-helpers frame: `$element`/`$el` bound to the node,
//!    `$select`/`$sel` and `$selectAll`/`$selAll` bound to scoped query
//!    helpers.
//! 3. Evaluate the node's `@data` attribute (an object literal,
//!    interpolated against the frames accumulated so far) and push the
//!    observed result as the innermost frame.
//! 4. Compose root state plus the frame list into the node's scope.
//! 5. Run `@init` once as a fire-once call statement, never reactively.
//! 6. Dispatch every remaining `@`-attribute in declaration order: `@:attr`
//!    installs a reactive attribute binding inline; anything else resolves
//!    through the directive registry and is skipped when unknown.
//!
//! The walker never diffs children. Structural directives own full
//! replacement of what they produced, via the tag-and-sweep protocol on
//! [`NodeRef::set_produced_by`].
//!
//! Child lists are snapshotted before a node's directives run, so subtrees
//! a structural directive inserts (and walks itself) are not visited a
//! second time by the outer walk.

use tracing::{debug, trace};

use crate::component::ComponentRegistry;
use crate::directives::{DirectiveContext, DirectiveRegistry};
use crate::dom::NodeRef;
use crate::error::{EngineError, Result};
use crate::eval::{interpolate, parse_call, parse_literal};
use crate::reactive::{observe, watch};
use crate::scope::{compose_scopes, Frames, ScopedView};
use crate::value::Value;

/// Walks a subtree, binding directives to the elements it visits.
pub struct Walker {
    root: NodeRef,
    data: Frames,
    directives: DirectiveRegistry,
    components: ComponentRegistry,
}

impl Walker {
    /// Walk the subtree under `root`. The root itself is not visited.
    pub fn new(root: NodeRef) -> Self {
        Self {
            root,
            data: Frames::new(),
            directives: DirectiveRegistry::new(),
            components: ComponentRegistry::new(),
        }
    }

    /// Walk the first element under `document` matching `selector`.
    pub fn mount(document: &NodeRef, selector: &str) -> Result<Self> {
        let root = document
            .query(selector)
            .ok_or_else(|| EngineError::MissingRoot(selector.to_string()))?;
        Ok(Self::new(root))
    }

    /// Root-state frames, outermost first.
    pub fn data<I: IntoIterator<Item = Value>>(mut self, frames: I) -> Self {
        self.data = frames.into_iter().collect();
        self
    }

    pub fn directives(mut self, directives: DirectiveRegistry) -> Self {
        self.directives = directives;
        self
    }

    pub fn components(mut self, components: ComponentRegistry) -> Self {
        self.components = components;
        self
    }

    /// Visit every descendant element once, dispatching its directives.
    ///
    /// Errors abort the remainder of the walk; effects installed on
    /// already-visited elements stay installed.
    pub fn walk(&self) -> Result<()> {
        debug!(root = %self.root.tag(), frames = self.data.len(), "walk");
        for child in self.root.children() {
            self.visit_tree(&child)?;
        }
        Ok(())
    }

    fn visit_tree(&self, node: &NodeRef) -> Result<()> {
        if !node.is_element() {
            return Ok(());
        }
        // Snapshot first: directives may replace or extend this child list.
        let children = node.children();
        self.visit(node)?;
        for child in children {
            self.visit_tree(&child)?;
        }
        Ok(())
    }

    fn visit(&self, node: &NodeRef) -> Result<()> {
        trace!(tag = %node.tag(), "visit");

        let mut frames: Frames = node
            .parent()
            .map(|parent| parent.scopes())
            .unwrap_or_default();
        frames.extend(node.scopes());
        frames.push(self_helpers(node));

        let data_frame = {
            let partial = self.compose(&frames);
            let source = node.attr("@data").unwrap_or_default();
            let source = if source.is_empty() { "{}".to_string() } else { source };
            let rendered = interpolate(&source, &partial);
            observe(parse_literal(&rendered)?)
        };
        frames.push(data_frame);
        node.set_scopes(frames.clone());

        let scope = self.compose(&frames);

        if let Some(init) = node.attr("@init") {
            let (name, args) = parse_call(&init)?;
            scope.call_if_defined(&name, &args)?;
        }

        for (attr_name, attr_value) in node.attrs() {
            let Some(name) = attr_name.strip_prefix('@') else {
                continue;
            };

            if let Some(target) = name.strip_prefix(':') {
                if !target.is_empty() {
                    let element = node.clone();
                    let target = target.to_string();
                    let value = attr_value.clone();
                    let scope = scope.clone();
                    watch(move || {
                        element.set_attr(&target, &interpolate(&value, &scope));
                        Ok(())
                    })?;
                }
                continue;
            }

            let Some(handler) = self.directives.resolve(name) else {
                continue;
            };
            debug!(directive = name, tag = %node.tag(), "dispatch");
            handler(&DirectiveContext {
                element: node.clone(),
                value: attr_value,
                scope: scope.clone(),
                scopes: frames.clone(),
                root: self.data.clone(),
                directives: self.directives.clone(),
                components: self.components.clone(),
            })?;
        }
        Ok(())
    }

    fn compose(&self, frames: &Frames) -> ScopedView {
        compose_scopes(self.data.iter().cloned().chain(frames.iter().cloned()))
    }
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("frames", &self.data.len())
            .field("directives", &self.directives)
            .field("components", &self.components)
            .finish()
    }
}

fn self_helpers(node: &NodeRef) -> Value {
    let select = {
        let node = node.clone();
        Value::func(move |_scope, args| {
            let selector = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(node.query(selector).map(Value::Node).unwrap_or(Value::Null))
        })
    };
    let select_all = {
        let node = node.clone();
        Value::func(move |_scope, args| {
            let selector = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Value::list(node.query_all(selector).into_iter().map(Value::Node)))
        })
    };
    Value::object([
        ("$element", Value::Node(node.clone())),
        ("$el", Value::Node(node.clone())),
        ("$select", select.clone()),
        ("$sel", select),
        ("$selectAll", select_all.clone()),
        ("$selAll", select_all),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_errors_on_a_missing_selector() {
        let document = NodeRef::element("body");
        let err = Walker::mount(&document, "#app").unwrap_err();
        assert!(matches!(err, EngineError::MissingRoot(_)));
    }

    #[test]
    fn walker_debug_names_the_root() {
        let walker = Walker::new(NodeRef::element("main"))
            .data([Value::object([("n", Value::from(1.0))])]);
        let rendered = format!("{walker:?}");
        assert!(rendered.contains("\"main\""));
        assert!(rendered.contains("frames: 1"));
    }

    #[test]
    fn data_frames_shadow_by_nesting_depth() {
        let outer = NodeRef::element("div")
            .with_attr("@data", "{isOverridden: false, isInherited: true}");
        let inner = NodeRef::element("div").with_attr("@data", "{isOverridden: true}");
        let leaf = NodeRef::element("span").with_attr(
            "@text",
            "{isOverridden} {isInherited} {root}",
        );
        inner.append_child(&leaf);
        outer.append_child(&inner);
        let root = NodeRef::element("main").with_child(outer);

        Walker::new(root)
            .data([Value::object([("root", Value::from(true))])])
            .walk()
            .unwrap();

        assert_eq!(leaf.text_content(), "true true true");
    }

    #[test]
    fn init_runs_once_and_tolerates_missing_handlers() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let calls_inner = calls.clone();
        let state = observe(Value::object([
            ("n", Value::from(0.0)),
            (
                "setup",
                Value::func(move |scope, _args| {
                    scope.get("n");
                    calls_inner.set(calls_inner.get() + 1);
                    Ok(Value::Null)
                }),
            ),
        ]));

        let root = NodeRef::element("div")
            .with_child(NodeRef::element("p").with_attr("@init", "setup()"))
            .with_child(NodeRef::element("p").with_attr("@init", "absent()"));
        Walker::new(root).data([state.clone()]).walk().unwrap();
        assert_eq!(calls.get(), 1);

        // Not reactive: a later write must not re-run the statement.
        compose_scopes([state]).set("n", Value::from(9.0)).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn colon_attributes_bind_reactively() {
        let state = observe(Value::object([("theme", Value::from("dark"))]));
        let node = NodeRef::element("div").with_attr("@:class", "panel {theme}");
        let root = NodeRef::element("main").with_child(node.clone());
        Walker::new(root).data([state.clone()]).walk().unwrap();

        assert_eq!(node.attr("class").as_deref(), Some("panel dark"));
        compose_scopes([state]).set("theme", Value::from("light")).unwrap();
        assert_eq!(node.attr("class").as_deref(), Some("panel light"));
    }

    #[test]
    fn self_helpers_expose_element_and_queries() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_inner = seen.clone();
        let state = observe(Value::object([(
            "probe",
            Value::func(move |scope, _args| {
                let element = scope.get("$el").unwrap();
                let hit = scope.call("$select", &[Value::from("span")])?;
                seen_inner.borrow_mut().push((element, hit));
                Ok(Value::Null)
            }),
        )]));

        let target = NodeRef::element("span");
        let node = NodeRef::element("div")
            .with_attr("@init", "probe()")
            .with_child(target.clone());
        let root = NodeRef::element("main").with_child(node.clone());
        Walker::new(root).data([state]).walk().unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        let (element, hit) = &seen[0];
        assert_eq!(*element, Value::Node(node.clone()));
        assert_eq!(*hit, Value::Node(target.clone()));
    }
}
