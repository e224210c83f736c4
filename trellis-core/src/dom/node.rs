//! Node Implementation
//!
//! Element and text nodes sharing one allocation-per-node design: a
//! `NodeRef` is a cheap `Rc` handle, parents hold children strongly and
//! children point back through `Weak`, so detached subtrees are collected
//! when the last handle drops.
//!
//! A node carries everything the walker and the directives need to hang off
//! of it: the attribute map (insertion-ordered, since directive dispatch
//! order is attribute declaration order), a property map of dynamic
//! [`Value`]s,
//! event listeners, the scope-frame list the walker attached, template
//! content (kept out of the child list so traversal never descends into
//! it), and the produced-by backlink structural directives use for
//! tag-and-sweep ownership.
//!
//! Nodes also participate in the signal graph: each node owns a dependency
//! map, and once observed, property reads and writes are tracked and
//! triggered exactly like plain data. The storage is the live node itself,
//! never a detached copy.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::error::Result;
use crate::reactive::DepMap;
use crate::scope::Frames;
use crate::value::Value;

/// Callback invoked when an event is dispatched on a node.
pub type Listener = Rc<dyn Fn(Value) -> Result<()>>;

/// What kind of node this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

struct NodeData {
    kind: NodeKind,
    /// Lowercase tag name; empty for text nodes.
    tag: String,
    /// Character data; only meaningful for text nodes.
    text: RefCell<String>,
    attrs: RefCell<IndexMap<String, String>>,
    props: RefCell<IndexMap<String, Value>>,
    children: RefCell<Vec<NodeRef>>,
    /// Template content. Held apart from `children` like the platform's
    /// inert template fragment.
    content: RefCell<Vec<NodeRef>>,
    parent: RefCell<Weak<NodeData>>,
    listeners: RefCell<Vec<(String, Listener)>>,
    /// Scope frames attached by the walker, inherited by descendants.
    scopes: RefCell<Frames>,
    /// Back-reference to the template that generated this node.
    produced_by: RefCell<Option<Weak<NodeData>>>,
    deps: DepMap,
    observed: Cell<bool>,
}

/// Shared handle to a DOM node.
#[derive(Clone)]
pub struct NodeRef(Rc<NodeData>);

impl NodeRef {
    fn from_data(kind: NodeKind, tag: &str, text: &str) -> Self {
        Self(Rc::new(NodeData {
            kind,
            tag: tag.to_ascii_lowercase(),
            text: RefCell::new(text.to_string()),
            attrs: RefCell::new(IndexMap::new()),
            props: RefCell::new(IndexMap::new()),
            children: RefCell::new(Vec::new()),
            content: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
            scopes: RefCell::new(Frames::new()),
            produced_by: RefCell::new(None),
            deps: DepMap::new(),
            observed: Cell::new(false),
        }))
    }

    /// Create a detached element.
    pub fn element(tag: &str) -> Self {
        Self::from_data(NodeKind::Element, tag, "")
    }

    /// Create a detached text node.
    pub fn text(content: &str) -> Self {
        Self::from_data(NodeKind::Text, "", content)
    }

    /// Create a `<template>` element. Its children live in its content
    /// fragment, not in the tree the walker traverses.
    pub fn template() -> Self {
        Self::element("template")
    }

    // ------------------------------------------------------------------
    // Identity & classification
    // ------------------------------------------------------------------

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind(&self) -> NodeKind {
        self.0.kind
    }

    pub fn is_element(&self) -> bool {
        self.0.kind == NodeKind::Element
    }

    pub fn is_template(&self) -> bool {
        self.0.tag == "template"
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.attrs.borrow().get(name).cloned()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        self.0
            .attrs
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
    }

    /// Attribute snapshot in declaration order. Taken before directive
    /// dispatch so handlers may freely add attributes mid-walk.
    pub fn attrs(&self) -> Vec<(String, String)> {
        self.0
            .attrs
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Builder-style attribute set, for assembling trees in tests and
    /// component templates.
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    // ------------------------------------------------------------------
    // Properties (tracked once observed)
    // ------------------------------------------------------------------

    /// Read a live property, tracking the active computation when this
    /// node is observed.
    pub fn prop(&self, name: &str) -> Option<Value> {
        if self.0.observed.get() {
            self.0.deps.track(name);
        }
        self.0.props.borrow().get(name).cloned()
    }

    /// Write a live property directly on the node, re-running dependents
    /// when the value changed.
    pub fn set_prop(&self, name: &str, value: Value) -> Result<()> {
        let changed = {
            let mut props = self.0.props.borrow_mut();
            let changed = props.get(name) != Some(&value);
            props.insert(name.to_string(), value);
            changed
        };
        if changed && self.0.observed.get() {
            self.0.deps.trigger(name)?;
        }
        Ok(())
    }

    /// Property view used by path resolution: live properties first, then
    /// the synthesized `textContent`, then attributes as strings.
    pub fn get_key(&self, key: &str) -> Option<Value> {
        if self.0.observed.get() {
            self.0.deps.track(key);
        }
        if let Some(value) = self.0.props.borrow().get(key).cloned() {
            return Some(value);
        }
        if key == "textContent" {
            return Some(Value::Str(self.text_content()));
        }
        self.0.attrs.borrow().get(key).cloned().map(Value::Str)
    }

    pub(crate) fn mark_observed(&self) {
        self.0.observed.set(true);
    }

    pub fn is_observed(&self) -> bool {
        self.0.observed.get()
    }

    // ------------------------------------------------------------------
    // Tree structure
    // ------------------------------------------------------------------

    pub fn parent(&self) -> Option<NodeRef> {
        self.0.parent.borrow().upgrade().map(NodeRef)
    }

    pub fn children(&self) -> Vec<NodeRef> {
        self.0.children.borrow().clone()
    }

    pub fn first_element_child(&self) -> Option<NodeRef> {
        self.0
            .children
            .borrow()
            .iter()
            .find(|child| child.is_element())
            .cloned()
    }

    /// Append `child`, detaching it from any previous parent first.
    pub fn append_child(&self, child: &NodeRef) {
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Builder-style child append.
    pub fn with_child(self, child: NodeRef) -> Self {
        self.append_child(&child);
        self
    }

    /// Remove this node from its parent, if attached.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .children
                .borrow_mut()
                .retain(|sibling| !sibling.ptr_eq(self));
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    /// Remove and return all children, detached.
    pub fn take_children(&self) -> Vec<NodeRef> {
        let children: Vec<NodeRef> = std::mem::take(&mut *self.0.children.borrow_mut());
        for child in &children {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        children
    }

    /// Replace all children with `nodes`.
    pub fn replace_children<I: IntoIterator<Item = NodeRef>>(&self, nodes: I) {
        self.take_children();
        for node in nodes {
            self.append_child(&node);
        }
    }

    /// Drop every child failing the predicate, detaching the removed ones.
    pub fn retain_children<F: Fn(&NodeRef) -> bool>(&self, keep: F) {
        let removed: Vec<NodeRef> = {
            let mut children = self.0.children.borrow_mut();
            let (kept, removed): (Vec<NodeRef>, Vec<NodeRef>) =
                children.drain(..).partition(|child| keep(child));
            *children = kept;
            removed
        };
        for child in removed {
            *child.0.parent.borrow_mut() = Weak::new();
        }
    }

    /// Replace this node in its parent's child list with `nodes`.
    pub fn replace_with<I: IntoIterator<Item = NodeRef>>(&self, nodes: I) {
        let Some(parent) = self.parent() else { return };
        let index = {
            let children = parent.0.children.borrow();
            children.iter().position(|child| child.ptr_eq(self))
        };
        let Some(index) = index else { return };
        {
            let mut children = parent.0.children.borrow_mut();
            children.remove(index);
        }
        *self.0.parent.borrow_mut() = Weak::new();
        let mut at = index;
        for node in nodes {
            node.detach();
            *node.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
            parent.0.children.borrow_mut().insert(at, node);
            at += 1;
        }
    }

    // ------------------------------------------------------------------
    // Template content
    // ------------------------------------------------------------------

    pub fn content_children(&self) -> Vec<NodeRef> {
        self.0.content.borrow().clone()
    }

    pub fn append_content(&self, child: &NodeRef) {
        child.detach();
        self.0.content.borrow_mut().push(child.clone());
    }

    /// Builder-style content append.
    pub fn with_content(self, child: NodeRef) -> Self {
        self.append_content(&child);
        self
    }

    /// First element inside the content fragment, the clone root for
    /// structural directives.
    pub fn first_content_element(&self) -> Option<NodeRef> {
        self.0
            .content
            .borrow()
            .iter()
            .find(|child| child.is_element())
            .cloned()
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    /// Concatenated character data of this subtree.
    pub fn text_content(&self) -> String {
        match self.0.kind {
            NodeKind::Text => self.0.text.borrow().clone(),
            NodeKind::Element => {
                let mut out = String::new();
                for child in self.0.children.borrow().iter() {
                    out.push_str(&child.text_content());
                }
                out
            }
        }
    }

    /// Replace the subtree with a single text node.
    pub fn set_text_content(&self, text: &str) {
        match self.0.kind {
            NodeKind::Text => *self.0.text.borrow_mut() = text.to_string(),
            NodeKind::Element => {
                self.replace_children([NodeRef::text(text)]);
            }
        }
    }

    // ------------------------------------------------------------------
    // Cloning
    // ------------------------------------------------------------------

    /// Deep-clone this subtree: kind, tag, text, attributes, properties,
    /// children and template content. Listeners, scopes, observation state
    /// and produced-by tags are not cloned.
    pub fn clone_subtree(&self) -> NodeRef {
        let copy = Self::from_data(self.0.kind, &self.0.tag, &self.0.text.borrow());
        *copy.0.attrs.borrow_mut() = self.0.attrs.borrow().clone();
        *copy.0.props.borrow_mut() = self.0.props.borrow().clone();
        for child in self.0.children.borrow().iter() {
            copy.append_child(&child.clone_subtree());
        }
        for child in self.0.content.borrow().iter() {
            copy.append_content(&child.clone_subtree());
        }
        copy
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether this node matches a simple selector: `tag`, `#id` or
    /// `.class`.
    pub fn matches(&self, selector: &str) -> bool {
        if !self.is_element() {
            return false;
        }
        if let Some(id) = selector.strip_prefix('#') {
            return self.attr("id").as_deref() == Some(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self
                .attr("class")
                .map(|classes| classes.split_whitespace().any(|c| c == class))
                .unwrap_or(false);
        }
        self.0.tag == selector.to_ascii_lowercase()
    }

    /// First descendant (document order, self excluded) matching the
    /// selector.
    pub fn query(&self, selector: &str) -> Option<NodeRef> {
        for child in self.0.children.borrow().iter() {
            if child.matches(selector) {
                return Some(child.clone());
            }
            if let Some(found) = child.query(selector) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant matching the selector, in document order.
    pub fn query_all(&self, selector: &str) -> Vec<NodeRef> {
        let mut found = Vec::new();
        self.collect_matches(selector, &mut found);
        found
    }

    fn collect_matches(&self, selector: &str, found: &mut Vec<NodeRef>) {
        for child in self.0.children.borrow().iter() {
            if child.matches(selector) {
                found.push(child.clone());
            }
            child.collect_matches(selector, found);
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn add_listener<F>(&self, event: &str, listener: F)
    where
        F: Fn(Value) -> Result<()> + 'static,
    {
        self.0
            .listeners
            .borrow_mut()
            .push((event.to_string(), Rc::new(listener)));
    }

    /// Synchronously run every listener registered for `event`, in
    /// registration order. The payload becomes the handler's event object.
    pub fn dispatch(&self, event: &str, payload: Value) -> Result<()> {
        let snapshot: Vec<Listener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(payload.clone())?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Walker bookkeeping
    // ------------------------------------------------------------------

    pub fn scopes(&self) -> Frames {
        self.0.scopes.borrow().clone()
    }

    pub fn set_scopes(&self, frames: Frames) {
        *self.0.scopes.borrow_mut() = frames;
    }

    /// Tag this node as produced by `template` (tag-and-sweep ownership).
    pub fn set_produced_by(&self, template: &NodeRef) {
        *self.0.produced_by.borrow_mut() = Some(Rc::downgrade(&template.0));
    }

    /// Whether this node was produced by exactly `template`.
    pub fn produced_by_is(&self, template: &NodeRef) -> bool {
        self.0
            .produced_by
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|owner| Rc::ptr_eq(&owner, &template.0))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Rendering (debug/test aid)
    // ------------------------------------------------------------------

    /// Serialize the subtree as HTML-ish markup. Template content is not
    /// rendered, matching the platform's inert fragment.
    pub fn to_html(&self) -> String {
        match self.0.kind {
            NodeKind::Text => self.0.text.borrow().clone(),
            NodeKind::Element => {
                let mut out = String::new();
                out.push('<');
                out.push_str(&self.0.tag);
                for (name, value) in self.0.attrs.borrow().iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
                out.push('>');
                for child in self.0.children.borrow().iter() {
                    out.push_str(&child.to_html());
                }
                out.push_str("</");
                out.push_str(&self.0.tag);
                out.push('>');
                out
            }
        }
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.kind {
            NodeKind::Text => write!(f, "Text({:?})", self.0.text.borrow()),
            NodeKind::Element => f
                .debug_struct("Element")
                .field("tag", &self.0.tag)
                .field("children", &self.0.children.borrow().len())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_rewires_parent_links() {
        let parent = NodeRef::element("div");
        let child = NodeRef::element("span");
        parent.append_child(&child);

        assert!(child.parent().unwrap().ptr_eq(&parent));
        assert_eq!(parent.children().len(), 1);

        let other = NodeRef::element("section");
        other.append_child(&child);
        assert!(child.parent().unwrap().ptr_eq(&other));
        assert!(parent.children().is_empty());
    }

    #[test]
    fn text_content_concatenates_subtree() {
        let root = NodeRef::element("div")
            .with_child(NodeRef::text("Hello "))
            .with_child(NodeRef::element("b").with_child(NodeRef::text("world")));
        assert_eq!(root.text_content(), "Hello world");

        root.set_text_content("replaced");
        assert_eq!(root.text_content(), "replaced");
        assert_eq!(root.children().len(), 1);
    }

    #[test]
    fn queries_match_tag_id_and_class() {
        let target = NodeRef::element("span")
            .with_attr("id", "hit")
            .with_attr("class", "a b");
        let root = NodeRef::element("div")
            .with_child(NodeRef::element("span"))
            .with_child(NodeRef::element("p").with_child(target.clone()));

        assert!(root.query("#hit").unwrap().ptr_eq(&target));
        assert!(root.query(".b").unwrap().ptr_eq(&target));
        assert_eq!(root.query_all("span").len(), 2);
        assert!(root.query("#miss").is_none());
    }

    #[test]
    fn template_content_is_not_walked_by_queries() {
        let template = NodeRef::template()
            .with_content(NodeRef::element("li").with_attr("id", "inside"));
        let root = NodeRef::element("ul").with_child(template);
        assert!(root.query("#inside").is_none());
    }

    #[test]
    fn clone_subtree_is_deep_and_detached() {
        let original = NodeRef::element("li")
            .with_attr("@text", "{x}")
            .with_child(NodeRef::text("item"));
        let copy = original.clone_subtree();

        assert!(!copy.ptr_eq(&original));
        assert_eq!(copy.attr("@text").as_deref(), Some("{x}"));
        assert_eq!(copy.text_content(), "item");
        assert!(copy.parent().is_none());

        copy.set_attr("@text", "changed");
        assert_eq!(original.attr("@text").as_deref(), Some("{x}"));
    }

    #[test]
    fn dispatch_runs_listeners_in_order() {
        let node = NodeRef::element("button");
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["a", "b"] {
            let order = order.clone();
            node.add_listener("click", move |_| {
                order.borrow_mut().push(label);
                Ok(())
            });
        }
        node.add_listener("keydown", |_| panic!("wrong event"));

        node.dispatch("click", Value::Null).unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn observed_prop_write_reruns_reader() {
        use crate::reactive::watch;
        let node = NodeRef::element("input");
        node.mark_observed();
        node.set_prop("value", Value::from("start")).unwrap();

        let seen = Rc::new(RefCell::new(String::new()));
        let seen_inner = seen.clone();
        let node_inner = node.clone();
        watch(move || {
            if let Some(Value::Str(v)) = node_inner.prop("value") {
                *seen_inner.borrow_mut() = v;
            }
            Ok(())
        })
        .unwrap();

        node.set_prop("value", Value::from("typed")).unwrap();
        assert_eq!(&*seen.borrow(), "typed");
    }

    #[test]
    fn produced_by_tags_compare_by_template_identity() {
        let template_a = NodeRef::template();
        let template_b = NodeRef::template();
        let node = NodeRef::element("li");

        node.set_produced_by(&template_a);
        assert!(node.produced_by_is(&template_a));
        assert!(!node.produced_by_is(&template_b));
    }

    #[test]
    fn replace_with_splices_in_place() {
        let root = NodeRef::element("div")
            .with_child(NodeRef::element("a"))
            .with_child(NodeRef::element("slot"))
            .with_child(NodeRef::element("b"));
        let slot = root.query("slot").unwrap();

        slot.replace_with([NodeRef::element("x"), NodeRef::element("y")]);

        let tags: Vec<String> = root.children().iter().map(|c| c.tag().to_string()).collect();
        assert_eq!(tags, vec!["a", "x", "y", "b"]);
    }
}
