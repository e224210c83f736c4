//! Trellis Core
//!
//! This crate provides the core runtime for the Trellis reactive UI engine.
//! It implements:
//!
//! - A fine-grained reactive signal system (observable cells, watchers,
//!   automatic dependency tracking)
//! - A chained-scope resolver with shadowing reads and write-through
//!   assignment
//! - A directive-driven tree walker that binds live behavior to elements
//!   from the attributes they carry
//! - The built-in directive vocabulary: text binding, conditionals, loops,
//!   ranges, two-way form binding, event wiring and sub-component mounting
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: observable cells, the watch primitive and dependency maps
//! - `scope`: frame chains and the composed scope view
//! - `eval`: the attribute-value expression micro-language
//! - `dom`: the element tree directives render into
//! - `walker`: document-order traversal and directive dispatch
//! - `directives`: the built-in vocabulary and the extension registry
//! - `component`: the boundary contract for mountable sub-components
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{observe, NodeRef, Value, Walker};
//!
//! let state = observe(Value::object([("name", Value::from("Ada"))]));
//!
//! let heading = NodeRef::element("h1").with_attr("@text", "Hello {name}");
//! let root = NodeRef::element("div").with_child(heading.clone());
//!
//! Walker::new(root).data([state.clone()]).walk().unwrap();
//! assert_eq!(heading.text_content(), "Hello Ada");
//!
//! // A changed write re-renders without another walk.
//! let Value::Object(cell) = state else { unreachable!() };
//! cell.set("name", Value::from("Grace")).unwrap();
//! assert_eq!(heading.text_content(), "Hello Grace");
//! ```

pub mod component;
pub mod directives;
pub mod dom;
pub mod error;
pub mod eval;
pub mod reactive;
pub mod scope;
pub mod value;
pub mod walker;

pub use component::{Component, ComponentFactory, ComponentRegistry};
pub use directives::{DirectiveContext, DirectiveHandler, DirectiveRegistry};
pub use dom::{NodeKind, NodeRef};
pub use error::{EngineError, Result};
pub use reactive::{observe, watch};
pub use scope::{compose_scopes, Frames, ScopedView};
pub use value::Value;
pub use walker::Walker;
