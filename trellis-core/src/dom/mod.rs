//! DOM Platform Layer
//!
//! A minimal live tree standing in for the browser DOM: elements with
//! ordered attributes, text nodes, template content fragments, simple
//! selector queries and synchronous event dispatch. The walker and the
//! directives are written against this surface; embedding the engine
//! against another tree means reimplementing [`NodeRef`]'s contract.
//!
//! DOM nodes are the only shared mutable resource in the system. All
//! mutation happens on the single execution thread, inside a directive's
//! handler body or a triggered re-run, so handlers must leave the tree
//! consistent before returning, because a reentrant write can run another
//! handler before the first returns.

mod node;

pub use node::{Listener, NodeKind, NodeRef};
