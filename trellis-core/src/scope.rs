//! Scope Chain Resolver
//!
//! A node's lexical environment is an ordered list of frames: root state,
//! inherited ancestor frames, the node's self-helpers, its `@data` object,
//! and any synthetic frames a structural directive injected (loop variable,
//! index, event object). [`compose_scopes`] flattens such a list into one
//! virtual lookup surface.
//!
//! # Resolution rules
//!
//! - **Read**: scan innermost (last pushed) to outermost; the first frame
//!   that defines the key wins, so inner frames shadow outer ones.
//! - **Write**: scan innermost to outermost; mutate the first frame where
//!   the key is *currently defined*. A write whose key no frame declares is
//!   dropped (declare-before-assign, pinned by test). This is what lets a
//!   two-way binding deep inside a
//!   loop mutate the ancestor frame that actually owns the property instead
//!   of a local shadow.
//!
//! Frames are shared by reference: pushing a frame for a child never
//! copies, and never mutates a sibling's chain. Reactive frames keep their
//! reactivity, since the view always goes through the frame's own get/set:
//! reads through the view track, and writes through the view trigger.

use smallvec::SmallVec;

use crate::error::Result;
use crate::value::Value;

/// One node's frame list, outermost first.
pub type Frames = SmallVec<[Value; 8]>;

/// Compose an ordered frame list into one resolved scope.
pub fn compose_scopes<I>(frames: I) -> ScopedView
where
    I: IntoIterator<Item = Value>,
{
    ScopedView {
        frames: frames.into_iter().collect(),
    }
}

/// A virtual lookup surface over a chain of scope frames.
#[derive(Clone)]
pub struct ScopedView {
    frames: Frames,
}

impl ScopedView {
    /// Resolve `key`, innermost frame first.
    ///
    /// Non-object frames are skipped. Observed frames that lack the key
    /// still track it, so computations re-run when a nearer frame gains
    /// the binding's owner. Returns `None` when no frame defines the key.
    pub fn get(&self, key: &str) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            if let Value::Object(cell) = frame {
                if let Some(value) = cell.get(key) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Write `key` into the innermost frame that currently defines it.
    ///
    /// Returns `Ok(false)` when no frame defines the key: the write is
    /// dropped and no frame is mutated.
    pub fn set(&self, key: &str, value: Value) -> Result<bool> {
        for frame in self.frames.iter().rev() {
            if let Value::Object(cell) = frame {
                if cell.contains(key) {
                    cell.set(key, value)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Resolve a dotted path (`user.address.city`) through the chain.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get(first)?;
        for segment in segments {
            current = current.get_key(segment)?;
        }
        Some(current)
    }

    /// Call the function bound to `name`, with this scope as receiver.
    ///
    /// An unbound name is an error; use [`ScopedView::call_if_defined`]
    /// where a missing handler is an expected case.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        match self.get(name) {
            Some(Value::Func(f)) => f(self, args),
            _ => Err(crate::error::EngineError::NotCallable(name.to_string())),
        }
    }

    /// Call the function bound to `name` if one exists; silently skip
    /// otherwise. A binding that exists but is not callable is an error.
    pub fn call_if_defined(&self, name: &str, args: &[Value]) -> Result<Option<Value>> {
        match self.get(name) {
            Some(Value::Func(f)) => f(self, args).map(Some),
            Some(_) => Err(crate::error::EngineError::NotCallable(name.to_string())),
            None => Ok(None),
        }
    }

    /// The composed frames, outermost first.
    pub fn frames(&self) -> &Frames {
        &self.frames
    }
}

impl std::fmt::Debug for ScopedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedView")
            .field("frames", &self.frames.len())
            .finish()
    }
}
