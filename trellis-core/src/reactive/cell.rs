//! Observable Cells
//!
//! The signal graph wraps plain data in *observable cells*: containers that
//! own both their entries and the dependency map recording who read them.
//! This is the explicit-cell rendition of transparent proxying: property
//! access goes through `get`/`set` methods instead of language-level
//! interception, with identical semantics.
//!
//! - Reads of an observed cell record the active computation as a dependent
//!   of the key read, whether or not the key exists yet.
//! - Reads that return a nested object, list or DOM node mark the child
//!   observed, so observation is structurally deep without eager wrapping.
//! - Writes always land; dependents re-run only when the value actually
//!   changed (primitives by value, containers and nodes by identity).
//!
//! Cells that never pass through [`observe`] stay inert: plain lookup
//! tables (directive registries, helper frames) use the same types without
//! paying for tracking.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;
use crate::value::Value;

use super::deps::DepMap;

/// Shared handle to an object cell.
pub type ObjRef = Rc<ObjCell>;

/// Shared handle to a list cell.
pub type ListRef = Rc<ListCell>;

/// A keyed observable cell. Entry order is insertion order.
#[derive(Default)]
pub struct ObjCell {
    entries: RefCell<IndexMap<String, Value>>,
    deps: DepMap,
    observed: Cell<bool>,
}

impl ObjCell {
    pub fn new() -> ObjRef {
        Rc::new(Self::default())
    }

    /// Build a cell from key/value pairs, preserving order.
    pub fn from_pairs<K, I>(pairs: I) -> ObjRef
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let cell = Self::default();
        {
            let mut entries = cell.entries.borrow_mut();
            for (key, value) in pairs {
                entries.insert(key.into(), value);
            }
        }
        Rc::new(cell)
    }

    /// Read `key`, tracking the active computation when observed.
    ///
    /// Tracking happens even when the key is absent, so a computation that
    /// probed a frame for a key it did not find still re-runs if that frame
    /// is the one that changes.
    pub fn get(&self, key: &str) -> Option<Value> {
        if self.observed.get() {
            self.deps.track(key);
        }
        let value = self.entries.borrow().get(key).cloned();
        if self.observed.get() {
            if let Some(child) = &value {
                mark_observed(child);
            }
        }
        value
    }

    /// Write `key`, re-running dependents when the value changed.
    pub fn set(&self, key: &str, value: Value) -> Result<()> {
        let changed = {
            let mut entries = self.entries.borrow_mut();
            let changed = entries.get(key) != Some(&value);
            entries.insert(key.to_string(), value);
            changed
        };
        if changed && self.observed.get() {
            self.deps.trigger(key)?;
        }
        Ok(())
    }

    /// Insert without notifying. Used while assembling frames and state
    /// before they become live.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries.borrow_mut().insert(key.into(), value);
    }

    /// Whether `key` currently has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Snapshot of the keys in entry order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn is_observed(&self) -> bool {
        self.observed.get()
    }

    pub(crate) fn mark_observed(&self) {
        self.observed.set(true);
    }

    #[cfg(test)]
    pub(crate) fn dependent_count(&self, key: &str) -> usize {
        self.deps.dependent_count(key)
    }
}

impl std::fmt::Debug for ObjCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjCell")
            .field("entries", &*self.entries.borrow())
            .field("observed", &self.observed.get())
            .finish()
    }
}

/// An indexed observable cell.
///
/// Indices track under their decimal string form and the length tracks
/// under `"length"`, mirroring how the keyed cell is addressed.
#[derive(Default)]
pub struct ListCell {
    items: RefCell<Vec<Value>>,
    deps: DepMap,
    observed: Cell<bool>,
}

impl ListCell {
    pub fn new() -> ListRef {
        Rc::new(Self::default())
    }

    pub fn from_items<I: IntoIterator<Item = Value>>(items: I) -> ListRef {
        Rc::new(Self {
            items: RefCell::new(items.into_iter().collect()),
            ..Self::default()
        })
    }

    /// Read one index, tracking when observed.
    pub fn get(&self, index: usize) -> Option<Value> {
        if self.observed.get() {
            self.deps.track(&index.to_string());
        }
        let value = self.items.borrow().get(index).cloned();
        if self.observed.get() {
            if let Some(child) = &value {
                mark_observed(child);
            }
        }
        value
    }

    /// Current length, tracked under `"length"` when observed.
    pub fn len(&self) -> usize {
        if self.observed.get() {
            self.deps.track("length");
        }
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot every item, tracking length and each index when observed.
    pub fn items(&self) -> Vec<Value> {
        let len = self.len();
        (0..len).filter_map(|index| self.get(index)).collect()
    }

    /// Overwrite one index, re-running its dependents when changed.
    pub fn set(&self, index: usize, value: Value) -> Result<()> {
        let changed = {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return Ok(());
            }
            let changed = items[index] != value;
            items[index] = value;
            changed
        };
        if changed && self.observed.get() {
            self.deps.trigger(&index.to_string())?;
        }
        Ok(())
    }

    /// Append an item, re-running dependents of the length.
    pub fn push(&self, value: Value) -> Result<()> {
        self.items.borrow_mut().push(value);
        if self.observed.get() {
            self.deps.trigger("length")?;
        }
        Ok(())
    }

    /// Remove an item, re-running dependents of the length.
    pub fn remove(&self, index: usize) -> Result<()> {
        {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return Ok(());
            }
            items.remove(index);
        }
        if self.observed.get() {
            self.deps.trigger("length")?;
        }
        Ok(())
    }

    pub fn is_observed(&self) -> bool {
        self.observed.get()
    }

    pub(crate) fn mark_observed(&self) {
        self.observed.set(true);
    }
}

impl std::fmt::Debug for ListCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCell")
            .field("items", &*self.items.borrow())
            .field("observed", &self.observed.get())
            .finish()
    }
}

/// Make `value` reactive.
///
/// Objects, lists and DOM nodes start tracking readers and notifying
/// writers; everything else is returned unchanged. Observation is
/// idempotent (re-observing an observed value does not stack trackers)
/// and lazily deep: children become observed the first time they are read
/// through an observed parent.
pub fn observe(value: Value) -> Value {
    mark_observed(&value);
    value
}

fn mark_observed(value: &Value) {
    match value {
        Value::Object(cell) => cell.mark_observed(),
        Value::List(cell) => cell.mark_observed(),
        Value::Node(node) => node.mark_observed(),
        _ => {}
    }
}
