//! Dependency Maps
//!
//! Every observable cell (and every observed DOM node) owns a `DepMap`: a
//! mapping from property key to the computations that read that key while
//! registering. Embedding the map in the cell instead of a global registry
//! ties the lifetime of the tracking metadata to the lifetime of the cell
//! itself, so dead state does not pin dead subscriptions.
//!
//! # Guarantees
//!
//! - [`DepMap::track`] is a no-op when no computation is active, and creates
//!   per-key sets lazily; previously unseen keys never fail.
//! - A computation appears at most once per key, so a single write re-runs
//!   it exactly once.
//! - [`DepMap::trigger`] runs dependents in registration order, from a
//!   snapshot taken before the first dependent runs, so a dependent that
//!   registers further computations mid-run cannot grow the current pass.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::error::Result;

use super::context::active_computation;
use super::effect::Computation;

/// Per-key dependent sets for one observable cell.
#[derive(Default)]
pub struct DepMap {
    dependents: RefCell<HashMap<String, Vec<Rc<Computation>>>>,
}

impl DepMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the active computation as a dependent of `key`.
    ///
    /// No-op outside a tracking context.
    pub fn track(&self, key: &str) {
        let Some(current) = active_computation() else {
            return;
        };
        let mut dependents = self.dependents.borrow_mut();
        let entry = dependents.entry(key.to_string()).or_default();
        if !entry.iter().any(|known| Rc::ptr_eq(known, &current)) {
            trace!(key, "dependency recorded");
            entry.push(current);
        }
    }

    /// Synchronously re-run every computation registered for `key`.
    ///
    /// The first error aborts the pass and propagates to the writer.
    pub fn trigger(&self, key: &str) -> Result<()> {
        let snapshot: Vec<Rc<Computation>> = match self.dependents.borrow().get(key) {
            Some(entry) => entry.clone(),
            None => return Ok(()),
        };
        if !snapshot.is_empty() {
            trace!(key, dependents = snapshot.len(), "triggering");
        }
        for computation in snapshot {
            computation.run()?;
        }
        Ok(())
    }

    /// Number of computations registered for `key`.
    pub fn dependent_count(&self, key: &str) -> usize {
        self.dependents
            .borrow()
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for DepMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepMap")
            .field("keys", &self.dependents.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::context::ActivationGuard;
    use std::cell::Cell;

    #[test]
    fn track_outside_context_is_a_noop() {
        let deps = DepMap::new();
        deps.track("x");
        assert_eq!(deps.dependent_count("x"), 0);
    }

    #[test]
    fn track_registers_active_computation_once() {
        let deps = DepMap::new();
        let comp = Computation::new(|| Ok(()));

        let _guard = ActivationGuard::enter(comp.clone());
        deps.track("x");
        deps.track("x");
        deps.track("y");

        assert_eq!(deps.dependent_count("x"), 1);
        assert_eq!(deps.dependent_count("y"), 1);
    }

    #[test]
    fn trigger_runs_dependents_in_registration_order() {
        let deps = DepMap::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            let comp = Computation::new(move || {
                order.borrow_mut().push(label);
                Ok(())
            });
            let _guard = ActivationGuard::enter(comp);
            deps.track("x");
        }

        deps.trigger("x").unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn trigger_on_unseen_key_is_a_noop() {
        let deps = DepMap::new();
        deps.trigger("never").unwrap();
    }

    #[test]
    fn trigger_propagates_the_first_error() {
        let deps = DepMap::new();
        let ran_after_failure = Rc::new(Cell::new(false));

        let failing = Computation::new(|| {
            Err(crate::error::EngineError::NotCallable("boom".into()))
        });
        {
            let _guard = ActivationGuard::enter(failing);
            deps.track("x");
        }
        let flag = ran_after_failure.clone();
        let trailing = Computation::new(move || {
            flag.set(true);
            Ok(())
        });
        {
            let _guard = ActivationGuard::enter(trailing);
            deps.track("x");
        }

        assert!(deps.trigger("x").is_err());
        assert!(!ran_after_failure.get());
    }
}
