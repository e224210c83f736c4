//! Reactive Context
//!
//! The context tracks which computation is currently running. This enables
//! automatic dependency tracking: when an observed cell is read, the cell
//! registers the current computation as a dependent of the key it served.
//!
//! # Implementation
//!
//! A thread-local slot holds the active computation. At most one computation
//! is active at any instant; entering a context while another is active
//! saves the previous one and restores it on drop, so a directive that walks
//! a freshly produced fragment (which registers its own computations) does
//! not corrupt the outer registration.
//!
//! Dependencies are recorded only while a computation is active. Triggered
//! re-runs execute outside any context, so a computation's dependency set is
//! the set of keys it read while registering.

use std::cell::RefCell;
use std::rc::Rc;

use super::effect::Computation;

thread_local! {
    static ACTIVE: RefCell<Option<Rc<Computation>>> = const { RefCell::new(None) };
}

/// Guard that restores the previously active computation when dropped,
/// even if the computation body returns early with `?`.
pub struct ActivationGuard {
    previous: Option<Rc<Computation>>,
}

impl ActivationGuard {
    /// Make `computation` the active computation until the guard drops.
    pub fn enter(computation: Rc<Computation>) -> Self {
        let previous = ACTIVE.with(|slot| slot.borrow_mut().replace(computation));
        Self { previous }
    }
}

impl Drop for ActivationGuard {
    fn drop(&mut self) {
        ACTIVE.with(|slot| {
            *slot.borrow_mut() = self.previous.take();
        });
    }
}

/// The currently active computation, if any.
pub fn active_computation() -> Option<Rc<Computation>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Whether dependency tracking is currently in effect.
pub fn is_tracking() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Rc<Computation> {
        Computation::new(|| Ok(()))
    }

    #[test]
    fn context_tracks_active_computation() {
        assert!(!is_tracking());
        assert!(active_computation().is_none());

        let comp = noop();
        {
            let _guard = ActivationGuard::enter(comp.clone());
            assert!(is_tracking());
            assert!(Rc::ptr_eq(&active_computation().unwrap(), &comp));
        }

        assert!(!is_tracking());
        assert!(active_computation().is_none());
    }

    #[test]
    fn nested_contexts_restore_previous() {
        let outer = noop();
        let inner = noop();

        let _outer_guard = ActivationGuard::enter(outer.clone());
        {
            let _inner_guard = ActivationGuard::enter(inner.clone());
            assert!(Rc::ptr_eq(&active_computation().unwrap(), &inner));
        }
        assert!(Rc::ptr_eq(&active_computation().unwrap(), &outer));
    }
}
