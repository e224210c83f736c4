//! Computations
//!
//! A `Computation` is a re-runnable procedure subscribed to the observed
//! cells it reads. It is the only consumer-facing reactive primitive:
//! directives, attribute binders and collaborators all install behavior by
//! registering computations through [`watch`].
//!
//! # Protocol
//!
//! 1. `watch(f)` wraps `f` in a computation, makes it the active computation
//!    and runs it once, synchronously. Every observed-cell read during that
//!    run registers the computation as a dependent of the key read.
//!
//! 2. A later write that changes one of those keys re-runs the computation
//!    synchronously, before the write returns. Re-runs execute outside the
//!    tracking context, so the dependency set stays what the registration
//!    run recorded.
//!
//! 3. There is no disposal primitive. A computation stays subscribed for as
//!    long as the cells that reference it are alive; dropping the cells
//!    drops the subscription with them.
//!
//! The body must therefore be idempotent and safe to call repeatedly, and
//! it may fail: an error from the registration run propagates out of
//! `watch`, an error from a re-run propagates out of the triggering write.

use std::rc::Rc;

use crate::error::Result;

use super::context::ActivationGuard;

/// A zero-argument, fallible, re-runnable procedure.
pub struct Computation {
    body: Box<dyn Fn() -> Result<()>>,
}

impl Computation {
    /// Wrap a closure without running it.
    pub fn new<F>(body: F) -> Rc<Self>
    where
        F: Fn() -> Result<()> + 'static,
    {
        Rc::new(Self {
            body: Box::new(body),
        })
    }

    /// Execute the body once.
    ///
    /// Does not establish a tracking context; callers that want tracking
    /// wrap the call in an [`ActivationGuard`].
    pub fn run(&self) -> Result<()> {
        (self.body)()
    }
}

impl std::fmt::Debug for Computation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computation")
            .field("at", &(self as *const Self))
            .finish()
    }
}

/// Register a computation: run `body` once, immediately and synchronously,
/// recording every observed-cell key it reads as a dependency.
///
/// Returns the computation handle. Callers may drop it; the cells it read
/// keep it alive for re-runs.
pub fn watch<F>(body: F) -> Result<Rc<Computation>>
where
    F: Fn() -> Result<()> + 'static,
{
    let computation = Computation::new(body);
    let guard = ActivationGuard::enter(computation.clone());
    let outcome = computation.run();
    drop(guard);
    outcome?;
    Ok(computation)
}
