//! Reactive Signal System
//!
//! This module implements the signal graph: observable cells that record
//! which computation read which key, and re-run those computations when the
//! key is written with a changed value.
//!
//! # Concepts
//!
//! ## Observable cells
//!
//! [`ObjCell`] and [`ListCell`] wrap plain data. Reads through an observed
//! cell register the active computation as a dependent; writes compare old
//! and new value and notify dependents only on change. Nested containers
//! become observed lazily, the first time they are read through an observed
//! parent, so observation is structurally deep without eager wrapping.
//!
//! ## Computations
//!
//! A [`Computation`] is a re-runnable side effect. [`watch`] runs it once
//! immediately under a tracking context; afterwards every value-changing
//! write to a key it read re-runs it synchronously, before the write
//! returns.
//!
//! # Model
//!
//! Single-threaded and cooperative: one thread-local active computation, no
//! scheduler, no batching, no disposal. Dependency sets hold strong handles,
//! so a computation lives exactly as long as the cells that reference it.
//! Tracking metadata lives inside the cell, so it is collected with the
//! data it describes.

mod cell;
mod context;
mod deps;
mod effect;

pub use cell::{observe, ListCell, ListRef, ObjCell, ObjRef};
pub use context::{active_computation, is_tracking, ActivationGuard};
pub use deps::DepMap;
pub use effect::{watch, Computation};
