//! Error Types
//!
//! The engine distinguishes two failure classes:
//!
//! - Programmer errors (unknown component, missing mount root, malformed
//!   expressions, calling something that is not a function) are surfaced as
//!   `EngineError` and propagate synchronously to the caller of `walk()` or
//!   to the write that triggered a re-run.
//!
//! - Data-shape mismatches (a scope lookup that resolves nowhere, a write to
//!   a key no frame declares, a structural directive on a non-template
//!   element) are silent no-ops, because optional bindings are an expected,
//!   common case. Those paths never construct an `EngineError`.

use thiserror::Error;

/// Errors produced by the reactive core, the evaluator and the tree walker.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A `component` directive referenced a name missing from the merged
    /// component registry.
    #[error("component '{0}' is not defined")]
    UnknownComponent(String),

    /// A resolved component has no mount root to walk.
    #[error("property 'root' on component '{0}' is undefined")]
    ComponentRoot(String),

    /// `Walker::mount` found no element for the given selector.
    #[error("cannot mount, no element matches selector '{0}'")]
    MissingRoot(String),

    /// The literal/expression parser rejected its input.
    #[error("parse error at byte {at}: {message}")]
    Parse {
        /// Byte offset into the source string.
        at: usize,
        /// What the parser expected or found.
        message: String,
    },

    /// A `range` count did not evaluate to a number.
    #[error("'{0}' is not type of number")]
    NotANumber(String),

    /// A call statement resolved to something that is not a function.
    #[error("'{0}' is not a function")]
    NotCallable(String),

    /// A condition used an operator outside the supported set.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
