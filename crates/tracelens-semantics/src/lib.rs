//! Semantic actions over tracelens parse traces.
//!
//! A [`Semantics`] declares operations and attributes and maps grammar rules
//! to actions, either Rust closures or bodies written in a small sandboxed
//! language ([`dsl`]). The [`Evaluator`] applies them to the concrete syntax
//! bound by a [`Trace`](tracelens_core::Trace), memoizing every result in a
//! [`ResultCache`] so the UI can show, per node, what each operation computed,
//! which nodes still need an action, and where errors were raised.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod action;
pub mod cache;
mod definition;
pub mod dsl;
pub mod evaluator;
pub mod operation;
pub mod outcome;
pub mod registry;
pub mod tracer;
pub mod value;

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod test_utils;

pub use action::{Action, ActionContext, ActionError, ActionResult, NodeShape};
pub use cache::{NodeResults, ResultCache, ResultWrapper};
pub use definition::{ActionDefinition, OperationDefinition, SemanticsDefinition};
pub use dsl::{CompileError, DiagnosticsPrinter};
pub use evaluator::{EvalLimits, Evaluator};
pub use operation::{Args, Operation, OperationKind};
pub use outcome::{ErrorWrapper, NodeOpKey, Outcome};
pub use registry::{ActionDict, Semantics, UserAction};
pub use tracer::{DispatchKind, EvalTracer, NoopTracer, PrintTracer, Verbosity};
pub use value::Value;

use tracelens_core::TraceId;

/// Errors from declaring semantics or calling the evaluator incorrectly.
///
/// Failures inside actions are never reported here; they are results.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    #[error("operation `{0}` is already declared")]
    DuplicateOperation(String),

    #[error("`{0}` is not a valid name")]
    InvalidName(String),

    #[error("`{operation}` expects {expected} argument(s), got {got}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        got: usize,
    },

    #[error("trace node {0} did not bind any syntax")]
    NoBinding(TraceId),

    #[error("action for `{rule}` in `{operation}`: {error}")]
    Compile {
        operation: String,
        rule: String,
        #[source]
        error: CompileError,
    },

    #[error("invalid semantics document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for semantics operations.
pub type Result<T> = std::result::Result<T, Error>;
