//! Core data structures for tracelens.
//!
//! A [`Trace`] is the recorded attempt of a grammar matcher over an input
//! string: one [`TraceNode`] per expression application, plus the concrete
//! syntax nodes ([`CstNode`]) bound by successful matches. On top of the
//! trace sit a filtered projection ([`TraceView`]), the dual enter/exit
//! [`TraceWalker`] used for step-by-step replay, and the [`Timeline`] built
//! from it.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod colors;
mod raw;
pub mod timeline;
pub mod trace;
pub mod view;
pub mod walker;

#[cfg(test)]
mod raw_tests;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod timeline_tests;
#[cfg(test)]
mod trace_tests;
#[cfg(test)]
mod walker_tests;

pub use colors::Colors;
pub use timeline::{NodeState, ParseStep, StepKind, StepRange, Timeline};
pub use trace::{
    CstId, CstKind, CstNode, ExprKind, Interval, NodeKey, Trace, TraceBuilder, TraceId, TraceNode,
};
pub use view::{LabelPolicy, TraceView, ViewNode};
pub use walker::{Filter, TraceWalker, TreeView, WalkerOptions};

/// Errors raised while loading or assembling a trace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid trace document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("interval {start}..{end} is outside the input (length {len})")]
    IntervalOutOfBounds { start: usize, end: usize, len: usize },

    #[error("interval {start}..{end} is reversed")]
    ReversedInterval { start: usize, end: usize },

    #[error("interval {start}..{end} splits a character")]
    SplitCharacter { start: usize, end: usize },

    #[error("left-recursion placeholder outside of any node")]
    OrphanPlaceholder,

    #[error("trace has more than one root node")]
    MultipleRoots,

    #[error("unbalanced trace: `exit` without a matching `enter`")]
    UnbalancedExit,

    #[error("unbalanced trace: {0} node(s) were never exited")]
    UnclosedNodes(usize),
}

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, Error>;
