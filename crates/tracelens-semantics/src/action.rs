//! Actions and the context they run in.
//!
//! Every node falls into one of three shapes. Each shape has a built-in
//! default action; user actions override it per rule name:
//!
//! | shape         | default                                                  |
//! |---------------|----------------------------------------------------------|
//! | `_terminal`   | missing, the application is recorded as a todo            |
//! | `_iter`       | list of child results (missing / first error if any)     |
//! | `_nonterminal`| the only child's result, or missing for several children |

use tracelens_core::{CstId, CstKind, Interval, Trace};

use crate::operation::{Args, Operation};
use crate::outcome::{Outcome, Scratch};
use crate::registry::Semantics;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Terminal,
    Iter,
    Nonterminal,
}

impl NodeShape {
    pub fn of(kind: &CstKind) -> Self {
        match kind {
            CstKind::Terminal => NodeShape::Terminal,
            CstKind::Iter => NodeShape::Iter,
            CstKind::Nonterminal { .. } => NodeShape::Nonterminal,
        }
    }

    /// Rule name under which a user action replaces this shape's default.
    pub fn default_key(self) -> &'static str {
        match self {
            NodeShape::Terminal => "_terminal",
            NodeShape::Iter => "_iter",
            NodeShape::Nonterminal => "_nonterminal",
        }
    }
}

/// Why an action stopped without a value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// A result the action needed is missing or erroring. Its status has
    /// already been recorded.
    #[error("unresolved result")]
    Unresolved,

    /// The action itself failed.
    #[error("{0}")]
    Raised(String),
}

impl ActionError {
    pub fn raised(message: impl Into<String>) -> Self {
        ActionError::Raised(message.into())
    }
}

pub type ActionResult = std::result::Result<Value, ActionError>;

pub trait Action {
    fn call(&self, ctx: &mut ActionContext<'_>) -> ActionResult;
}

/// Adapter for plain Rust closures.
pub(crate) struct NativeAction<F>(pub F);

impl<F> Action for NativeAction<F>
where
    F: Fn(&mut ActionContext<'_>) -> ActionResult,
{
    fn call(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        (self.0)(ctx)
    }
}

/// Evaluation entry point handed to actions for nested applications.
pub(crate) trait Apply {
    fn apply(&mut self, node: CstId, op: &Operation, args: &Args, scratch: &mut Scratch)
    -> Outcome;
}

/// What an action sees: its node, the invocation arguments, and memoized
/// access to results of other applications.
pub struct ActionContext<'a> {
    host: &'a mut dyn Apply,
    trace: &'a Trace,
    semantics: &'a Semantics,
    node: CstId,
    operation: &'a Operation,
    args: &'a Args,
    scratch: &'a mut Scratch,
}

impl<'a> ActionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        host: &'a mut dyn Apply,
        trace: &'a Trace,
        semantics: &'a Semantics,
        node: CstId,
        operation: &'a Operation,
        args: &'a Args,
        scratch: &'a mut Scratch,
    ) -> Self {
        Self {
            host,
            trace,
            semantics,
            node,
            operation,
            args,
            scratch,
        }
    }

    pub fn node(&self) -> CstId {
        self.node
    }

    pub fn trace(&self) -> &'a Trace {
        self.trace
    }

    pub fn semantics(&self) -> &'a Semantics {
        self.semantics
    }

    pub fn ctor_name(&self) -> &'a str {
        self.trace.cst(self.node).ctor_name()
    }

    pub fn interval(&self) -> Interval {
        self.trace.cst(self.node).interval
    }

    pub fn source_string(&self) -> &'a str {
        self.trace.source_string(self.node)
    }

    pub fn children(&self) -> &'a [CstId] {
        &self.trace.cst(self.node).children
    }

    pub fn operation(&self) -> &'a Operation {
        self.operation
    }

    pub fn args(&self) -> &'a Args {
        self.args
    }

    pub fn arg(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name)
    }

    /// Result of the current operation, with the current arguments, at `node`.
    pub fn eval(&mut self, node: CstId) -> ActionResult {
        let outcome = self.try_eval(node);
        unresolved_as_error(outcome)
    }

    /// Like [`eval`](Self::eval), but hands back missing and erroring
    /// outcomes instead of stopping.
    pub fn try_eval(&mut self, node: CstId) -> Outcome {
        self.host
            .apply(node, self.operation, self.args, self.scratch)
    }

    /// Results of the current operation for every child, in order.
    pub fn child_results(&mut self) -> std::result::Result<Vec<Value>, ActionError> {
        self.children()
            .iter()
            .map(|&child| self.eval(child))
            .collect()
    }

    /// Apply a declared operation or attribute by name.
    pub fn apply(&mut self, node: CstId, operation: &str, args: Vec<Value>) -> ActionResult {
        let op = self
            .semantics
            .operation(operation)
            .ok_or_else(|| ActionError::raised(format!("unknown operation `{operation}`")))?;
        let args = op
            .bind_args(args)
            .map_err(|e| ActionError::raised(e.to_string()))?;
        let outcome = self.host.apply(node, op, &args, self.scratch);
        unresolved_as_error(outcome)
    }
}

fn unresolved_as_error(outcome: Outcome) -> ActionResult {
    match outcome {
        Outcome::Value(v) => Ok(v),
        Outcome::Missing | Outcome::Error(_) => Err(ActionError::Unresolved),
    }
}
