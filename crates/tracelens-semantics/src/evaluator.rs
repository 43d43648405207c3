//! Memoized evaluation of operations over a trace.
//!
//! Every application of an operation to a node runs in its own scratch
//! extent: unresolved applications (`todo`) and runtime errors collected by
//! nested applications are merged back into the caller's extent when the
//! application returns. The outcome of an application that had to run an
//! action is then decided from its own extent: missing if anything in it is
//! unresolved, otherwise the first error, otherwise the action's value.
//!
//! Results are cached per node key, operation and argument binding. Cache
//! hits replay the extent recorded the first time, so a cached subtree
//! contributes exactly what a fresh evaluation would.

use tracelens_core::{CstId, NodeKey, Trace, TraceId};

use crate::action::{ActionContext, ActionError, Apply, NodeShape};
use crate::cache::{NodeResults, ResultCache, ResultWrapper};
use crate::operation::{Args, Operation};
use crate::outcome::{ErrorWrapper, NodeOpKey, Outcome, Scratch};
use crate::registry::{Dispatch, Semantics, UserAction};
use crate::tracer::{DispatchKind, EvalTracer, NoopTracer};
use crate::value::Value;
use crate::{Error, Result};

/// Stack left before an application or an expression switches to a fresh
/// segment. One level of nesting must fit in it.
pub(crate) const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each fresh stack segment.
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Resource limits for evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Maximum nesting of applications (default: 256). The top-level
    /// application always runs, so `0` and `1` both stop at the first
    /// nested application.
    pub recursion_limit: u32,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            recursion_limit: 256,
        }
    }
}

impl EvalLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }
}

pub struct Evaluator<'s, T: EvalTracer = NoopTracer> {
    semantics: &'s Semantics,
    trace: &'s Trace,
    cache: ResultCache,
    forcing: bool,
    selected: Option<String>,
    limits: EvalLimits,
    depth: u32,
    tracer: T,
}

impl<'s> Evaluator<'s> {
    pub fn new(semantics: &'s Semantics, trace: &'s Trace) -> Self {
        Self::with_tracer(semantics, trace, NoopTracer)
    }
}

impl<'s, T: EvalTracer> Evaluator<'s, T> {
    pub fn with_tracer(semantics: &'s Semantics, trace: &'s Trace, tracer: T) -> Self {
        Self {
            semantics,
            trace,
            cache: ResultCache::new(),
            forcing: false,
            selected: None,
            limits: EvalLimits::default(),
            depth: 0,
            tracer,
        }
    }

    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn semantics(&self) -> &'s Semantics {
        self.semantics
    }

    pub fn trace(&self) -> &'s Trace {
        self.trace
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn into_tracer(self) -> T {
        self.tracer
    }

    /// Operation currently being edited. Its results get
    /// `for_calling_semantic` and, where applicable, `is_next_step`.
    pub fn set_selected_operation(&mut self, operation: Option<&str>) {
        self.selected = operation.map(str::to_owned);
    }

    pub fn selected_operation(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Drop every cached result.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.tracer.trace_reset();
    }

    /// Start a new pass: clear the cache, then evaluate `operation` at `node`
    /// on demand.
    pub fn render(
        &mut self,
        node: TraceId,
        operation: &str,
        args: Option<Vec<Value>>,
    ) -> Result<&ResultWrapper> {
        self.reset();
        self.evaluate(node, operation, args)
    }

    /// Evaluate `operation` at `node` on demand, reusing cached results.
    /// Without `args`, every formal is bound to `null`.
    pub fn evaluate(
        &mut self,
        node: TraceId,
        operation: &str,
        args: Option<Vec<Value>>,
    ) -> Result<&ResultWrapper> {
        let (key, op, args) = self.run(node, operation, args, false)?;
        Ok(self.cached(&key, op, &args))
    }

    /// Like [`evaluate`](Self::evaluate), but in forcing mode.
    pub fn force_result(
        &mut self,
        node: TraceId,
        operation: &str,
        args: Option<Vec<Value>>,
    ) -> Result<&ResultWrapper> {
        let (key, op, args) = self.run(node, operation, args, true)?;
        Ok(self.cached(&key, op, &args))
    }

    /// Results of every operation and attribute at `node`.
    ///
    /// A forced pass runs when the node has no results yet, or when all of
    /// them came from forcing. Otherwise the cached results are returned as
    /// they are. `None` when nothing is declared.
    pub fn get_results(&mut self, node: TraceId) -> Result<Option<&NodeResults>> {
        let cst = self.binding(node)?;
        let key = self.trace.node_key(cst);
        if self.cache.node_results(&key).is_none() || self.cache.all_forced(&key) {
            self.tracer.trace_pass(node, true);
            let semantics = self.semantics;
            self.forcing = true;
            for op in semantics.operations() {
                let args = op.null_args();
                self.apply(cst, op, &args, &mut Scratch::default());
            }
            self.forcing = false;
        }
        Ok(self.cache.node_results(&key))
    }

    /// Cached results at `node`, without evaluating anything.
    pub fn results(&self, node: TraceId) -> Option<&NodeResults> {
        let cst = self.trace.binding(node)?;
        self.cache.node_results(&self.trace.node_key(cst))
    }

    fn binding(&self, node: TraceId) -> Result<CstId> {
        self.trace.binding(node).ok_or(Error::NoBinding(node))
    }

    fn run(
        &mut self,
        node: TraceId,
        operation: &str,
        args: Option<Vec<Value>>,
        forcing: bool,
    ) -> Result<(NodeKey, &'s Operation, Args)> {
        let cst = self.binding(node)?;
        let op = self
            .semantics
            .operation(operation)
            .ok_or_else(|| Error::UnknownOperation(operation.to_owned()))?;
        let args = match args {
            Some(values) => op.bind_args(values)?,
            None => op.null_args(),
        };

        self.tracer.trace_pass(node, forcing);
        self.forcing = forcing;
        self.apply(cst, op, &args, &mut Scratch::default());
        self.forcing = false;
        Ok((self.trace.node_key(cst), op, args))
    }

    fn cached(&self, key: &NodeKey, op: &Operation, args: &Args) -> &ResultWrapper {
        self.cache
            .get(key, op.name(), args)
            .expect("top-level application is always cached")
    }

    fn dispatch(
        &mut self,
        node: CstId,
        op: &Operation,
        args: &Args,
        key: &NodeOpKey,
        scratch: &mut Scratch,
    ) -> (Outcome, bool) {
        let (trace, semantics) = (self.trace, self.semantics);
        let cst = trace.cst(node);
        let shape = NodeShape::of(&cst.kind);
        match semantics.resolve(op.name(), cst.ctor_name(), shape) {
            Dispatch::Default(shape) => {
                self.tracer
                    .trace_dispatch(key, DispatchKind::Default(shape), self.depth);
                self.default_action(shape, node, op, args, key, scratch)
            }
            Dispatch::User(action) => {
                self.tracer
                    .trace_dispatch(key, DispatchKind::User, self.depth);
                let outcome = self.user_action(action, node, op, args, key, scratch);
                (outcome, false)
            }
        }
    }

    fn default_action(
        &mut self,
        shape: NodeShape,
        node: CstId,
        op: &Operation,
        args: &Args,
        key: &NodeOpKey,
        scratch: &mut Scratch,
    ) -> (Outcome, bool) {
        let trace = self.trace;
        let children = &trace.cst(node).children;
        match shape {
            NodeShape::Terminal => {
                scratch.todo.push(key.clone());
                (Outcome::Missing, false)
            }
            NodeShape::Iter => {
                let outcomes: Vec<Outcome> = children
                    .iter()
                    .map(|&child| self.apply(child, op, args, scratch))
                    .collect();
                (aggregate(outcomes), false)
            }
            NodeShape::Nonterminal => match children.as_slice() {
                [only] => {
                    let outcome = match self.apply(*only, op, args, scratch) {
                        Outcome::Value(v) => scratch.resolve(v),
                        other => other,
                    };
                    (outcome, true)
                }
                _ => {
                    scratch.todo.push(key.clone());
                    (Outcome::Missing, false)
                }
            },
        }
    }

    fn user_action(
        &mut self,
        action: &UserAction,
        node: CstId,
        op: &Operation,
        args: &Args,
        key: &NodeOpKey,
        scratch: &mut Scratch,
    ) -> Outcome {
        let (trace, semantics) = (self.trace, self.semantics);
        let result = {
            let mut ctx = ActionContext::new(&mut *self, trace, semantics, node, op, args, scratch);
            action.action().call(&mut ctx)
        };
        match result {
            Ok(value) => scratch.resolve(value),
            Err(ActionError::Unresolved) => match scratch.resolve(Value::Null) {
                // Gave up without a nested cause: this application is the
                // one left to decide.
                Outcome::Value(_) => {
                    scratch.todo.push(key.clone());
                    Outcome::Missing
                }
                other => other,
            },
            // A nested missing result still wins, and so does an earlier
            // nested error.
            Err(ActionError::Raised(message)) => {
                if scratch.errors.is_empty() {
                    scratch.errors.push(ErrorWrapper::new(key.clone(), message));
                }
                scratch.resolve(Value::Null)
            }
        }
    }
}

impl<T: EvalTracer> Apply for Evaluator<'_, T> {
    fn apply(
        &mut self,
        node: CstId,
        op: &Operation,
        args: &Args,
        scratch: &mut Scratch,
    ) -> Outcome {
        let key = NodeOpKey::new(self.trace.node_key(node), op.name());
        if let Some(hit) = self.cache.lookup(&key.node, op.name(), args, self.forcing) {
            self.tracer.trace_cache_hit(&key, hit, self.depth);
            scratch.absorb(&hit.replay);
            return hit.outcome.clone();
        }

        if self.depth > 0 && self.depth >= self.limits.recursion_limit {
            let error = ErrorWrapper::new(key, "recursion limit exceeded");
            scratch.errors.push(error.clone());
            return Outcome::Error(error);
        }

        self.tracer.trace_apply(&key, args, self.depth);
        self.depth += 1;
        let mut inner = Scratch::default();
        let (outcome, is_pass_through) = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.dispatch(node, op, args, &key, &mut inner)
        });
        self.depth -= 1;
        scratch.absorb(&inner);

        let for_calling_semantic = self.selected.as_deref() == Some(op.name());
        let is_next_step = for_calling_semantic
            && (outcome.error().is_some_and(|e| e.caused_by(&key)) || scratch.todo.contains(&key));
        let result = ResultWrapper {
            outcome: outcome.clone(),
            args: args.signature(),
            forced: self.forcing,
            for_calling_semantic,
            is_pass_through,
            is_next_step,
            replay: inner,
        };
        self.tracer.trace_result(&key, &result, self.depth);
        self.cache.insert(key.node, op.name(), result);
        outcome
    }
}

/// `_iter` aggregation: missing if any child is missing, else the first
/// error in child order, else the list of values.
fn aggregate(outcomes: Vec<Outcome>) -> Outcome {
    if outcomes.iter().any(Outcome::is_missing) {
        return Outcome::Missing;
    }
    if let Some(error) = outcomes.iter().find_map(Outcome::error) {
        return Outcome::Error(error.clone());
    }
    let values = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            Outcome::Value(v) => Some(v),
            _ => None,
        })
        .collect();
    Outcome::Value(Value::List(values))
}
