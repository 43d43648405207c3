//! Memoized results keyed by node, operation and argument binding.

use indexmap::IndexMap;
use tracelens_core::NodeKey;

use crate::operation::Args;
use crate::outcome::{Outcome, Scratch};
use crate::value::Value;

/// Cached outcome of one application plus what the UI needs to show it.
#[derive(Clone, Debug)]
pub struct ResultWrapper {
    pub(crate) outcome: Outcome,
    pub(crate) args: Option<Args>,
    pub(crate) forced: bool,
    pub(crate) for_calling_semantic: bool,
    pub(crate) is_pass_through: bool,
    pub(crate) is_next_step: bool,
    /// Unresolved applications and errors this application contributed to its
    /// caller. Replayed on cache hits.
    pub(crate) replay: Scratch,
}

impl ResultWrapper {
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn value(&self) -> Option<&Value> {
        self.outcome.value()
    }

    pub fn args(&self) -> Option<&Args> {
        self.args.as_ref()
    }

    /// Produced only by forced passes so far.
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_error()
    }

    pub fn missing_semantics_action(&self) -> bool {
        self.outcome.is_missing()
    }

    pub fn is_pass_through(&self) -> bool {
        self.is_pass_through
    }

    /// The selected operation needs an action (or a fix) right here.
    pub fn is_next_step(&self) -> bool {
        self.is_next_step
    }

    pub fn for_calling_semantic(&self) -> bool {
        self.for_calling_semantic
    }
}

/// Results for one node, by operation name.
pub type NodeResults = IndexMap<String, Vec<ResultWrapper>>;

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: IndexMap<NodeKey, NodeResults>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of nodes with at least one cached result.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn node_results(&self, node: &NodeKey) -> Option<&NodeResults> {
        self.entries.get(node)
    }

    pub fn get(&self, node: &NodeKey, operation: &str, args: &Args) -> Option<&ResultWrapper> {
        self.entries
            .get(node)?
            .get(operation)?
            .iter()
            .find(|r| args.matches_signature(r.args.as_ref()))
    }

    /// Cache hit for a repeated application. A hit outside forcing mode makes
    /// the result permanently non-forced.
    pub(crate) fn lookup(
        &mut self,
        node: &NodeKey,
        operation: &str,
        args: &Args,
        forcing: bool,
    ) -> Option<&ResultWrapper> {
        let hit = self
            .entries
            .get_mut(node)?
            .get_mut(operation)?
            .iter_mut()
            .find(|r| args.matches_signature(r.args.as_ref()))?;
        hit.forced &= forcing;
        Some(&*hit)
    }

    /// Record a new result. An equal argument binding already present wins,
    /// only its forced flag is updated.
    pub(crate) fn insert(&mut self, node: NodeKey, operation: &str, result: ResultWrapper) {
        let list = self
            .entries
            .entry(node)
            .or_default()
            .entry(operation.to_owned())
            .or_default();
        let existing = list.iter_mut().find(|r| r.args == result.args);
        match existing {
            Some(existing) => existing.forced &= result.forced,
            None => list.push(result),
        }
    }

    /// Whether the node has results and every one of them came from forcing.
    pub fn all_forced(&self, node: &NodeKey) -> bool {
        self.entries
            .get(node)
            .is_some_and(|ops| ops.values().flatten().all(|r| r.forced))
    }
}
