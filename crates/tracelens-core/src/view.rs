//! Filtered projection of a [`Trace`] for the walker.

use indexmap::IndexSet;
use serde::Deserialize;

use crate::trace::{ExprKind, Trace, TraceId};
use crate::walker::{Filter, TreeView};

/// Which trace nodes are labeled (shown) in the visualization.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
    /// Show failed applications. Hidden failures take their subtree with them.
    pub show_failures: bool,
    /// Show sequence and alternation nodes instead of splicing their children
    /// into the parent.
    pub show_structure: bool,
    /// Rules whose applications are hidden together with their subtree.
    pub hidden_rules: IndexSet<String>,
}

impl LabelPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_failures(mut self, value: bool) -> Self {
        self.show_failures = value;
        self
    }

    pub fn show_structure(mut self, value: bool) -> Self {
        self.show_structure = value;
        self
    }

    pub fn hide_rule(mut self, name: impl Into<String>) -> Self {
        self.hidden_rules.insert(name.into());
        self
    }

    pub fn classify(&self, trace: &Trace, id: TraceId) -> Filter {
        let node = trace.node(id);
        if !node.succeeded && !self.show_failures {
            return Filter::Reject;
        }
        match node.expr {
            ExprKind::Apply if self.hidden_rules.contains(&node.name) => Filter::Reject,
            ExprKind::Seq | ExprKind::Alt if !self.show_structure => Filter::Skip,
            _ => Filter::Accept,
        }
    }
}

/// Position in a [`TraceView`]: the virtual container or a trace node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewNode {
    Root,
    Trace(TraceId),
}

impl ViewNode {
    pub fn trace_id(self) -> Option<TraceId> {
        match self {
            ViewNode::Root => None,
            ViewNode::Trace(id) => Some(id),
        }
    }
}

pub struct TraceView<'t> {
    trace: &'t Trace,
    policy: LabelPolicy,
}

impl<'t> TraceView<'t> {
    pub fn new(trace: &'t Trace, policy: LabelPolicy) -> Self {
        Self { trace, policy }
    }

    pub fn trace(&self) -> &'t Trace {
        self.trace
    }

    pub fn policy(&self) -> &LabelPolicy {
        &self.policy
    }
}

impl TreeView for TraceView<'_> {
    type Node = ViewNode;

    fn root(&self) -> ViewNode {
        ViewNode::Root
    }

    fn parent(&self, node: ViewNode) -> Option<ViewNode> {
        let id = node.trace_id()?;
        Some(self.trace.parent(id).map_or(ViewNode::Root, ViewNode::Trace))
    }

    fn first_child(&self, node: ViewNode) -> Option<ViewNode> {
        match node {
            ViewNode::Root => self.trace.root().map(ViewNode::Trace),
            ViewNode::Trace(id) => self.trace.children(id).next().map(ViewNode::Trace),
        }
    }

    fn last_child(&self, node: ViewNode) -> Option<ViewNode> {
        match node {
            ViewNode::Root => self.trace.root().map(ViewNode::Trace),
            ViewNode::Trace(id) => self.trace.children(id).next_back().map(ViewNode::Trace),
        }
    }

    fn next_sibling(&self, node: ViewNode) -> Option<ViewNode> {
        self.trace.next_sibling(node.trace_id()?).map(ViewNode::Trace)
    }

    fn previous_sibling(&self, node: ViewNode) -> Option<ViewNode> {
        self.trace
            .previous_sibling(node.trace_id()?)
            .map(ViewNode::Trace)
    }

    fn filter(&self, node: ViewNode) -> Filter {
        match node {
            ViewNode::Root => Filter::Skip,
            ViewNode::Trace(id) => self.policy.classify(self.trace, id),
        }
    }

    fn is_leaf(&self, node: ViewNode) -> bool {
        node.trace_id().is_some_and(|id| self.trace.is_leaf(id))
    }

    fn order(&self, node: ViewNode) -> usize {
        node.trace_id().map_or(0, |id| id.index() + 1)
    }
}
