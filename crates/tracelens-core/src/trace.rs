//! Arena representation of a recorded parse trace.
//!
//! Trace nodes are stored in preorder, so comparing two [`TraceId`]s compares
//! their document order. Concrete syntax nodes live in a separate arena and
//! are referenced from trace nodes through their binding lists.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Index of a trace node. Assigned in preorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(u32);

impl TraceId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a concrete syntax node bound by a successful match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CstId(u32);

impl CstId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range `[start, end)` into the trace input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Kind of grammar expression a trace node records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKind {
    Terminal,
    Range,
    CharClass,
    Apply,
    Seq,
    Alt,
    Iter,
    Lookahead,
    Not,
    Param,
}

impl ExprKind {
    /// Expressions that match input directly, without sub-expressions.
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::Terminal | Self::Range | Self::CharClass)
    }
}

/// One recorded expression application.
#[derive(Clone, Debug)]
pub struct TraceNode {
    pub expr: ExprKind,
    /// Rule name for applications, display text for everything else.
    pub name: String,
    pub interval: Interval,
    pub succeeded: bool,
    /// `None` marks the base case of a left-recursive application.
    pub children: Vec<Option<TraceId>>,
    pub bindings: Vec<CstId>,
    pub(crate) parent: Option<TraceId>,
    /// Position within the parent's `children`.
    pub(crate) slot: u32,
}

impl TraceNode {
    pub fn parent(&self) -> Option<TraceId> {
        self.parent
    }

    pub fn is_lr_base_case(&self) -> bool {
        matches!(self.children.as_slice(), [None])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CstKind {
    Terminal,
    Iter,
    Nonterminal { rule: String },
}

/// Concrete syntax node: what a semantic action sees.
#[derive(Clone, Debug)]
pub struct CstNode {
    pub kind: CstKind,
    pub interval: Interval,
    pub children: Vec<CstId>,
}

impl CstNode {
    /// `_terminal`, `_iter`, or the rule name.
    pub fn ctor_name(&self) -> &str {
        match &self.kind {
            CstKind::Terminal => "_terminal",
            CstKind::Iter => "_iter",
            CstKind::Nonterminal { rule } => rule,
        }
    }

    pub fn key(&self) -> NodeKey {
        NodeKey {
            ctor_name: self.ctor_name().to_owned(),
            start: self.interval.start,
            end: self.interval.end,
        }
    }
}

/// Identity of a logical match, stable for the lifetime of a trace.
///
/// Two CST nodes with the same constructor over the same interval share a key,
/// and therefore share cached semantic results.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub ctor_name: String,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_from_{}_to_{}", self.ctor_name, self.start, self.end)
    }
}

#[derive(Clone, Debug)]
pub struct Trace {
    input: String,
    nodes: Vec<TraceNode>,
    cst: Vec<CstNode>,
    primitive_rules: IndexSet<String>,
}

impl Trace {
    pub fn builder(input: impl Into<String>) -> TraceBuilder {
        TraceBuilder::new(input)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn root(&self) -> Option<TraceId> {
        (!self.nodes.is_empty()).then_some(TraceId(0))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node id by its preorder index.
    pub fn trace_id(&self, index: usize) -> Option<TraceId> {
        (index < self.nodes.len()).then(|| TraceId(index as u32))
    }

    /// All node ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = TraceId> + '_ {
        (0..self.nodes.len() as u32).map(TraceId)
    }

    pub fn node(&self, id: TraceId) -> &TraceNode {
        &self.nodes[id.index()]
    }

    pub fn parent(&self, id: TraceId) -> Option<TraceId> {
        self.node(id).parent
    }

    /// Children of `id`, skipping left-recursion placeholders.
    pub fn children(&self, id: TraceId) -> impl DoubleEndedIterator<Item = TraceId> + '_ {
        self.node(id).children.iter().flatten().copied()
    }

    pub(crate) fn next_sibling(&self, id: TraceId) -> Option<TraceId> {
        let node = self.node(id);
        let parent = self.node(node.parent?);
        parent.children[node.slot as usize + 1..]
            .iter()
            .flatten()
            .copied()
            .next()
    }

    pub(crate) fn previous_sibling(&self, id: TraceId) -> Option<TraceId> {
        let node = self.node(id);
        let parent = self.node(node.parent?);
        parent.children[..node.slot as usize]
            .iter()
            .rev()
            .flatten()
            .copied()
            .next()
    }

    pub fn cst(&self, id: CstId) -> &CstNode {
        &self.cst[id.index()]
    }

    /// The CST node a trace node contributes to semantic evaluation.
    pub fn binding(&self, id: TraceId) -> Option<CstId> {
        self.node(id).bindings.first().copied()
    }

    pub fn node_key(&self, id: CstId) -> NodeKey {
        self.cst(id).key()
    }

    pub fn text(&self, interval: Interval) -> &str {
        self.input.get(interval.start..interval.end).unwrap_or("")
    }

    pub fn source_string(&self, id: CstId) -> &str {
        self.text(self.cst(id).interval)
    }

    pub fn primitive_rules(&self) -> impl Iterator<Item = &str> {
        self.primitive_rules.iter().map(String::as_str)
    }

    pub fn is_primitive_rule(&self, name: &str) -> bool {
        self.primitive_rules.contains(name)
    }

    /// Matches input directly: a terminal, a range, a character class, or an
    /// application of a rule without retrievable source.
    pub fn is_primitive(&self, id: TraceId) -> bool {
        let node = self.node(id);
        node.expr.is_primitive()
            || (node.expr == ExprKind::Apply && self.is_primitive_rule(&node.name))
    }

    /// Visited once by the walker, never entered and exited.
    pub fn is_leaf(&self, id: TraceId) -> bool {
        let node = self.node(id);
        self.is_primitive(id) || node.is_lr_base_case() || node.children.is_empty()
    }
}

/// Push-style construction of a [`Trace`] in preorder.
///
/// ```
/// use tracelens_core::{ExprKind, Interval, Trace};
///
/// let mut b = Trace::builder("a");
/// let letter = b.nonterminal("letter", Interval::new(0, 1), vec![]).unwrap();
/// let id = b.enter(ExprKind::Apply, "letter", Interval::new(0, 1)).unwrap();
/// b.bind(id, letter);
/// b.exit().unwrap();
/// let trace = b.build().unwrap();
/// assert_eq!(trace.source_string(letter), "a");
/// ```
#[derive(Debug)]
pub struct TraceBuilder {
    input: String,
    nodes: Vec<TraceNode>,
    cst: Vec<CstNode>,
    primitive_rules: IndexSet<String>,
    open: Vec<TraceId>,
}

impl TraceBuilder {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            nodes: Vec::new(),
            cst: Vec::new(),
            primitive_rules: IndexSet::new(),
            open: Vec::new(),
        }
    }

    pub fn primitive_rule(&mut self, name: impl Into<String>) -> &mut Self {
        self.primitive_rules.insert(name.into());
        self
    }

    pub fn terminal(&mut self, interval: Interval) -> Result<CstId> {
        self.push_cst(CstKind::Terminal, interval, Vec::new())
    }

    pub fn iter(&mut self, interval: Interval, children: Vec<CstId>) -> Result<CstId> {
        self.push_cst(CstKind::Iter, interval, children)
    }

    pub fn nonterminal(
        &mut self,
        rule: impl Into<String>,
        interval: Interval,
        children: Vec<CstId>,
    ) -> Result<CstId> {
        let rule = rule.into();
        self.push_cst(CstKind::Nonterminal { rule }, interval, children)
    }

    fn push_cst(&mut self, kind: CstKind, interval: Interval, children: Vec<CstId>) -> Result<CstId> {
        self.check_interval(interval)?;
        let id = CstId(self.cst.len() as u32);
        self.cst.push(CstNode {
            kind,
            interval,
            children,
        });
        Ok(id)
    }

    /// Open a trace node as the next child of the innermost open node.
    /// The node starts out successful and without bindings.
    pub fn enter(
        &mut self,
        expr: ExprKind,
        name: impl Into<String>,
        interval: Interval,
    ) -> Result<TraceId> {
        self.check_interval(interval)?;
        let parent = self.open.last().copied();
        if parent.is_none() && !self.nodes.is_empty() {
            return Err(Error::MultipleRoots);
        }

        let id = TraceId(self.nodes.len() as u32);
        let slot = match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p.index()].children;
                siblings.push(Some(id));
                siblings.len() as u32 - 1
            }
            None => 0,
        };

        self.nodes.push(TraceNode {
            expr,
            name: name.into(),
            interval,
            succeeded: true,
            children: Vec::new(),
            bindings: Vec::new(),
            parent,
            slot,
        });
        self.open.push(id);
        Ok(id)
    }

    pub fn exit(&mut self) -> Result<()> {
        self.open.pop().map(drop).ok_or(Error::UnbalancedExit)
    }

    pub fn bind(&mut self, id: TraceId, cst: CstId) -> &mut Self {
        self.nodes[id.index()].bindings.push(cst);
        self
    }

    pub fn mark_failed(&mut self, id: TraceId) -> &mut Self {
        self.nodes[id.index()].succeeded = false;
        self
    }

    /// Record the left-recursion seed placeholder under the innermost open node.
    pub fn lr_base_case(&mut self) -> Result<()> {
        let parent = self.open.last().ok_or(Error::OrphanPlaceholder)?;
        self.nodes[parent.index()].children.push(None);
        Ok(())
    }

    pub fn build(self) -> Result<Trace> {
        if !self.open.is_empty() {
            return Err(Error::UnclosedNodes(self.open.len()));
        }
        Ok(Trace {
            input: self.input,
            nodes: self.nodes,
            cst: self.cst,
            primitive_rules: self.primitive_rules,
        })
    }

    fn check_interval(&self, interval: Interval) -> Result<()> {
        let Interval { start, end } = interval;
        if start > end {
            return Err(Error::ReversedInterval { start, end });
        }
        if end > self.input.len() {
            return Err(Error::IntervalOutOfBounds {
                start,
                end,
                len: self.input.len(),
            });
        }
        if !self.input.is_char_boundary(start) || !self.input.is_char_boundary(end) {
            return Err(Error::SplitCharacter { start, end });
        }
        Ok(())
    }
}
