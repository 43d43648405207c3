//! JSON trace documents.
//!
//! The document mirrors what a grammar matcher records: a nested tree of
//! expression applications, each carrying the concrete syntax it bound.
//! It is deserialized 1:1 into `Raw*` types and then lowered into the
//! [`Trace`] arena through [`TraceBuilder`].

use serde::Deserialize;

use crate::Result;
use crate::trace::{CstId, ExprKind, Interval, Trace, TraceBuilder};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawTrace {
    pub input: String,
    #[serde(default)]
    pub primitive_rules: Vec<String>,
    pub root: Option<RawTraceNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawTraceNode {
    pub expr: ExprKind,
    #[serde(default)]
    pub name: String,
    pub start: usize,
    pub end: usize,
    #[serde(default = "succeeded_by_default")]
    pub succeeded: bool,
    #[serde(default)]
    pub bindings: Vec<RawCst>,
    /// `null` entries are left-recursion placeholders.
    #[serde(default)]
    pub children: Vec<Option<RawTraceNode>>,
}

fn succeeded_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum RawCst {
    Terminal {
        start: usize,
        end: usize,
    },
    Iter {
        start: usize,
        end: usize,
        #[serde(default)]
        children: Vec<RawCst>,
    },
    Nonterminal {
        rule: String,
        start: usize,
        end: usize,
        #[serde(default)]
        children: Vec<RawCst>,
    },
}

impl Trace {
    /// Load a trace from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawTrace = serde_json::from_str(json)?;
        raw.lower()
    }
}

impl RawTrace {
    fn lower(self) -> Result<Trace> {
        let mut builder = TraceBuilder::new(self.input);
        for rule in self.primitive_rules {
            builder.primitive_rule(rule);
        }
        if let Some(root) = &self.root {
            lower_node(&mut builder, root)?;
        }
        builder.build()
    }
}

fn lower_node(b: &mut TraceBuilder, raw: &RawTraceNode) -> Result<()> {
    let id = b.enter(raw.expr, raw.name.as_str(), Interval::new(raw.start, raw.end))?;
    if !raw.succeeded {
        b.mark_failed(id);
    }
    for binding in &raw.bindings {
        let cst = lower_cst(b, binding)?;
        b.bind(id, cst);
    }
    for child in &raw.children {
        match child {
            Some(child) => lower_node(b, child)?,
            None => b.lr_base_case()?,
        }
    }
    b.exit()
}

fn lower_cst(b: &mut TraceBuilder, raw: &RawCst) -> Result<CstId> {
    match raw {
        RawCst::Terminal { start, end } => b.terminal(Interval::new(*start, *end)),
        RawCst::Iter {
            start,
            end,
            children,
        } => {
            let children = lower_cst_children(b, children)?;
            b.iter(Interval::new(*start, *end), children)
        }
        RawCst::Nonterminal {
            rule,
            start,
            end,
            children,
        } => {
            let children = lower_cst_children(b, children)?;
            b.nonterminal(rule.as_str(), Interval::new(*start, *end), children)
        }
    }
}

fn lower_cst_children(b: &mut TraceBuilder, children: &[RawCst]) -> Result<Vec<CstId>> {
    children.iter().map(|c| lower_cst(b, c)).collect()
}
