//! Enter/exit step sequence for animated replay of a trace.
//!
//! A timeline is the walker's full forward pass, recorded once. Scrubbing to
//! step `n` then decides, per node, whether it is hidden (not reached yet),
//! undecided (entered, not yet exited), or decided.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::walker::{TraceWalker, TreeView};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepKind {
    Enter,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseStep<N> {
    pub kind: StepKind,
    pub node: N,
}

/// Step indices at which a node is entered and exited. Leaves have no exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepRange {
    pub enter: usize,
    pub exit: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Hidden,
    Undecided,
    Decided,
}

#[derive(Clone, Debug)]
pub struct Timeline<N> {
    steps: Vec<ParseStep<N>>,
    ranges: IndexMap<N, StepRange>,
}

impl<N: Copy + Eq + Hash> Timeline<N> {
    pub fn record<V: TreeView<Node = N>>(view: &V) -> Self {
        let mut walker = TraceWalker::new(view);
        let mut steps = Vec::new();
        let mut ranges: IndexMap<N, StepRange> = IndexMap::new();

        while let Some(node) = walker.next_node() {
            let index = steps.len();
            let kind = if walker.is_exiting() {
                if let Some(range) = ranges.get_mut(&node) {
                    range.exit = Some(index);
                }
                StepKind::Exit
            } else {
                ranges.insert(
                    node,
                    StepRange {
                        enter: index,
                        exit: None,
                    },
                );
                StepKind::Enter
            };
            steps.push(ParseStep { kind, node });
        }

        Self { steps, ranges }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ParseStep<N>] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&ParseStep<N>> {
        self.steps.get(index)
    }

    pub fn range(&self, node: N) -> Option<&StepRange> {
        self.ranges.get(&node)
    }

    /// Visited nodes in order of their enter step.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.ranges.keys().copied()
    }

    pub fn state_at(&self, step: usize, node: N) -> NodeState {
        let Some(range) = self.ranges.get(&node) else {
            return NodeState::Hidden;
        };
        if range.enter > step {
            return NodeState::Hidden;
        }
        match range.exit {
            Some(exit) if exit > step => NodeState::Undecided,
            _ => NodeState::Decided,
        }
    }
}
