//! Bidirectional walker over a filtered tree.
//!
//! The walker visits labeled nodes in document order and stops at every
//! interior node twice: once when entering it and once after all of its
//! labeled descendants, even if it has none. Leaves are visited once.
//!
//! Filtering follows DOM `TreeWalker` semantics: a skipped node is invisible
//! but its descendants are not, a rejected node hides its whole subtree.
//!
//! ```text
//!   (A (B) (C))   next: A B C C' A'   previous: A' C' C B A
//! ```
//!
//! `'` marks the exiting visit. `C` is interior without visible children.

use std::fmt::Debug;
use std::hash::Hash;

/// Decision of a view about one of its nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Labeled: the walker stops here.
    Accept,
    /// Unlabeled: invisible, but its descendants are still considered.
    Skip,
    /// Invisible together with everything below it.
    Reject,
}

/// Unfiltered navigation plus the filter and leaf predicates.
///
/// `root` is a container that is never visited itself.
pub trait TreeView {
    type Node: Copy + Eq + Hash + Debug;

    fn root(&self) -> Self::Node;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn filter(&self, node: Self::Node) -> Filter;

    /// Leaves get a single visit; every other node is entered and exited.
    fn is_leaf(&self, node: Self::Node) -> bool;

    /// Position in document order.
    fn order(&self, node: Self::Node) -> usize;
}

/// Cursor that only ever rests on accepted nodes (or the root).
struct FilteredCursor<'v, V: TreeView> {
    view: &'v V,
    root: V::Node,
    current: V::Node,
}

impl<V: TreeView> Clone for FilteredCursor<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: TreeView> Copy for FilteredCursor<'_, V> {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl<'v, V: TreeView> FilteredCursor<'v, V> {
    fn new(view: &'v V) -> Self {
        let root = view.root();
        Self {
            view,
            root,
            current: root,
        }
    }

    fn at_root(&self) -> bool {
        self.current == self.root
    }

    fn is_accepted(&self, node: V::Node) -> bool {
        self.view.filter(node) == Filter::Accept
    }

    fn child(&self, node: V::Node, dir: Direction) -> Option<V::Node> {
        match dir {
            Direction::Forward => self.view.first_child(node),
            Direction::Backward => self.view.last_child(node),
        }
    }

    fn sibling(&self, node: V::Node, dir: Direction) -> Option<V::Node> {
        match dir {
            Direction::Forward => self.view.next_sibling(node),
            Direction::Backward => self.view.previous_sibling(node),
        }
    }

    fn parent_node(&mut self) -> Option<V::Node> {
        let mut node = self.current;
        while node != self.root {
            node = self.view.parent(node)?;
            if node != self.root && self.is_accepted(node) {
                self.current = node;
                return Some(node);
            }
        }
        None
    }

    fn first_child(&mut self) -> Option<V::Node> {
        self.traverse_children(Direction::Forward)
    }

    fn last_child(&mut self) -> Option<V::Node> {
        self.traverse_children(Direction::Backward)
    }

    fn next_sibling(&mut self) -> Option<V::Node> {
        self.traverse_siblings(Direction::Forward)
    }

    fn previous_sibling(&mut self) -> Option<V::Node> {
        self.traverse_siblings(Direction::Backward)
    }

    fn traverse_children(&mut self, dir: Direction) -> Option<V::Node> {
        let mut node = self.child(self.current, dir)?;
        loop {
            match self.view.filter(node) {
                Filter::Accept => {
                    self.current = node;
                    return Some(node);
                }
                Filter::Skip => {
                    if let Some(child) = self.child(node, dir) {
                        node = child;
                        continue;
                    }
                }
                Filter::Reject => {}
            }

            // No way down: move to the next sibling, climbing out of skipped
            // ancestors until one has a sibling.
            loop {
                if let Some(sibling) = self.sibling(node, dir) {
                    node = sibling;
                    break;
                }
                let parent = self.view.parent(node)?;
                if parent == self.root || parent == self.current {
                    return None;
                }
                node = parent;
            }
        }
    }

    fn traverse_siblings(&mut self, dir: Direction) -> Option<V::Node> {
        let mut node = self.current;
        if node == self.root {
            return None;
        }
        loop {
            let mut sibling = self.sibling(node, dir);
            while let Some(candidate) = sibling {
                node = candidate;
                let filter = self.view.filter(node);
                if filter == Filter::Accept {
                    self.current = node;
                    return Some(node);
                }
                sibling = match filter {
                    Filter::Reject => None,
                    _ => self.child(node, dir),
                };
                if sibling.is_none() {
                    sibling = self.sibling(node, dir);
                }
            }

            node = self.view.parent(node)?;
            if node == self.root || self.is_accepted(node) {
                return None;
            }
        }
    }

    /// Next accepted node in preorder, ignoring enter/exit pairing.
    fn next_in_preorder(&mut self) -> Option<V::Node> {
        let mut node = self.current;
        let mut filter = Filter::Accept;
        loop {
            while filter != Filter::Reject {
                let Some(child) = self.view.first_child(node) else {
                    break;
                };
                node = child;
                filter = self.view.filter(node);
                if filter == Filter::Accept {
                    self.current = node;
                    return Some(node);
                }
            }

            let mut ancestor = node;
            node = loop {
                if ancestor == self.root {
                    return None;
                }
                if let Some(sibling) = self.view.next_sibling(ancestor) {
                    break sibling;
                }
                ancestor = self.view.parent(ancestor)?;
            };

            filter = self.view.filter(node);
            if filter == Filter::Accept {
                self.current = node;
                return Some(node);
            }
        }
    }
}

/// Construction options for [`TraceWalker`].
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkerOptions {
    /// Park the walker one position past the last node, so the first
    /// `previous_node` lands on it.
    pub start_at_end: bool,
}

/// Cursor over the dual enter/exit visit order of a filtered tree.
pub struct TraceWalker<'v, V: TreeView> {
    cursor: FilteredCursor<'v, V>,
    current_node: Option<V::Node>,
    exiting_current_node: bool,
    at_end: bool,
    furthest: V::Node,
}

impl<'v, V: TreeView> TraceWalker<'v, V> {
    pub fn new(view: &'v V) -> Self {
        Self::with_options(view, WalkerOptions::default())
    }

    pub fn with_options(view: &'v V, options: WalkerOptions) -> Self {
        let cursor = FilteredCursor::new(view);
        let mut walker = Self {
            cursor,
            current_node: None,
            exiting_current_node: false,
            at_end: false,
            furthest: cursor.root,
        };
        if options.start_at_end {
            walker.cursor.last_child();
            walker.at_end = true;
        }
        walker
    }

    pub fn current_node(&self) -> Option<V::Node> {
        self.current_node
    }

    /// Whether the current visit is the closing one of an interior node.
    pub fn is_exiting(&self) -> bool {
        self.exiting_current_node
    }

    pub fn is_at_end(&self) -> bool {
        self.at_end
    }

    fn is_interior(&self, node: V::Node) -> bool {
        !self.cursor.view.is_leaf(node)
    }

    fn is_on_interior_node(&self) -> bool {
        self.current_node.is_some_and(|n| self.is_interior(n))
    }

    fn is_in_initial_state(&self) -> bool {
        self.current_node.is_none() && self.cursor.at_root()
    }

    /// Advance one step. Returns `None` once past the last node; the walker
    /// then stays parked there.
    pub fn next_node(&mut self) -> Option<V::Node> {
        if !self.exiting_current_node && (self.is_on_interior_node() || self.is_in_initial_state())
        {
            match self.cursor.first_child() {
                Some(child) => {
                    self.current_node = Some(child);
                    self.exiting_current_node = false;
                }
                // Interior node without visible children: exit it right away.
                None if self.current_node.is_some() => {
                    self.exiting_current_node = true;
                }
                None => {
                    self.at_end = true;
                }
            }
        } else {
            match self.cursor.next_sibling() {
                Some(sibling) => {
                    self.current_node = Some(sibling);
                    self.exiting_current_node = false;
                }
                None => {
                    self.current_node = self.cursor.parent_node();
                    self.exiting_current_node = self.current_node.is_some();
                }
            }
            if self.current_node.is_none() {
                self.at_end = true;
            }
        }

        if let Some(node) = self.current_node {
            self.note_progress(node);
        }
        self.current_node
    }

    /// Step back; the exact inverse of [`next_node`](Self::next_node).
    pub fn previous_node(&mut self) -> Option<V::Node> {
        if self.exiting_current_node {
            match self.cursor.last_child() {
                Some(child) => {
                    self.current_node = Some(child);
                    self.exiting_current_node = self.is_interior(child);
                }
                None => {
                    self.exiting_current_node = false;
                }
            }
            return self.current_node;
        }

        if self.at_end {
            self.at_end = false;
            if self.cursor.at_root() {
                return None;
            }
            let node = self.cursor.current;
            self.current_node = Some(node);
            self.exiting_current_node = self.is_interior(node);
        } else if let Some(sibling) = self.cursor.previous_sibling() {
            self.current_node = Some(sibling);
            self.exiting_current_node = self.is_interior(sibling);
        } else {
            self.current_node = self.cursor.parent_node();
            self.exiting_current_node = false;
        }

        if self.current_node.is_none() {
            self.cursor.current = self.cursor.root;
        }
        self.current_node
    }

    /// Jump to `node` as if it had just been entered.
    pub fn step_into(&mut self, node: V::Node) {
        self.reposition(node, false);
    }

    /// Jump to `node` as if it had just been exited. Leaves have no exiting
    /// visit, so stepping out of a leaf lands on its single visit.
    pub fn step_out(&mut self, node: V::Node) {
        let exiting = self.is_interior(node);
        self.reposition(node, exiting);
    }

    fn reposition(&mut self, node: V::Node, exiting: bool) {
        self.cursor.current = node;
        self.current_node = Some(node);
        self.exiting_current_node = exiting;
        self.at_end = false;
    }

    fn note_progress(&mut self, node: V::Node) {
        let view = self.cursor.view;
        if self.furthest == self.cursor.root || view.order(node) > view.order(self.furthest) {
            self.furthest = node;
        }
    }

    /// Call `f` on each labeled ancestor of the current node, innermost first.
    pub fn for_each_ancestor(&self, mut f: impl FnMut(V::Node)) {
        let Some(mut node) = self.current_node else {
            return;
        };
        let view = self.cursor.view;
        while let Some(parent) = view.parent(node) {
            if parent == self.cursor.root {
                break;
            }
            if view.filter(parent) == Filter::Accept {
                f(parent);
            }
            node = parent;
        }
    }

    /// Call `f` on every labeled node after the furthest one reached so far,
    /// in document order.
    pub fn for_each_past_furthest(&self, mut f: impl FnMut(V::Node)) {
        let mut cursor = self.cursor;
        cursor.current = self.furthest;
        while let Some(node) = cursor.next_in_preorder() {
            f(node);
        }
    }
}
