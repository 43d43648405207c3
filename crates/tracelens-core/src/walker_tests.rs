use crate::walker::{Filter, TraceWalker, TreeView, WalkerOptions};

/// Hand-built tree with explicit filter and leaf flags per node.
struct Fixture {
    items: Vec<Item>,
}

struct Item {
    name: &'static str,
    parent: Option<usize>,
    children: Vec<usize>,
    filter: Filter,
    leaf: bool,
}

impl Fixture {
    fn new() -> Self {
        Self {
            items: vec![Item {
                name: "root",
                parent: None,
                children: Vec::new(),
                filter: Filter::Skip,
                leaf: false,
            }],
        }
    }

    fn add(&mut self, parent: usize, name: &'static str, filter: Filter, leaf: bool) -> usize {
        let id = self.items.len();
        self.items.push(Item {
            name,
            parent: Some(parent),
            children: Vec::new(),
            filter,
            leaf,
        });
        self.items[parent].children.push(id);
        id
    }

    fn find(&self, name: &str) -> usize {
        self.items
            .iter()
            .position(|item| item.name == name)
            .expect("fixture node exists")
    }

    fn sibling_at(&self, node: usize, offset: isize) -> Option<usize> {
        let parent = self.items[node].parent?;
        let siblings = &self.items[parent].children;
        let pos = siblings.iter().position(|&c| c == node)? as isize + offset;
        usize::try_from(pos).ok().and_then(|p| siblings.get(p).copied())
    }
}

impl TreeView for Fixture {
    type Node = usize;

    fn root(&self) -> usize {
        0
    }

    fn parent(&self, node: usize) -> Option<usize> {
        self.items[node].parent
    }

    fn first_child(&self, node: usize) -> Option<usize> {
        self.items[node].children.first().copied()
    }

    fn last_child(&self, node: usize) -> Option<usize> {
        self.items[node].children.last().copied()
    }

    fn next_sibling(&self, node: usize) -> Option<usize> {
        self.sibling_at(node, 1)
    }

    fn previous_sibling(&self, node: usize) -> Option<usize> {
        self.sibling_at(node, -1)
    }

    fn filter(&self, node: usize) -> Filter {
        self.items[node].filter
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.items[node].leaf
    }

    fn order(&self, node: usize) -> usize {
        node
    }
}

/// ```text
/// root
///   p
///     node0
///       p
///         pexpr
///           node1      (leaf)
///         node2        (interior, no children)
///     node4            (leaf)
/// ```
fn sample_tree(with_node4: bool) -> Fixture {
    let mut t = Fixture::new();
    let outer = t.add(0, "p", Filter::Skip, false);
    let node0 = t.add(outer, "node0", Filter::Accept, false);
    let inner = t.add(node0, "p", Filter::Skip, false);
    let pexpr = t.add(inner, "pexpr", Filter::Skip, false);
    t.add(pexpr, "node1", Filter::Accept, true);
    t.add(inner, "node2", Filter::Accept, false);
    if with_node4 {
        t.add(outer, "node4", Filter::Accept, true);
    }
    t
}

fn label(t: &Fixture, w: &TraceWalker<'_, Fixture>, node: Option<usize>) -> String {
    match node {
        Some(n) if w.is_exiting() => format!("{}'", t.items[n].name),
        Some(n) => t.items[n].name.to_string(),
        None => "-".to_string(),
    }
}

fn next(t: &Fixture, w: &mut TraceWalker<'_, Fixture>) -> String {
    let node = w.next_node();
    label(t, w, node)
}

fn prev(t: &Fixture, w: &mut TraceWalker<'_, Fixture>) -> String {
    let node = w.previous_node();
    label(t, w, node)
}

fn state(w: &TraceWalker<'_, Fixture>) -> (Option<usize>, bool) {
    (w.current_node(), w.is_exiting())
}

#[test]
fn next_node_enters_and_exits_interior_nodes() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);
    assert_eq!(state(&w), (None, false));

    let steps: Vec<_> = (0..8).map(|_| next(&t, &mut w)).collect();
    assert_eq!(
        steps,
        ["node0", "node1", "node2", "node2'", "node0'", "node4", "-", "-"]
    );
    assert!(w.is_at_end());
}

#[test]
fn previous_node_retraces_forward_walk() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);
    for _ in 0..6 {
        w.next_node();
    }
    assert_eq!(label(&t, &w, w.current_node()), "node4");

    let steps: Vec<_> = (0..6).map(|_| prev(&t, &mut w)).collect();
    assert_eq!(
        steps,
        ["node0'", "node2'", "node2", "node1", "node0", "-"]
    );
}

#[test]
fn previous_node_at_start_has_no_effect() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);

    assert_eq!(prev(&t, &mut w), "-");
    assert_eq!(state(&w), (None, false));
    assert!(!w.is_at_end());
    assert_eq!(next(&t, &mut w), "node0");
}

#[test]
fn mixing_directions() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);

    assert_eq!(next(&t, &mut w), "node0");
    assert_eq!(prev(&t, &mut w), "-");
    assert_eq!(next(&t, &mut w), "node0");
    assert_eq!(next(&t, &mut w), "node1");
    assert_eq!(prev(&t, &mut w), "node0");
    assert_eq!(next(&t, &mut w), "node1");
    assert_eq!(next(&t, &mut w), "node2");
    assert_eq!(next(&t, &mut w), "node2'");
    assert_eq!(prev(&t, &mut w), "node2");
    assert_eq!(next(&t, &mut w), "node2'");
    assert_eq!(next(&t, &mut w), "node0'");
    assert_eq!(next(&t, &mut w), "node4");
    assert_eq!(next(&t, &mut w), "-");
}

#[test]
fn start_at_end_lands_on_last_leaf() {
    let t = sample_tree(true);
    let options = WalkerOptions { start_at_end: true };
    let mut w = TraceWalker::with_options(&t, options);
    assert!(w.is_at_end());
    assert_eq!(w.current_node(), None);

    assert_eq!(prev(&t, &mut w), "node4");
    assert!(!w.is_at_end());
    assert_eq!(next(&t, &mut w), "-");
    assert_eq!(prev(&t, &mut w), "node4");
}

#[test]
fn start_at_end_lands_on_exit_of_last_interior_node() {
    let t = sample_tree(false);
    let options = WalkerOptions { start_at_end: true };
    let mut w = TraceWalker::with_options(&t, options);

    assert_eq!(prev(&t, &mut w), "node0'");
    assert_eq!(next(&t, &mut w), "-");
    assert_eq!(prev(&t, &mut w), "node0'");
}

#[test]
fn walking_back_from_the_end() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);
    while w.next_node().is_some() {}

    assert_eq!(prev(&t, &mut w), "node4");
    assert_eq!(next(&t, &mut w), "-");
    assert_eq!(next(&t, &mut w), "-");
    assert_eq!(prev(&t, &mut w), "node4");
    assert_eq!(prev(&t, &mut w), "node0'");
}

#[test]
fn step_into_repositions_as_entering() {
    let t = sample_tree(true);
    let node0 = t.find("node0");
    let node1 = t.find("node1");
    let mut w = TraceWalker::new(&t);

    w.step_into(node0);
    assert_eq!(state(&w), (Some(node0), false));
    assert_eq!(prev(&t, &mut w), "-");

    w.step_into(node0);
    assert_eq!(next(&t, &mut w), "node1");
    assert_eq!(next(&t, &mut w), "node2");
    assert_eq!(next(&t, &mut w), "node2'");

    w.step_into(node1);
    assert_eq!(state(&w), (Some(node1), false));
    assert_eq!(next(&t, &mut w), "node2");
}

#[test]
fn step_into_leaves_the_end() {
    let t = sample_tree(true);
    let options = WalkerOptions { start_at_end: true };
    let mut w = TraceWalker::with_options(&t, options);
    assert!(w.is_at_end());

    w.step_into(t.find("node0"));
    assert!(!w.is_at_end());
}

#[test]
fn step_out_repositions_as_exiting() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);

    w.step_out(t.find("node0"));
    assert!(w.is_exiting());
    assert_eq!(prev(&t, &mut w), "node2'");

    w.step_out(t.find("node2"));
    assert!(w.is_exiting());
    assert_eq!(prev(&t, &mut w), "node2");

    w.step_out(t.find("node1"));
    assert!(!w.is_exiting());
    assert_eq!(next(&t, &mut w), "node2");
}

#[test]
fn n_steps_forward_then_back_restores_state() {
    let t = sample_tree(true);
    // Six visits plus the end sentinel.
    let total = 7;
    for start in 0..total {
        for n in 0..=(total - start) {
            let mut w = TraceWalker::new(&t);
            for _ in 0..start {
                w.next_node();
            }
            let before = state(&w);
            for _ in 0..n {
                w.next_node();
            }
            for _ in 0..n {
                w.previous_node();
            }
            assert_eq!(state(&w), before, "start={start} n={n}");
        }
    }
}

#[test]
fn interior_nodes_bracket_their_descendants() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);
    let mut visits = Vec::new();
    while let Some(node) = w.next_node() {
        visits.push((node, w.is_exiting()));
    }

    let node0 = t.find("node0");
    let enter = visits.iter().position(|&v| v == (node0, false)).unwrap();
    let exit = visits.iter().position(|&v| v == (node0, true)).unwrap();
    let inside: Vec<_> = visits[enter + 1..exit]
        .iter()
        .map(|&(n, _)| t.items[n].name)
        .collect();
    assert_eq!(inside, ["node1", "node2", "node2"]);
}

#[test]
fn rejected_node_hides_its_subtree() {
    let mut t = Fixture::new();
    let hidden = t.add(0, "hidden", Filter::Reject, false);
    t.add(hidden, "inner", Filter::Accept, true);
    t.add(0, "shown", Filter::Accept, true);
    let mut w = TraceWalker::new(&t);

    assert_eq!(next(&t, &mut w), "shown");
    assert_eq!(next(&t, &mut w), "-");
    assert_eq!(prev(&t, &mut w), "shown");
    assert_eq!(prev(&t, &mut w), "-");
}

#[test]
fn tree_without_labeled_nodes() {
    let mut t = Fixture::new();
    t.add(0, "p", Filter::Skip, false);

    let mut w = TraceWalker::new(&t);
    assert_eq!(next(&t, &mut w), "-");
    assert!(w.is_at_end());
    assert_eq!(next(&t, &mut w), "-");
    assert_eq!(prev(&t, &mut w), "-");

    let options = WalkerOptions { start_at_end: true };
    let mut w = TraceWalker::with_options(&t, options);
    assert_eq!(prev(&t, &mut w), "-");
}

#[test]
fn past_furthest_lists_unreached_nodes() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);
    let collect = |w: &TraceWalker<'_, Fixture>| {
        let mut names = Vec::new();
        w.for_each_past_furthest(|n| names.push(t.items[n].name));
        names
    };

    assert_eq!(collect(&w), ["node0", "node1", "node2", "node4"]);

    w.next_node();
    w.next_node();
    assert_eq!(collect(&w), ["node2", "node4"]);

    w.next_node();
    w.previous_node();
    assert_eq!(collect(&w), ["node4"]);
}

#[test]
fn ancestors_of_current_node() {
    let t = sample_tree(true);
    let mut w = TraceWalker::new(&t);
    w.step_into(t.find("node2"));

    let mut names = Vec::new();
    w.for_each_ancestor(|n| names.push(t.items[n].name));
    assert_eq!(names, ["node0"]);
}
