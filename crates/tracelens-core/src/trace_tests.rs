use crate::Error;
use crate::test_utils::letters_trace;
use crate::trace::{CstKind, ExprKind, Interval, TraceBuilder};

#[test]
fn ids_follow_preorder() {
    let trace = letters_trace("ab");
    let names: Vec<_> = trace.ids().map(|id| trace.node(id).name.as_str()).collect();
    assert_eq!(names, ["start", "letter+", "letter", "letter", "letter"]);

    let root = trace.root().unwrap();
    let plus = trace.trace_id(1).unwrap();
    assert_eq!(trace.parent(plus), Some(root));
    assert_eq!(trace.parent(root), None);
    assert_eq!(trace.trace_id(5), None);
}

#[test]
fn bindings_and_node_keys() {
    let trace = letters_trace("ab");
    let letter = trace.binding(trace.trace_id(3).unwrap()).unwrap();
    assert_eq!(trace.source_string(letter), "b");
    assert_eq!(trace.node_key(letter).to_string(), "letter_from_1_to_2");

    let plus = trace.binding(trace.trace_id(1).unwrap()).unwrap();
    assert_eq!(trace.cst(plus).kind, CstKind::Iter);
    assert_eq!(trace.cst(plus).ctor_name(), "_iter");
    assert_eq!(trace.cst(plus).children.len(), 2);

    let terminal = trace.cst(letter).children[0];
    assert_eq!(trace.node_key(terminal).to_string(), "_terminal_from_1_to_2");

    let failed = trace.trace_id(4).unwrap();
    assert!(!trace.node(failed).succeeded);
    assert_eq!(trace.binding(failed), None);
}

#[test]
fn same_match_shares_node_key() {
    let mut b = TraceBuilder::new("x");
    let first = b.nonterminal("item", Interval::new(0, 1), vec![]).unwrap();
    let second = b.nonterminal("item", Interval::new(0, 1), vec![]).unwrap();
    let other = b.nonterminal("other", Interval::new(0, 1), vec![]).unwrap();
    let trace = b.build().unwrap();

    assert_ne!(first, second);
    assert_eq!(trace.node_key(first), trace.node_key(second));
    assert_ne!(trace.node_key(first), trace.node_key(other));
}

#[test]
fn leaf_predicates() {
    let mut b = TraceBuilder::new("aa");
    let root = b.enter(ExprKind::Apply, "expr", Interval::new(0, 2)).unwrap();
    let seed = b.enter(ExprKind::Apply, "expr", Interval::new(0, 0)).unwrap();
    b.lr_base_case().unwrap();
    b.exit().unwrap();
    let lit = b.enter(ExprKind::Terminal, "\"a\"", Interval::new(0, 1)).unwrap();
    b.exit().unwrap();
    let empty = b.enter(ExprKind::Apply, "nothing", Interval::new(1, 1)).unwrap();
    b.exit().unwrap();
    b.exit().unwrap();
    let trace = b.build().unwrap();

    assert!(!trace.is_leaf(root));
    assert!(trace.node(seed).is_lr_base_case());
    assert!(trace.is_leaf(seed));
    assert!(trace.is_primitive(lit));
    assert!(trace.is_leaf(lit));
    assert!(!trace.is_primitive(empty));
    assert!(trace.is_leaf(empty));
}

#[test]
fn siblings_skip_placeholders() {
    let mut b = TraceBuilder::new("ab");
    b.enter(ExprKind::Seq, "", Interval::new(0, 2)).unwrap();
    let a = b.enter(ExprKind::Terminal, "\"a\"", Interval::new(0, 1)).unwrap();
    b.exit().unwrap();
    b.lr_base_case().unwrap();
    let c = b.enter(ExprKind::Terminal, "\"b\"", Interval::new(1, 2)).unwrap();
    b.exit().unwrap();
    b.exit().unwrap();
    let trace = b.build().unwrap();

    assert_eq!(trace.next_sibling(a), Some(c));
    assert_eq!(trace.previous_sibling(c), Some(a));
    assert_eq!(trace.previous_sibling(a), None);
    assert_eq!(trace.next_sibling(c), None);
    assert_eq!(trace.children(trace.root().unwrap()).count(), 2);
}

#[test]
fn builder_rejects_malformed_traces() {
    let mut b = TraceBuilder::new("ab");
    assert!(matches!(b.exit(), Err(Error::UnbalancedExit)));
    assert!(matches!(b.lr_base_case(), Err(Error::OrphanPlaceholder)));
    assert!(matches!(
        b.terminal(Interval::new(1, 3)),
        Err(Error::IntervalOutOfBounds { start: 1, end: 3, len: 2 })
    ));
    assert!(matches!(
        b.terminal(Interval::new(2, 1)),
        Err(Error::ReversedInterval { .. })
    ));

    b.enter(ExprKind::Apply, "a", Interval::new(0, 1)).unwrap();
    b.exit().unwrap();
    assert!(matches!(
        b.enter(ExprKind::Apply, "b", Interval::new(1, 2)),
        Err(Error::MultipleRoots)
    ));

    let mut open = TraceBuilder::new("");
    open.enter(ExprKind::Apply, "a", Interval::new(0, 0)).unwrap();
    assert!(matches!(open.build(), Err(Error::UnclosedNodes(1))));
}

#[test]
fn intervals_must_respect_char_boundaries() {
    let mut b = TraceBuilder::new("é");
    assert!(matches!(
        b.terminal(Interval::new(0, 1)),
        Err(Error::SplitCharacter { .. })
    ));
    let whole = b.terminal(Interval::new(0, 2)).unwrap();
    let trace = b.build().unwrap();
    assert_eq!(trace.source_string(whole), "é");
}
