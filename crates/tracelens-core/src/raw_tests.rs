use indoc::indoc;

use crate::Error;
use crate::trace::{CstKind, ExprKind, Trace};

const LETTERS: &str = indoc! {r#"
    {
      "input": "ab",
      "primitive_rules": ["letter"],
      "root": {
        "expr": "apply",
        "name": "start",
        "start": 0,
        "end": 2,
        "bindings": [
          {
            "kind": "nonterminal",
            "rule": "start",
            "start": 0,
            "end": 2,
            "children": [
              {
                "kind": "iter",
                "start": 0,
                "end": 2,
                "children": [
                  { "kind": "terminal", "start": 0, "end": 1 },
                  { "kind": "terminal", "start": 1, "end": 2 }
                ]
              }
            ]
          }
        ],
        "children": [
          {
            "expr": "iter",
            "name": "letter+",
            "start": 0,
            "end": 2,
            "children": [
              { "expr": "apply", "name": "letter", "start": 0, "end": 1 },
              { "expr": "apply", "name": "letter", "start": 1, "end": 2 },
              { "expr": "apply", "name": "letter", "start": 2, "end": 2, "succeeded": false }
            ]
          }
        ]
      }
    }
"#};

#[test]
fn loads_nested_document() {
    let trace = Trace::from_json(LETTERS).unwrap();
    assert_eq!(trace.input(), "ab");
    assert_eq!(trace.len(), 5);
    assert!(trace.is_primitive_rule("letter"));

    let root = trace.root().unwrap();
    assert_eq!(trace.node(root).expr, ExprKind::Apply);
    let start = trace.binding(root).unwrap();
    assert_eq!(trace.cst(start).ctor_name(), "start");

    let iter = trace.cst(start).children[0];
    assert_eq!(trace.cst(iter).kind, CstKind::Iter);
    let second = trace.cst(iter).children[1];
    assert_eq!(trace.source_string(second), "b");

    let failed = trace.trace_id(4).unwrap();
    assert!(!trace.node(failed).succeeded);
    assert!(trace.node(trace.trace_id(2).unwrap()).succeeded);
}

#[test]
fn null_child_is_left_recursion_placeholder() {
    let json = indoc! {r#"
        {
          "input": "",
          "root": { "expr": "apply", "name": "expr", "start": 0, "end": 0, "children": [null] }
        }
    "#};
    let trace = Trace::from_json(json).unwrap();
    let root = trace.root().unwrap();
    assert!(trace.node(root).is_lr_base_case());
    assert!(trace.is_leaf(root));
}

#[test]
fn document_without_root_is_empty() {
    let trace = Trace::from_json(r#"{ "input": "abc", "root": null }"#).unwrap();
    assert!(trace.is_empty());
    assert_eq!(trace.root(), None);
}

#[test]
fn rejects_intervals_outside_input() {
    let json = r#"{ "input": "a", "root": { "expr": "terminal", "start": 0, "end": 4 } }"#;
    let err = Trace::from_json(json).unwrap_err();
    assert!(matches!(err, Error::IntervalOutOfBounds { end: 4, .. }));
    assert_eq!(
        err.to_string(),
        "interval 0..4 is outside the input (length 1)"
    );
}

#[test]
fn rejects_unknown_expression_kind() {
    let json = r#"{ "input": "a", "root": { "expr": "star", "start": 0, "end": 1 } }"#;
    assert!(matches!(Trace::from_json(json), Err(Error::Json(_))));
}
