use tracelens_core::NodeKey;

use crate::cache::{ResultCache, ResultWrapper};
use crate::operation::{Args, Operation, OperationKind};
use crate::outcome::{Outcome, Scratch};
use crate::value::Value;

fn node(start: usize, end: usize) -> NodeKey {
    NodeKey {
        ctor_name: "expr".to_owned(),
        start,
        end,
    }
}

fn wrapper(value: f64, args: &Args, forced: bool) -> ResultWrapper {
    ResultWrapper {
        outcome: Outcome::Value(Value::Number(value)),
        args: args.signature(),
        forced,
        for_calling_semantic: false,
        is_pass_through: false,
        is_next_step: false,
        replay: Scratch::default(),
    }
}

fn show() -> Operation {
    Operation::new(
        "show".to_owned(),
        OperationKind::Operation,
        vec!["depth".to_owned()],
    )
}

#[test]
fn equal_argument_bindings_share_an_entry() {
    let op = show();
    let one = op.bind_args(vec![Value::Number(1.0)]).unwrap();
    let same = op.bind_args(vec![Value::Number(1.0)]).unwrap();
    let two = op.bind_args(vec![Value::Number(2.0)]).unwrap();

    let mut cache = ResultCache::new();
    cache.insert(node(0, 1), "show", wrapper(10.0, &one, true));
    cache.insert(node(0, 1), "show", wrapper(99.0, &same, true));
    cache.insert(node(0, 1), "show", wrapper(20.0, &two, true));

    let entries = &cache.node_results(&node(0, 1)).unwrap()["show"];
    assert_eq!(entries.len(), 2);
    assert_eq!(
        cache.get(&node(0, 1), "show", &same).unwrap().value(),
        Some(&Value::Number(10.0))
    );
    assert_eq!(
        cache.get(&node(0, 1), "show", &two).unwrap().value(),
        Some(&Value::Number(20.0))
    );
    assert!(cache.get(&node(0, 2), "show", &one).is_none());
}

#[test]
fn results_without_arguments_have_no_signature() {
    let mut cache = ResultCache::new();
    cache.insert(node(0, 1), "eval", wrapper(1.0, &Args::new(), false));

    let entry = cache.get(&node(0, 1), "eval", &Args::new()).unwrap();
    assert!(entry.args().is_none());

    let op = show();
    let bound = op.bind_args(vec![Value::Null]).unwrap();
    assert!(cache.get(&node(0, 1), "eval", &bound).is_none());
}

#[test]
fn lookup_outside_forcing_clears_forced_for_good() {
    let args = Args::new();
    let mut cache = ResultCache::new();
    cache.insert(node(0, 1), "eval", wrapper(1.0, &args, true));
    assert!(cache.all_forced(&node(0, 1)));

    cache.lookup(&node(0, 1), "eval", &args, true);
    assert!(cache.all_forced(&node(0, 1)));

    cache.lookup(&node(0, 1), "eval", &args, false);
    assert!(!cache.all_forced(&node(0, 1)));

    cache.lookup(&node(0, 1), "eval", &args, true);
    cache.insert(node(0, 1), "eval", wrapper(1.0, &args, true));
    assert!(!cache.get(&node(0, 1), "eval", &args).unwrap().is_forced());
}

#[test]
fn all_forced_needs_every_operation() {
    let args = Args::new();
    let mut cache = ResultCache::new();
    assert!(!cache.all_forced(&node(0, 1)));

    cache.insert(node(0, 1), "eval", wrapper(1.0, &args, true));
    cache.insert(node(0, 1), "width", wrapper(1.0, &args, false));
    assert!(!cache.all_forced(&node(0, 1)));

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
}
