use crate::test_utils::letters_trace;
use crate::timeline::{NodeState, StepKind, Timeline};
use crate::view::{LabelPolicy, TraceView, ViewNode};

#[test]
fn records_enter_and_exit_steps() {
    let trace = letters_trace("ab");
    let view = TraceView::new(&trace, LabelPolicy::default());
    let timeline = Timeline::record(&view);

    let kinds: Vec<_> = timeline.steps().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        [
            StepKind::Enter,
            StepKind::Enter,
            StepKind::Enter,
            StepKind::Enter,
            StepKind::Exit,
            StepKind::Exit
        ]
    );

    let root = ViewNode::Trace(trace.root().unwrap());
    let range = timeline.range(root).unwrap();
    assert_eq!((range.enter, range.exit), (0, Some(5)));

    let letter = ViewNode::Trace(trace.trace_id(2).unwrap());
    assert_eq!(timeline.range(letter).unwrap().exit, None);
    assert_eq!(timeline.nodes().count(), 4);
}

#[test]
fn node_state_while_scrubbing() {
    let trace = letters_trace("ab");
    let view = TraceView::new(&trace, LabelPolicy::default());
    let timeline = Timeline::record(&view);

    let plus = ViewNode::Trace(trace.trace_id(1).unwrap());
    let first = ViewNode::Trace(trace.trace_id(2).unwrap());
    let failed = ViewNode::Trace(trace.trace_id(4).unwrap());

    assert_eq!(timeline.state_at(0, plus), NodeState::Hidden);
    assert_eq!(timeline.state_at(1, plus), NodeState::Undecided);
    assert_eq!(timeline.state_at(3, plus), NodeState::Undecided);
    assert_eq!(timeline.state_at(4, plus), NodeState::Decided);

    assert_eq!(timeline.state_at(1, first), NodeState::Hidden);
    assert_eq!(timeline.state_at(2, first), NodeState::Decided);

    for step in 0..timeline.len() {
        assert_eq!(timeline.state_at(step, failed), NodeState::Hidden);
    }
}

#[test]
fn empty_trace_has_empty_timeline() {
    let trace = crate::trace::Trace::builder("").build().unwrap();
    let view = TraceView::new(&trace, LabelPolicy::default());
    let timeline = Timeline::record(&view);
    assert!(timeline.is_empty());
    assert_eq!(timeline.step(0), None);
}
