use crate::trace::{ExprKind, Interval, Trace, TraceBuilder};

/// Trace of `start = letter+` over `input` (ASCII letters only), including
/// the final failed attempt to match one more letter.
pub fn letters_trace(input: &str) -> Trace {
    let len = input.len();
    let mut b = TraceBuilder::new(input);
    b.primitive_rule("letter");

    let letters: Vec<_> = (0..len)
        .map(|i| {
            let span = Interval::new(i, i + 1);
            let terminal = b.terminal(span).unwrap();
            b.nonterminal("letter", span, vec![terminal]).unwrap()
        })
        .collect();
    let iter = b.iter(Interval::new(0, len), letters.clone()).unwrap();
    let start = b.nonterminal("start", Interval::new(0, len), vec![iter]).unwrap();

    let root = b.enter(ExprKind::Apply, "start", Interval::new(0, len)).unwrap();
    b.bind(root, start);
    let plus = b.enter(ExprKind::Iter, "letter+", Interval::new(0, len)).unwrap();
    b.bind(plus, iter);
    for (i, letter) in letters.iter().enumerate() {
        let id = b.enter(ExprKind::Apply, "letter", Interval::new(i, i + 1)).unwrap();
        b.bind(id, *letter);
        b.exit().unwrap();
    }
    let tail = b.enter(ExprKind::Apply, "letter", Interval::new(len, len)).unwrap();
    b.mark_failed(tail);
    b.exit().unwrap();
    b.exit().unwrap();
    b.exit().unwrap();
    b.build().unwrap()
}
