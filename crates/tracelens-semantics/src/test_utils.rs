use tracelens_core::{ExprKind, Interval, Trace, TraceBuilder, TraceId};

/// Trace of `start = letter+` over `input` (ASCII letters only).
///
/// Trace ids: `#0` start, `#1` letter+, one `letter` per character, then a
/// final failed `letter` without a binding. Every `letter` binds a
/// nonterminal over a single terminal.
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

/// Trace of `sum = num "+" num` with `num = digit` over `"1+2"`.
///
/// Trace ids: `#0` sum, `#1` first num, `#2` the `"+"` terminal, `#3` second
/// num.
pub fn sum_trace() -> Trace {
    let mut b = TraceBuilder::new("1+2");
    let one = b.terminal(Interval::new(0, 1)).unwrap();
    let lhs = b.nonterminal("num", Interval::new(0, 1), vec![one]).unwrap();
    let plus = b.terminal(Interval::new(1, 2)).unwrap();
    let two = b.terminal(Interval::new(2, 3)).unwrap();
    let rhs = b.nonterminal("num", Interval::new(2, 3), vec![two]).unwrap();
    let sum = b
        .nonterminal("sum", Interval::new(0, 3), vec![lhs, plus, rhs])
        .unwrap();

    let root = b.enter(ExprKind::Apply, "sum", Interval::new(0, 3)).unwrap();
    b.bind(root, sum);
    for (name, expr, span, cst) in [
        ("num", ExprKind::Apply, Interval::new(0, 1), lhs),
        ("\"+\"", ExprKind::Terminal, Interval::new(1, 2), plus),
        ("num", ExprKind::Apply, Interval::new(2, 3), rhs),
    ] {
        let id = b.enter(expr, name, span).unwrap();
        b.bind(id, cst);
        b.exit().unwrap();
    }
    b.exit().unwrap();
    b.build().unwrap()
}

pub fn id(trace: &Trace, index: usize) -> TraceId {
    trace.trace_id(index).unwrap()
}
