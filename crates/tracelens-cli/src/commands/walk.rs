//! Replay the enter/exit steps of a trace.

use std::fmt::Write;
use std::path::PathBuf;

use tracelens_core::{
    Colors, LabelPolicy, NodeState, StepKind, Timeline, TraceView, TraceWalker, TreeView,
    ViewNode, WalkerOptions,
};

use super::load;

pub struct WalkArgs {
    pub trace_path: PathBuf,
    pub show_failures: bool,
    pub show_structure: bool,
    pub hidden_rules: Vec<String>,
    pub reverse: bool,
    pub at: Option<usize>,
    pub color: bool,
}

pub fn run(args: WalkArgs) {
    let trace = load::load_trace(&args.trace_path).unwrap_or_else(|e| {
        eprintln!("{}", e.render());
        std::process::exit(1);
    });

    let view = TraceView::new(&trace, policy(&args));
    let colors = Colors::new(args.color);
    let output = match args.at {
        Some(step) => render_states(&view, step, colors).unwrap_or_else(|msg| {
            eprintln!("error: {msg}");
            std::process::exit(1);
        }),
        None => render_walk(&view, args.reverse, colors),
    };
    print!("{output}");
}

pub fn policy(args: &WalkArgs) -> LabelPolicy {
    args.hidden_rules.iter().fold(
        LabelPolicy::new()
            .show_failures(args.show_failures)
            .show_structure(args.show_structure),
        |policy, rule| policy.hide_rule(rule.as_str()),
    )
}

/// One line per walker step, indented by labeled depth.
pub fn render_walk(view: &TraceView<'_>, reverse: bool, colors: Colors) -> String {
    let mut out = String::new();
    let mut walker = TraceWalker::with_options(
        view,
        WalkerOptions {
            start_at_end: reverse,
        },
    );

    let mut index = 0;
    loop {
        let node = if reverse {
            walker.previous_node()
        } else {
            walker.next_node()
        };
        let Some(node) = node else {
            break;
        };

        let mut depth = 0;
        walker.for_each_ancestor(|_| depth += 1);
        let marker = if view.is_leaf(node) {
            "*"
        } else if walker.is_exiting() {
            "<"
        } else {
            ">"
        };
        writeln!(
            out,
            "{} {}{marker} {}",
            colors.paint(colors.dim, format_args!("{index:<3}")),
            "  ".repeat(depth),
            label(view, node, colors)
        )
        .expect("String write never fails");
        index += 1;
    }
    out
}

/// The step at `step` followed by the state of every node at that point.
pub fn render_states(view: &TraceView<'_>, step: usize, colors: Colors) -> Result<String, String> {
    let timeline = Timeline::record(view);
    let Some(current) = timeline.step(step) else {
        return Err(format!(
            "step {step} is out of range (the walk has {} steps)",
            timeline.len()
        ));
    };

    let mut out = String::new();
    let kind = match current.kind {
        StepKind::Enter => "enter",
        StepKind::Exit => "exit",
    };
    writeln!(out, "step {step}: {kind} {}", label(view, current.node, colors))
        .expect("String write never fails");
    for node in timeline.nodes() {
        let state = match timeline.state_at(step, node) {
            NodeState::Hidden => colors.paint(colors.dim, "hidden   "),
            NodeState::Undecided => colors.paint(colors.yellow, "undecided"),
            NodeState::Decided => colors.paint(colors.green, "decided  "),
        };
        writeln!(out, "{state} {}", label(view, node, colors)).expect("String write never fails");
    }
    Ok(out)
}

/// `#id name start..end`, marking failed applications.
fn label(view: &TraceView<'_>, node: ViewNode, colors: Colors) -> String {
    let Some(id) = node.trace_id() else {
        return "(root)".to_owned();
    };
    let trace_node = view.trace().node(id);
    let mut text = format!(
        "{} {} {}",
        colors.paint(colors.dim, id),
        colors.paint(colors.blue, &trace_node.name),
        trace_node.interval
    );
    if !trace_node.succeeded {
        text.push_str(&colors.paint(colors.red, " (failed)"));
    }
    text
}
