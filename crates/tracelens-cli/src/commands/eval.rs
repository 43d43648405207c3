//! Evaluate semantic actions over a trace.

use std::fmt::Write;
use std::path::PathBuf;

use serde::Serialize;
use tracelens_core::{Colors, Trace};
use tracelens_semantics::{
    Args, Evaluator, Outcome, PrintTracer, ResultWrapper, Semantics, Value, Verbosity,
};

use super::load;

pub struct EvalArgs {
    pub trace_path: PathBuf,
    pub semantics_path: PathBuf,
    pub operation: Option<String>,
    pub args: Vec<String>,
    pub node: Option<usize>,
    pub all: bool,
    pub json: bool,
    pub trace: bool,
    pub verbosity: Verbosity,
    pub color: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("no trace node #{0}")]
    NoNode(usize),

    #[error("the trace is empty")]
    EmptyTrace,

    #[error("no operations are declared")]
    NoOperations,

    #[error(transparent)]
    Semantics(#[from] tracelens_semantics::Error),

    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}

/// What `eval` prints: evaluation events (for `--trace`), then the results.
#[derive(Debug)]
pub struct EvalReport {
    pub trace: Vec<String>,
    pub output: String,
}

pub fn run(args: EvalArgs) {
    let trace = load::load_trace(&args.trace_path).unwrap_or_else(|e| {
        eprintln!("{}", e.render());
        std::process::exit(1);
    });
    let semantics = load::load_semantics(&args.semantics_path, args.color).unwrap_or_else(|e| {
        eprintln!("{}", e.render());
        std::process::exit(1);
    });

    let colors = Colors::new(args.color);
    let report = evaluate(&trace, &semantics, &args, colors).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if args.trace {
        for line in &report.trace {
            println!("{line}");
        }
        println!("{}---{}", colors.dim, colors.reset);
    }
    print!("{}", report.output);
}

pub fn evaluate(
    trace: &Trace,
    semantics: &Semantics,
    args: &EvalArgs,
    colors: Colors,
) -> Result<EvalReport, EvalError> {
    let node = match args.node {
        Some(index) => trace.trace_id(index).ok_or(EvalError::NoNode(index))?,
        None => trace.root().ok_or(EvalError::EmptyTrace)?,
    };
    let cst = trace
        .binding(node)
        .ok_or(tracelens_semantics::Error::NoBinding(node))?;
    let key = trace.node_key(cst);

    let tracer = PrintTracer::new(args.verbosity, colors);
    let mut evaluator = Evaluator::with_tracer(semantics, trace, tracer);

    let results: Vec<(String, Vec<ResultWrapper>)> = if args.all {
        evaluator.set_selected_operation(args.operation.as_deref());
        evaluator
            .get_results(node)?
            .map(|results| {
                results
                    .iter()
                    .map(|(op, entries)| (op.clone(), entries.clone()))
                    .collect()
            })
            .unwrap_or_default()
    } else {
        let operation = match &args.operation {
            Some(op) => op.clone(),
            None => semantics
                .operations()
                .next()
                .ok_or(EvalError::NoOperations)?
                .name()
                .to_owned(),
        };
        evaluator.set_selected_operation(Some(&operation));
        let values = (!args.args.is_empty())
            .then(|| args.args.iter().map(|arg| parse_arg(arg)).collect());
        let result = evaluator.render(node, &operation, values)?.clone();
        vec![(operation, vec![result])]
    };

    let output = if args.json {
        let report = NodeReport {
            node: key.to_string(),
            trace_id: node.index(),
            results: results
                .iter()
                .flat_map(|(op, entries)| entries.iter().map(move |r| ResultReport::new(op, r)))
                .collect(),
        };
        serde_json::to_string_pretty(&report)? + "\n"
    } else {
        let mut out = format!("{}\n", colors.paint(colors.blue, &key));
        for (op, entries) in &results {
            for result in entries {
                writeln!(out, "  {}", format_result(op, result, colors))
                    .expect("String write never fails");
            }
        }
        out
    };

    Ok(EvalReport {
        trace: evaluator.tracer().lines().to_vec(),
        output,
    })
}

/// Command-line argument values are JSON when they parse as JSON, plain
/// strings otherwise.
pub fn parse_arg(text: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|json| Value::from(&json))
        .unwrap_or_else(|_| Value::from(text))
}

/// `op(args) = outcome [flags]`
pub fn format_result(operation: &str, result: &ResultWrapper, colors: Colors) -> String {
    let mut line = operation.to_owned();
    if let Some(args) = result.args() {
        line.push_str(&args.to_string());
    }
    line.push_str(" = ");
    line.push_str(&match result.outcome() {
        Outcome::Value(v) => colors.paint(colors.green, v),
        Outcome::Missing => colors.paint(colors.yellow, "missing (no semantic action)"),
        Outcome::Error(e) => colors.paint(colors.red, format_args!("error: {e}")),
    });

    let flags: Vec<&str> = [
        (result.is_forced(), "forced"),
        (result.is_pass_through(), "pass-through"),
        (result.is_next_step(), "next-step"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();
    if !flags.is_empty() {
        line.push(' ');
        line.push_str(&colors.paint(colors.dim, format_args!("[{}]", flags.join(", "))));
    }
    line
}

#[derive(Serialize)]
struct NodeReport<'r> {
    node: String,
    trace_id: usize,
    results: Vec<ResultReport<'r>>,
}

#[derive(Serialize)]
struct ResultReport<'r> {
    operation: &'r str,
    args: Option<&'r Args>,
    outcome: &'static str,
    value: Option<&'r Value>,
    error: Option<ErrorReport>,
    forced: bool,
    pass_through: bool,
    next_step: bool,
}

#[derive(Serialize)]
struct ErrorReport {
    message: String,
    raised_by: String,
}

impl<'r> ResultReport<'r> {
    fn new(operation: &'r str, result: &'r ResultWrapper) -> Self {
        let outcome = match result.outcome() {
            Outcome::Value(_) => "value",
            Outcome::Missing => "missing",
            Outcome::Error(_) => "error",
        };
        Self {
            operation,
            args: result.args(),
            outcome,
            value: result.value(),
            error: result.outcome().error().map(|e| ErrorReport {
                message: e.message().to_owned(),
                raised_by: e.causing_key().to_string(),
            }),
            forced: result.is_forced(),
            pass_through: result.is_pass_through(),
            next_step: result.is_next_step(),
        }
    }
}
