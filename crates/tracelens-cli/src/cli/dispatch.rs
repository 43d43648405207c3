//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;
use tracelens_semantics::Verbosity;

use super::ColorChoice;
use crate::commands::eval::EvalArgs;
use crate::commands::walk::WalkArgs;

pub struct WalkParams {
    pub trace_path: PathBuf,
    pub show_failures: bool,
    pub show_structure: bool,
    pub hidden_rules: Vec<String>,
    pub reverse: bool,
    pub at: Option<usize>,
    pub color: ColorChoice,
}

impl WalkParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            trace_path: trace_path(m),
            show_failures: m.get_flag("show_failures"),
            show_structure: m.get_flag("show_structure"),
            hidden_rules: m
                .get_many::<String>("hide")
                .map(|rules| rules.cloned().collect())
                .unwrap_or_default(),
            reverse: m.get_flag("reverse"),
            at: m.get_one::<usize>("at").copied(),
            color: parse_color(m),
        }
    }
}

impl From<WalkParams> for WalkArgs {
    fn from(p: WalkParams) -> Self {
        Self {
            trace_path: p.trace_path,
            show_failures: p.show_failures,
            show_structure: p.show_structure,
            hidden_rules: p.hidden_rules,
            reverse: p.reverse,
            at: p.at,
            color: p.color.should_colorize(),
        }
    }
}

pub struct EvalParams {
    pub trace_path: PathBuf,
    pub semantics_path: PathBuf,
    pub operation: Option<String>,
    pub args: Vec<String>,
    pub node: Option<usize>,
    pub all: bool,
    pub json: bool,
    pub trace: bool,
    pub verbose: u8,
    pub color: ColorChoice,
}

impl EvalParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            trace_path: trace_path(m),
            semantics_path: m
                .get_one::<PathBuf>("semantics_path")
                .cloned()
                .expect("clap enforces required --semantics"),
            operation: m.get_one::<String>("operation").cloned(),
            args: m
                .get_many::<String>("arg")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            node: m.get_one::<usize>("node").copied(),
            all: m.get_flag("all"),
            json: m.get_flag("json"),
            trace: m.get_flag("trace"),
            verbose: m.get_count("verbose"),
            color: parse_color(m),
        }
    }
}

impl From<EvalParams> for EvalArgs {
    fn from(p: EvalParams) -> Self {
        let verbosity = match p.verbose {
            0 => Verbosity::Default,
            1 => Verbosity::Verbose,
            _ => Verbosity::VeryVerbose,
        };

        Self {
            trace_path: p.trace_path,
            semantics_path: p.semantics_path,
            operation: p.operation,
            args: p.args,
            node: p.node,
            all: p.all,
            json: p.json,
            trace: p.trace,
            verbosity,
            color: p.color.should_colorize(),
        }
    }
}

fn trace_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("trace_path")
        .cloned()
        .expect("clap enforces required TRACE")
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
