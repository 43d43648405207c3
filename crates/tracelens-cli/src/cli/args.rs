//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that commands compose.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Trace document (positional).
pub fn trace_path_arg() -> Arg {
    Arg::new("trace_path")
        .value_name("TRACE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Trace document (JSON)")
}

/// Semantics document (-S/--semantics).
pub fn semantics_path_arg() -> Arg {
    Arg::new("semantics_path")
        .short('S')
        .long("semantics")
        .value_name("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Semantics document (JSON)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Label failed applications (--show-failures).
pub fn show_failures_arg() -> Arg {
    Arg::new("show_failures")
        .long("show-failures")
        .action(ArgAction::SetTrue)
        .help("Show failed applications and what they tried")
}

/// Label sequences and alternations (--show-structure).
pub fn show_structure_arg() -> Arg {
    Arg::new("show_structure")
        .long("show-structure")
        .action(ArgAction::SetTrue)
        .help("Show sequence and alternation nodes")
}

/// Hide applications of a rule (--hide, repeatable).
pub fn hide_arg() -> Arg {
    Arg::new("hide")
        .long("hide")
        .value_name("RULE")
        .action(ArgAction::Append)
        .help("Hide applications of RULE and everything below them")
}

/// Walk backwards from the end (--reverse).
pub fn reverse_arg() -> Arg {
    Arg::new("reverse")
        .long("reverse")
        .action(ArgAction::SetTrue)
        .help("Walk backwards from the end")
}

/// Timeline position (--at).
pub fn at_arg() -> Arg {
    Arg::new("at")
        .long("at")
        .value_name("STEP")
        .value_parser(value_parser!(usize))
        .help("Show the state of every node at STEP")
}

/// Operation to evaluate (-o/--operation).
pub fn operation_arg() -> Arg {
    Arg::new("operation")
        .short('o')
        .long("operation")
        .value_name("NAME")
        .help("Operation to evaluate (default: the first declared)")
}

/// Operation argument (-a/--arg, repeatable).
pub fn arg_value_arg() -> Arg {
    Arg::new("arg")
        .short('a')
        .long("arg")
        .value_name("VALUE")
        .action(ArgAction::Append)
        .help("Positional operation argument, as JSON or plain text")
}

/// Trace node to evaluate at (-n/--node).
pub fn node_arg() -> Arg {
    Arg::new("node")
        .short('n')
        .long("node")
        .value_name("ID")
        .value_parser(value_parser!(usize))
        .help("Trace node id (default: the root)")
}

/// Forced pass over every operation (--all).
pub fn all_arg() -> Arg {
    Arg::new("all")
        .long("all")
        .action(ArgAction::SetTrue)
        .help("Show the results of every operation and attribute at the node")
}

/// JSON output (--json).
pub fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output results as JSON")
}

/// Print evaluation events (--trace).
pub fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .action(ArgAction::SetTrue)
        .help("Print every application before the results")
}

/// Verbosity level (-v, -vv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Verbosity level for --trace (-v for verbose, -vv for very verbose)")
}
