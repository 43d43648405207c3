//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("tracelens")
        .about("Step through parse traces and evaluate semantic actions over them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(walk_command())
        .subcommand(eval_command())
}

/// Replay the enter/exit steps of a trace.
pub fn walk_command() -> Command {
    Command::new("walk")
        .about("Replay the enter/exit steps of a trace")
        .override_usage(
            "\
  tracelens walk <TRACE> [--reverse]
  tracelens walk <TRACE> --at <STEP>",
        )
        .after_help(
            r#"EXAMPLES:
  tracelens walk trace.json                      # forward walk
  tracelens walk trace.json --reverse            # backward walk from the end
  tracelens walk trace.json --show-failures      # include failed attempts
  tracelens walk trace.json --hide space         # hide a rule's applications
  tracelens walk trace.json --at 4               # node states at step 4"#,
        )
        .arg(trace_path_arg())
        .arg(show_failures_arg())
        .arg(show_structure_arg())
        .arg(hide_arg())
        .arg(reverse_arg().conflicts_with("at"))
        .arg(at_arg())
        .arg(color_arg())
}

/// Evaluate semantic actions over a trace.
pub fn eval_command() -> Command {
    Command::new("eval")
        .about("Evaluate semantic actions over a trace")
        .override_usage(
            "\
  tracelens eval <TRACE> -S <FILE> [-o <NAME>] [-a <VALUE>]...
  tracelens eval <TRACE> -S <FILE> --all [-n <ID>]",
        )
        .after_help(
            r#"EXAMPLES:
  tracelens eval trace.json -S sem.json               # first operation at the root
  tracelens eval trace.json -S sem.json -o show -a 2  # operation with an argument
  tracelens eval trace.json -S sem.json --all -n 3    # everything at trace node #3
  tracelens eval trace.json -S sem.json --trace -v    # show every application"#,
        )
        .arg(trace_path_arg())
        .arg(semantics_path_arg())
        .arg(operation_arg())
        .arg(arg_value_arg())
        .arg(node_arg())
        .arg(all_arg().conflicts_with("arg"))
        .arg(json_arg())
        .arg(trace_arg())
        .arg(verbose_arg())
        .arg(color_arg())
}
