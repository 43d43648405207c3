//! Tests for CLI dispatch logic: flag parsing, conflicts, and conversion
//! from params to command args.

use std::path::PathBuf;

use clap::error::ErrorKind;
use tracelens_semantics::Verbosity;

use super::*;
use crate::cli::commands::{eval_command, walk_command};
use crate::commands::eval::EvalArgs;
use crate::commands::walk::WalkArgs;

#[test]
fn walk_params_are_extracted() {
    let m = walk_command()
        .try_get_matches_from([
            "walk",
            "trace.json",
            "--show-failures",
            "--hide",
            "space",
            "--hide",
            "comment",
            "--reverse",
        ])
        .unwrap();
    let params = WalkParams::from_matches(&m);

    assert_eq!(params.trace_path, PathBuf::from("trace.json"));
    assert!(params.show_failures);
    assert!(!params.show_structure);
    assert_eq!(params.hidden_rules, ["space", "comment"]);
    assert!(params.reverse);
    assert_eq!(params.at, None);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn walk_at_a_step() {
    let m = walk_command()
        .try_get_matches_from(["walk", "trace.json", "--at", "4", "--color", "never"])
        .unwrap();
    let args: WalkArgs = WalkParams::from_matches(&m).into();

    assert_eq!(args.at, Some(4));
    assert!(!args.color);
    assert!(args.hidden_rules.is_empty());
}

#[test]
fn walk_reverse_conflicts_with_at() {
    let err = walk_command()
        .try_get_matches_from(["walk", "trace.json", "--reverse", "--at", "2"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn walk_requires_a_trace() {
    let err = walk_command()
        .try_get_matches_from(["walk"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn eval_params_are_extracted() {
    let m = eval_command()
        .try_get_matches_from([
            "eval",
            "trace.json",
            "-S",
            "sem.json",
            "-o",
            "show",
            "-a",
            "2",
            "-a",
            ", ",
            "-n",
            "3",
            "--json",
            "--color",
            "always",
        ])
        .unwrap();
    let params = EvalParams::from_matches(&m);

    assert_eq!(params.trace_path, PathBuf::from("trace.json"));
    assert_eq!(params.semantics_path, PathBuf::from("sem.json"));
    assert_eq!(params.operation.as_deref(), Some("show"));
    assert_eq!(params.args, ["2", ", "]);
    assert_eq!(params.node, Some(3));
    assert!(!params.all);
    assert!(params.json);
    assert!(!params.trace);
    assert_eq!(params.verbose, 0);
    assert_eq!(params.color, ColorChoice::Always);

    let args: EvalArgs = params.into();
    assert!(args.color);
    assert_eq!(args.verbosity, Verbosity::Default);
}

#[test]
fn eval_verbosity_counts() {
    let cases = [
        (&["--trace"][..], Verbosity::Default),
        (&["--trace", "-v"][..], Verbosity::Verbose),
        (&["--trace", "-vv"][..], Verbosity::VeryVerbose),
        (&["--trace", "-v", "-v", "-v"][..], Verbosity::VeryVerbose),
    ];
    for (flags, expected) in cases {
        let mut argv = vec!["eval", "trace.json", "-S", "sem.json"];
        argv.extend_from_slice(flags);
        let m = eval_command().try_get_matches_from(argv).unwrap();
        let args: EvalArgs = EvalParams::from_matches(&m).into();
        assert!(args.trace);
        assert_eq!(args.verbosity, expected, "flags {flags:?}");
    }
}

#[test]
fn eval_all_accepts_an_operation_but_not_arguments() {
    let m = eval_command()
        .try_get_matches_from(["eval", "t.json", "-S", "s.json", "--all", "-o", "eval"])
        .unwrap();
    let params = EvalParams::from_matches(&m);
    assert!(params.all);
    assert_eq!(params.operation.as_deref(), Some("eval"));

    let err = eval_command()
        .try_get_matches_from(["eval", "t.json", "-S", "s.json", "--all", "-a", "1"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn eval_requires_semantics() {
    let err = eval_command()
        .try_get_matches_from(["eval", "trace.json"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn node_must_be_a_number() {
    let err = eval_command()
        .try_get_matches_from(["eval", "t.json", "-S", "s.json", "-n", "root"])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn cli_dispatches_subcommands() {
    let m = build_cli()
        .try_get_matches_from(["tracelens", "walk", "trace.json"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "walk");
    assert_eq!(
        WalkParams::from_matches(sub).trace_path,
        PathBuf::from("trace.json")
    );

    assert!(build_cli().try_get_matches_from(["tracelens"]).is_err());
}
