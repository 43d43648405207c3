mod cli;
mod commands;

use cli::{EvalParams, WalkParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("walk", m)) => {
            let params = WalkParams::from_matches(m);
            commands::walk::run(params.into());
        }
        Some(("eval", m)) => {
            let params = EvalParams::from_matches(m);
            commands::eval::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
