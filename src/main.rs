//! CLI entry point for the sweep driver.

use std::env;

use anyhow::{Context, Result};
use clap::Parser;

use rystiat::sweep::{RunContext, SweepOutcome, run_sweep};
use rystiat::{exit_codes, logging, report};

#[derive(Parser)]
#[command(
    name = "rystiat",
    version,
    about = "Run Your Simulations To Investigate A Trend",
    after_help = "Each VALUE is a number, a string, an inclusive range FROM..TO..STEP,\n\
                  or a comma-joined list of these. The first parameter that expands\n\
                  to more than one value drives the sweep; all others are held fixed.\n\
                  Configuration comes from a `rystiat.rc` file found in the current\n\
                  directory or any parent."
)]
struct Cli {
    /// Simulation parameters, e.g. `height=234.56 depth=10..25..5`.
    #[arg(value_name = "NAME=VALUE")]
    params: Vec<String>,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            report::error(format!("{err:#}"));
            std::process::exit(exit_codes::CONFIG);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let invoke_dir = env::current_dir().context("determine working directory")?;
    let argv: Vec<String> = env::args().collect();
    let ctx = RunContext::resolve(&invoke_dir, argv)?;
    let outcome = run_sweep(&ctx, &cli.params)?;
    Ok(match outcome {
        SweepOutcome::ValidationFailed { .. } => exit_codes::VALIDATION,
        SweepOutcome::Completed { failed_runs, .. } if failed_runs > 0 => exit_codes::SIM_FAILED,
        SweepOutcome::Completed { .. } => exit_codes::OK,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_parameter_tokens() {
        let cli = Cli::parse_from(["rystiat", "height=5", "depth=10..25..5"]);
        assert_eq!(cli.params, vec!["height=5", "depth=10..25..5"]);
    }

    #[test]
    fn accepts_an_empty_parameter_list() {
        let cli = Cli::parse_from(["rystiat"]);
        assert!(cli.params.is_empty());
    }
}
