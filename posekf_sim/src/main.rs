// posekf_sim/src/main.rs

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use posekf_sim::cli::Cli;
use posekf_sim::prelude::*;
use posekf_sim::simulation::config::default_scenario_toml;
use posekf_sim::telemetry;

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    if cli.print_default {
        println!("{}", default_scenario_toml()?);
        return Ok(());
    }

    let scenario = load_scenario(&cli.scenario)?;
    let options = RunOptions {
        seed: cli.seed,
        steps: cli.steps,
    };
    let summary = run_scenario(&scenario, &options)?;
    println!("{summary}");
    Ok(())
}
