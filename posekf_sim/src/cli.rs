use clap::Parser;
use std::path::PathBuf;

/// posekf: run a planar pose EKF against a simulated offset position sensor.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/circle.toml")]
    pub scenario: PathBuf,

    /// Overrides the scenario's PRNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overrides the number of filter steps derived from duration and rate.
    #[arg(long)]
    pub steps: Option<usize>,

    /// Print the built-in default scenario as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_default: bool,
}
