//! fairtrain CLI
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! fairtrain train config.yaml
//!
//! # Train with overrides and save the scalar curves
//! fairtrain train config.yaml --method lbc --epochs 10 --output curves.json
//!
//! # Validate config
//! fairtrain validate config.yaml --detailed
//!
//! # List methods and datasets
//! fairtrain methods
//! ```

use clap::Parser;
use fairtrain::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
