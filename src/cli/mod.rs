//! Command-line interface
//!
//! `fairtrain train <config.yaml>` runs one fairness method end to end,
//! `fairtrain validate` checks a config without training and
//! `fairtrain methods` lists the registered strategies and datasets.

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::run_command;
pub use logging::LogLevel;

use crate::train::Method;

/// Fairness-aware classifier training
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fairtrain")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Output level selected by `--quiet` / `--verbose`
    pub fn log_level(&self) -> LogLevel {
        if self.quiet {
            LogLevel::Quiet
        } else if self.verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train a classifier from a YAML configuration file
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// List available fairness methods and datasets
    Methods,
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override the fairness method
    #[arg(short, long)]
    pub method: Option<Method>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Override random seed for data and model initialization
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the recorded scalar curves to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Dry run (validate config but don't train)
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show the resolved configuration
    #[arg(short, long)]
    pub detailed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_overrides() {
        let cli = Cli::try_parse_from([
            "fairtrain", "train", "run.yaml", "--method", "lbc", "--epochs", "3", "--lr", "0.5",
            "-o", "curves.json",
        ])
        .unwrap();
        let Command::Train(args) = cli.command else {
            panic!("expected train command");
        };
        assert_eq!(args.config, PathBuf::from("run.yaml"));
        assert_eq!(args.method, Some(Method::Lbc));
        assert_eq!(args.epochs, Some(3));
        assert_eq!(args.lr, Some(0.5));
        assert_eq!(args.output, Some(PathBuf::from("curves.json")));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_parse_unknown_method_rejected() {
        assert!(Cli::try_parse_from(["fairtrain", "train", "run.yaml", "--method", "adv"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["fairtrain", "methods", "--quiet"]).unwrap();
        assert_eq!(cli.command, Command::Methods);
        assert_eq!(cli.log_level(), LogLevel::Quiet);
        let cli = Cli::try_parse_from(["fairtrain", "-v", "validate", "a.yaml"]).unwrap();
        assert_eq!(cli.log_level(), LogLevel::Verbose);
    }
}
