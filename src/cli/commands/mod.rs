//! CLI command implementations

mod methods;
mod train;
mod validate;

use super::{Cli, Command};

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = cli.log_level();

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Validate(args) => validate::run_validate(args, log_level),
        Command::Methods => methods::run_methods(log_level),
    }
}
