//! Methods command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::data::dataset_names;
use crate::train::Method;

pub fn run_methods(level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, "Methods:");
    for method in Method::all() {
        log(
            level,
            LogLevel::Normal,
            &format!("  {:<12} {}", method.as_str(), method.description()),
        );
    }
    log(level, LogLevel::Normal, "Datasets:");
    for name in dataset_names() {
        log(level, LogLevel::Normal, &format!("  {name}"));
    }
    Ok(())
}
