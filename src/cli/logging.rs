//! Leveled stdout output for CLI commands

/// Log level for CLI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Whether a message at `required` is printed at this level
    pub fn allows(self, required: LogLevel) -> bool {
        self != LogLevel::Quiet && (self == required || required == LogLevel::Normal)
    }
}

/// Print a message if the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level.allows(required) {
        println!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        assert!(LogLevel::Normal.allows(LogLevel::Normal));
        assert!(!LogLevel::Normal.allows(LogLevel::Verbose));
        assert!(LogLevel::Verbose.allows(LogLevel::Normal));
        assert!(!LogLevel::Quiet.allows(LogLevel::Normal));
    }
}
