//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::{LogLevel, ValidateArgs};
use crate::config::{load_config, FairSpec};

/// Human-readable summary of a resolved spec
pub fn format_spec(spec: &FairSpec) -> String {
    let mut lines = vec![
        format!("  Method: {}", spec.method),
        format!(
            "  Data: {} ({} groups x {} classes, {} per cell, {} features)",
            spec.data.name,
            spec.data.synthetic.n_groups,
            spec.data.synthetic.n_classes,
            spec.data.synthetic.per_cell,
            spec.data.synthetic.n_features
        ),
        format!("  Model: {:?}", spec.model.kind),
        format!(
            "  Optimizer: {} (lr={})",
            spec.optimizer.name, spec.optimizer.lr
        ),
    ];
    if let Some(sched) = &spec.scheduler {
        lines.push(format!("  Scheduler: {}", sched.name));
    }
    lines.push(format!(
        "  Epochs: {}, batch size: {}",
        spec.training.epochs, spec.training.batch_size
    ));
    lines.push(format!(
        "  Fairness: criterion {}, lambda {}, eta {}, rho {}, iterations {}",
        spec.fairness.criterion,
        spec.fairness.lambda,
        spec.fairness.eta,
        spec.fairness.rho,
        spec.fairness.iterations
    ));
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    let spec = load_config(&args.config).map_err(|e| format!("Validation failed: {e}"))?;
    log(
        level,
        LogLevel::Normal,
        &format!("Configuration valid: {}", args.config.display()),
    );
    if args.detailed {
        log(level, LogLevel::Normal, &format_spec(&spec));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_spec_mentions_method() {
        let text = format_spec(&FairSpec::default());
        assert!(text.contains("Method: scratch"));
        assert!(text.contains("criterion eo"));
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"training:\n  batch_size: 0\n").unwrap();
        let args = ValidateArgs {
            config: f.path().to_path_buf(),
            detailed: true,
        };
        assert!(run_validate(args, LogLevel::Quiet).is_err());
    }
}
