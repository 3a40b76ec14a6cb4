//! Train command implementation

use crate::cli::logging::log;
use crate::cli::{LogLevel, TrainArgs};
use crate::config::{load_config, train_from_spec, validate_config, FairSpec, RunOptions};
use crate::tracking::{write_json, SharedHistory};

/// Apply command-line overrides on top of a loaded spec
pub(crate) fn apply_overrides(spec: &mut FairSpec, args: &TrainArgs) {
    if let Some(method) = args.method {
        spec.method = method;
    }
    if let Some(epochs) = args.epochs {
        spec.training.epochs = epochs;
    }
    if let Some(lr) = args.lr {
        spec.optimizer.lr = lr;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = seed;
        spec.model.seed = seed;
        spec.data.synthetic.seed = seed;
    }
}

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("fairtrain: training from {}", args.config.display()),
    );

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);
    validate_config(&spec).map_err(|e| format!("Config error: {e}"))?;

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Method: {} (criterion {}, lambda {})",
            spec.method, spec.fairness.criterion, spec.fairness.lambda
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Optimizer: {} (lr={})",
            spec.optimizer.name, spec.optimizer.lr
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  Epochs: {}, batch size: {}",
            spec.training.epochs, spec.training.batch_size
        ),
    );

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        return Ok(());
    }

    let history = SharedHistory::new();
    let options = RunOptions {
        progress: level != LogLevel::Quiet,
        sink: Some(Box::new(history.clone())),
    };
    let report = train_from_spec(&spec, options).map_err(|e| format!("Training error: {e}"))?;

    if let Some(path) = &args.output {
        write_json(&history.snapshot(), path).map_err(|e| format!("Output error: {e}"))?;
        log(
            level,
            LogLevel::Normal,
            &format!("Metrics written to {}", path.display()),
        );
    }

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Training complete: {} epochs in {:.1}s, test acc {:.4}, disparity max {:.4} / mean {:.4}",
            report.epochs,
            report.elapsed_secs,
            report.eval.accuracy,
            report.eval.disparity_max,
            report.eval.disparity_mean
        ),
    );
    Ok(())
}
