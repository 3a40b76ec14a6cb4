//! Configuration validation logic
//!
//! Validates run specifications for correctness before execution.

use super::error::ValidationError;
use crate::config::schema::FairSpec;

const OPTIMIZERS: [&str; 2] = ["sgd", "adam"];
const SCHEDULERS: [&str; 4] = ["step", "multistep", "cosine", "plateau"];

/// Validate a run specification
///
/// Checks:
/// - Numeric values are in valid ranges
/// - Enums given as strings match allowed values
/// - The device is available
///
/// Method/criterion compatibility is checked when the trainer is built.
pub fn validate_config(spec: &FairSpec) -> Result<(), ValidationError> {
    let data = &spec.data.synthetic;
    if data.n_groups == 0 || data.n_classes == 0 {
        return Err(ValidationError::InvalidDataShape {
            n_groups: data.n_groups,
            n_classes: data.n_classes,
        });
    }
    if data.per_cell == 0 {
        return Err(ValidationError::InvalidPerCell(data.per_cell));
    }
    if data.test_per_cell == 0 {
        return Err(ValidationError::InvalidPerCell(data.test_per_cell));
    }

    if spec.model.hidden_dim == 0 {
        return Err(ValidationError::InvalidHiddenDim(spec.model.hidden_dim));
    }

    // Validate learning rate (must be positive and reasonable)
    if !(spec.optimizer.lr > 0.0 && spec.optimizer.lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate(spec.optimizer.lr));
    }
    if !OPTIMIZERS.contains(&spec.optimizer.name.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidOptimizer(spec.optimizer.name.clone()));
    }

    if let Some(sched) = &spec.scheduler {
        if !SCHEDULERS.contains(&sched.name.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidLRScheduler(sched.name.clone()));
        }
        if !(sched.gamma > 0.0 && sched.gamma <= 1.0) {
            return Err(ValidationError::InvalidGamma(sched.gamma));
        }
        if !matches!(sched.mode.to_lowercase().as_str(), "min" | "max") {
            return Err(ValidationError::InvalidPlateauMode(sched.mode.clone()));
        }
    }

    let training = &spec.training;
    if training.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(training.batch_size));
    }
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if let Some(clip) = training.max_grad_norm {
        if !(clip > 0.0) {
            return Err(ValidationError::InvalidGradClip(clip));
        }
    }
    if let Some(rho) = training.sam_rho {
        if !(rho > 0.0) {
            return Err(ValidationError::InvalidSamRho(rho));
        }
    }
    if !training.device.eq_ignore_ascii_case("cpu") {
        return Err(ValidationError::UnsupportedDevice(training.device.clone()));
    }

    let fairness = &spec.fairness;
    if !(fairness.lambda.is_finite() && fairness.lambda >= 0.0) {
        return Err(ValidationError::InvalidLambda(fairness.lambda));
    }
    if !(fairness.eta.is_finite() && fairness.eta > 0.0) {
        return Err(ValidationError::InvalidEta(fairness.eta));
    }
    if !(fairness.rho.is_finite() && fairness.rho >= 0.0) {
        return Err(ValidationError::InvalidRho(fairness.rho));
    }
    if fairness.iterations == 0 {
        return Err(ValidationError::InvalidIterations(fairness.iterations));
    }

    Ok(())
}
