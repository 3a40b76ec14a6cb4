//! Validation error types
//!
//! Defines all validation error variants for run specifications.

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid optimizer: {0} (must be one of: sgd, adam)")]
    InvalidOptimizer(String),

    #[error("Invalid LR scheduler: {0} (must be one of: step, multistep, cosine, plateau)")]
    InvalidLRScheduler(String),

    #[error("Invalid plateau mode: {0} (must be one of: min, max)")]
    InvalidPlateauMode(String),

    #[error("Invalid scheduler gamma: {0} (must be in (0.0, 1.0])")]
    InvalidGamma(f32),

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),

    #[error("Invalid SAM radius: {0} (must be > 0.0)")]
    InvalidSamRho(f32),

    #[error("Invalid lambda: {0} (must be finite and >= 0.0)")]
    InvalidLambda(f32),

    #[error("Invalid eta: {0} (must be finite and > 0.0)")]
    InvalidEta(f32),

    #[error("Invalid rho: {0} (must be finite and >= 0.0)")]
    InvalidRho(f32),

    #[error("Invalid iterations: {0} (must be > 0)")]
    InvalidIterations(usize),

    #[error("Invalid hidden dimension: {0} (must be > 0)")]
    InvalidHiddenDim(usize),

    #[error("Invalid dataset shape: {n_groups} groups × {n_classes} classes (both must be > 0)")]
    InvalidDataShape { n_groups: usize, n_classes: usize },

    #[error("Invalid samples per cell: {0} (must be > 0)")]
    InvalidPerCell(usize),

    #[error("Unsupported device: {0} (only cpu is available)")]
    UnsupportedDevice(String),
}
