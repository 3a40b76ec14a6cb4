//! Learning rate schedulers
//!
//! Provides learning rate scheduling strategies for training:
//! - `StepDecayLR` - Step decay by factor every N epochs
//! - `MultiStepLR` - Decay by factor at each milestone epoch
//! - `CosineAnnealingLR` - Smooth cosine decay
//! - `ReduceLROnPlateau` - Decay when a monitored metric stops improving
//!
//! Whether a scheduler consumes the validation loss is decided when it is
//! built and recorded as a [`ScheduleMode`], which the training loop consults.

mod cosine_annealing;
mod multi_step;
mod plateau;
mod step_decay;

#[cfg(test)]
mod tests;

pub use cosine_annealing::CosineAnnealingLR;
pub use multi_step::MultiStepLR;
pub use plateau::{PlateauMode, ReduceLROnPlateau};
pub use step_decay::StepDecayLR;

use super::Optimizer;
use serde::{Deserialize, Serialize};

/// How the training loop advances a scheduler at the end of an epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    /// Step unconditionally once per epoch
    #[default]
    PerEpoch,
    /// Step with the epoch's validation loss
    OnValidationLoss,
}

/// Learning rate scheduler trait
pub trait LRScheduler: Send {
    /// Get the current learning rate
    fn get_lr(&self) -> f32;

    /// Step the scheduler; `metric` is the monitored value when the scheduler uses one
    fn step(&mut self, metric: Option<f32>);

    /// Return to the initial schedule position
    fn reset(&mut self);

    /// Apply the current learning rate to an optimizer
    fn apply(&self, optimizer: &mut dyn Optimizer) {
        optimizer.set_lr(self.get_lr());
    }
}
