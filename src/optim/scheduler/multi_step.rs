//! Milestone-based learning rate scheduler

use super::LRScheduler;

/// Multiplies the learning rate by `gamma` each time a milestone epoch is reached
///
/// Formula: lr_t = lr_initial * gamma^(#{m in milestones : m <= t})
pub struct MultiStepLR {
    lr_initial: f32,
    gamma: f32,
    milestones: Vec<usize>,
    current_epoch: usize,
}

impl MultiStepLR {
    /// Create a milestone scheduler; milestones need not be sorted
    pub fn new(lr_initial: f32, milestones: Vec<usize>, gamma: f32) -> Self {
        let mut milestones = milestones;
        milestones.sort_unstable();
        Self {
            lr_initial,
            gamma,
            milestones,
            current_epoch: 0,
        }
    }

    /// Sorted milestone epochs
    pub fn milestones(&self) -> &[usize] {
        &self.milestones
    }
}

impl LRScheduler for MultiStepLR {
    fn get_lr(&self) -> f32 {
        let passed = self
            .milestones
            .iter()
            .filter(|&&m| m <= self.current_epoch)
            .count();
        self.lr_initial * self.gamma.powi(passed as i32)
    }

    fn step(&mut self, _metric: Option<f32>) {
        self.current_epoch += 1;
    }

    fn reset(&mut self) {
        self.current_epoch = 0;
    }
}
