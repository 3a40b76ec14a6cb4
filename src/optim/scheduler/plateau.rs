//! Reduce-on-plateau learning rate scheduler

use super::LRScheduler;

/// Direction in which the monitored metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateauMode {
    /// Lower is better (losses)
    Min,
    /// Higher is better (accuracies)
    Max,
}

/// Multiplies the learning rate by `factor` after `patience` epochs without improvement
///
/// Improvement is relative: a new value must beat the best by more than
/// `threshold * |best|`. After a reduction the scheduler waits `cooldown`
/// epochs before counting bad epochs again.
pub struct ReduceLROnPlateau {
    lr_initial: f32,
    lr: f32,
    mode: PlateauMode,
    factor: f32,
    patience: usize,
    threshold: f32,
    cooldown: usize,
    min_lr: f32,
    best: Option<f32>,
    bad_epochs: usize,
    cooldown_left: usize,
}

impl ReduceLROnPlateau {
    /// Minimize the metric with factor 0.1, patience 10, threshold 1e-4
    pub fn new(lr_initial: f32) -> Self {
        Self {
            lr_initial,
            lr: lr_initial,
            mode: PlateauMode::Min,
            factor: 0.1,
            patience: 10,
            threshold: 1e-4,
            cooldown: 0,
            min_lr: 0.0,
            best: None,
            bad_epochs: 0,
            cooldown_left: 0,
        }
    }

    /// Set the improvement direction
    pub fn with_mode(mut self, mode: PlateauMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the reduction factor
    pub fn with_factor(mut self, factor: f32) -> Self {
        self.factor = factor;
        self
    }

    /// Set how many bad epochs are tolerated
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Set the relative improvement threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the cooldown after a reduction
    pub fn with_cooldown(mut self, cooldown: usize) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the learning rate floor
    pub fn with_min_lr(mut self, min_lr: f32) -> Self {
        self.min_lr = min_lr;
        self
    }

    fn improves(&self, value: f32, best: f32) -> bool {
        let margin = self.threshold * best.abs();
        match self.mode {
            PlateauMode::Min => value < best - margin,
            PlateauMode::Max => value > best + margin,
        }
    }
}

impl LRScheduler for ReduceLROnPlateau {
    fn get_lr(&self) -> f32 {
        self.lr
    }

    fn step(&mut self, metric: Option<f32>) {
        let Some(value) = metric else {
            log::warn!("ReduceLROnPlateau stepped without a metric; ignored");
            return;
        };
        if !value.is_finite() {
            log::warn!("ReduceLROnPlateau received non-finite metric {value}; ignored");
            return;
        }

        match self.best {
            Some(best) if !self.improves(value, best) => self.bad_epochs += 1,
            _ => {
                self.best = Some(value);
                self.bad_epochs = 0;
            }
        }

        if self.cooldown_left > 0 {
            self.cooldown_left -= 1;
            self.bad_epochs = 0;
        }

        if self.bad_epochs > self.patience {
            let reduced = (self.lr * self.factor).max(self.min_lr);
            if reduced < self.lr {
                log::debug!("plateau: learning rate {} -> {}", self.lr, reduced);
            }
            self.lr = reduced;
            self.cooldown_left = self.cooldown;
            self.bad_epochs = 0;
        }
    }

    fn reset(&mut self) {
        self.lr = self.lr_initial;
        self.best = None;
        self.bad_epochs = 0;
        self.cooldown_left = 0;
    }
}
