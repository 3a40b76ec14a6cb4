//! Training configuration and metrics tracking

/// Runtime training configuration shared by every strategy
#[derive(Clone, Debug, PartialEq)]
pub struct TrainConfig {
    /// Epochs per training run
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Prefetch workers for data loading (0 = load on the training thread)
    pub n_workers: usize,
    /// Print progress every N batches
    pub log_interval: usize,
    /// Shuffle seed
    pub seed: u64,
    /// Use group-balanced cross entropy as the base loss
    pub balanced: bool,
    /// Clip the global gradient norm to this value
    pub max_grad_norm: Option<f32>,
    /// Sharpness-aware two-step updates with this radius
    pub sam_rho: Option<f32>,
    /// Log training-set metrics and regularizer curves every epoch
    pub record: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 128,
            n_workers: 0,
            log_interval: 10,
            seed: 0,
            balanced: false,
            max_grad_norm: None,
            sam_rho: None,
            record: false,
        }
    }
}

impl TrainConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set epochs per run
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set prefetch worker count
    pub fn with_workers(mut self, n_workers: usize) -> Self {
        self.n_workers = n_workers;
        self
    }

    /// Set progress interval in batches
    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }

    /// Set shuffle seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable group-balanced base loss
    pub fn with_balanced(mut self, balanced: bool) -> Self {
        self.balanced = balanced;
        self
    }

    /// Enable gradient clipping
    pub fn with_grad_clip(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = Some(max_norm);
        self
    }

    /// Enable sharpness-aware updates
    pub fn with_sam(mut self, rho: f32) -> Self {
        self.sam_rho = Some(rho);
        self
    }

    /// Enable per-epoch recording of training curves
    pub fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }
}

/// Per-epoch training history
#[derive(Clone, Debug, Default)]
pub struct MetricsTracker {
    /// Epochs completed across all runs
    pub epoch: usize,
    /// Optimizer steps taken across all runs
    pub steps: usize,
    /// Mean training loss per epoch
    pub losses: Vec<f32>,
    /// Learning rate at the end of each epoch
    pub learning_rates: Vec<f32>,
    /// Validation loss per epoch
    pub val_losses: Vec<f32>,
    /// Validation accuracy per epoch
    pub val_accuracies: Vec<f32>,
}

impl MetricsTracker {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one optimizer step
    pub fn increment_step(&mut self) {
        self.steps += 1;
    }

    /// Record an epoch's mean training loss and learning rate
    pub fn record_epoch(&mut self, loss: f32, lr: f32) {
        self.losses.push(loss);
        self.learning_rates.push(lr);
        self.epoch += 1;
    }

    /// Record an epoch's validation results
    pub fn record_validation(&mut self, loss: f32, accuracy: f32) {
        self.val_losses.push(loss);
        self.val_accuracies.push(accuracy);
    }

    /// Lowest validation loss seen
    pub fn best_val_loss(&self) -> Option<f32> {
        self.val_losses.iter().copied().reduce(f32::min)
    }

    /// Whether every recorded loss is finite
    pub fn all_finite(&self) -> bool {
        self.losses.iter().chain(&self.val_losses).all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let cfg = TrainConfig::new()
            .with_epochs(3)
            .with_batch_size(16)
            .with_workers(2)
            .with_log_interval(0)
            .with_balanced(true)
            .with_grad_clip(5.0)
            .with_sam(0.05)
            .with_record(true);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.batch_size, 16);
        assert_eq!(cfg.n_workers, 2);
        assert!(cfg.balanced);
        assert_eq!(cfg.max_grad_norm, Some(5.0));
        assert_eq!(cfg.sam_rho, Some(0.05));
        assert!(cfg.record);
    }

    #[test]
    fn test_metrics_tracker() {
        let mut m = MetricsTracker::new();
        m.increment_step();
        m.record_epoch(0.7, 0.1);
        m.record_validation(0.9, 0.5);
        m.record_validation(0.6, 0.6);
        assert_eq!(m.steps, 1);
        assert_eq!(m.epoch, 1);
        assert_eq!(m.best_val_loss(), Some(0.6));
        assert!(m.all_finite());
    }
}
