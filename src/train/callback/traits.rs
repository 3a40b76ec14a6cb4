//! Core traits and types for the callback system
//!
//! - `CallbackContext` - State passed to callbacks
//! - `TrainerCallback` - The trait all callbacks implement
//!
//! Callbacks observe training; they cannot interrupt it. A run always
//! completes its configured epochs and outer iterations.

/// Context passed to callbacks with current training state
#[derive(Clone, Debug)]
pub struct CallbackContext {
    /// Training method name
    pub method: &'static str,
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Total epochs planned per run
    pub max_epochs: usize,
    /// Outer iteration (0-indexed) for methods that retrain repeatedly
    pub iteration: Option<usize>,
    /// Total outer iterations planned
    pub max_iterations: Option<usize>,
    /// Batches completed within the epoch (1-indexed at step end)
    pub step: usize,
    /// Total batches in the epoch
    pub steps_per_epoch: usize,
    /// Global step count
    pub global_step: usize,
    /// Training loss (windowed mean at step end, epoch mean at epoch end)
    pub loss: f32,
    /// Training accuracy over the same window as `loss`
    pub acc: f32,
    /// Current learning rate
    pub lr: f32,
    /// Validation loss (if available)
    pub val_loss: Option<f32>,
    /// Validation accuracy (if available)
    pub val_acc: Option<f32>,
    /// Largest per-class validation disparity (if available)
    pub val_disparity: Option<f32>,
    /// Seconds spent in the current window or epoch
    pub elapsed_secs: f64,
}

impl Default for CallbackContext {
    fn default() -> Self {
        Self {
            method: "",
            epoch: 0,
            max_epochs: 0,
            iteration: None,
            max_iterations: None,
            step: 0,
            steps_per_epoch: 0,
            global_step: 0,
            loss: 0.0,
            acc: 0.0,
            lr: 0.0,
            val_loss: None,
            val_acc: None,
            val_disparity: None,
            elapsed_secs: 0.0,
        }
    }
}

/// Trait for training callbacks
///
/// All methods have default no-op implementations, so you only need to
/// implement the events you care about.
pub trait TrainerCallback: Send {
    /// Called before training starts
    fn on_train_begin(&mut self, _ctx: &CallbackContext) {}

    /// Called after training ends
    fn on_train_end(&mut self, _ctx: &CallbackContext) {}

    /// Called after each epoch's evaluation
    fn on_epoch_end(&mut self, _ctx: &CallbackContext) {}

    /// Called after each training step
    fn on_step_end(&mut self, _ctx: &CallbackContext) {}

    /// Called after an outer iteration finishes
    fn on_iteration_end(&mut self, _ctx: &CallbackContext) {}

    /// Get callback name for logging
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}
