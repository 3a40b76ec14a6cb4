//! Callback manager for dispatching events to multiple callbacks

use super::traits::{CallbackContext, TrainerCallback};

/// Manages multiple callbacks and dispatches events
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_begin(ctx);
        }
    }

    /// Fire train end event
    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }

    /// Fire epoch end event
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_epoch_end(ctx);
        }
    }

    /// Fire step end event
    pub fn on_step_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_step_end(ctx);
        }
    }

    /// Fire iteration end event
    pub fn on_iteration_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_iteration_end(ctx);
        }
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}
