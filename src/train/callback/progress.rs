//! Progress callback for printing training progress

use super::traits::{CallbackContext, TrainerCallback};

/// Prints windowed training metrics every `log_interval` batches and the
/// evaluation summary after each epoch
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Print every N batches
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback; an interval of 0 disables step lines
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval }
    }

    /// Step line for a context, if this step is on the interval
    pub fn step_line(&self, ctx: &CallbackContext) -> Option<String> {
        if self.log_interval == 0 || ctx.step == 0 || ctx.step % self.log_interval != 0 {
            return None;
        }
        let per_batch = ctx.elapsed_secs / self.log_interval as f64;
        Some(format!(
            "[{}/{}, {:5}] Method: {} Train Loss: {:.3} Train Acc: {:.2} [{:.2} s/batch]",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.step,
            ctx.method,
            ctx.loss,
            ctx.acc,
            per_batch
        ))
    }

    /// Epoch summary line
    pub fn epoch_line(&self, ctx: &CallbackContext) -> String {
        let disparity = ctx
            .val_disparity
            .map(|d| format!(" Test Disparity: {d:.2}"))
            .unwrap_or_default();
        format!(
            "[{}/{}] Method: {} Test Loss: {:.3} Test Acc: {:.2}{} [{:.2} s]",
            ctx.epoch + 1,
            ctx.max_epochs,
            ctx.method,
            ctx.val_loss.unwrap_or(f32::NAN),
            ctx.val_acc.unwrap_or(f32::NAN),
            disparity,
            ctx.elapsed_secs
        )
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_step_end(&mut self, ctx: &CallbackContext) {
        if let Some(line) = self.step_line(ctx) {
            println!("{line}");
        }
    }

    fn on_epoch_end(&mut self, ctx: &CallbackContext) {
        println!("{}", self.epoch_line(ctx));
    }

    fn on_iteration_end(&mut self, ctx: &CallbackContext) {
        if let (Some(i), Some(n)) = (ctx.iteration, ctx.max_iterations) {
            println!("Iteration {}/{} finished [{:.1} s]", i + 1, n, ctx.elapsed_secs);
        }
    }

    fn on_train_end(&mut self, _ctx: &CallbackContext) {
        println!("Training Finished!");
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}
