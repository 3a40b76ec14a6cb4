//! Callback system for training events
//!
//! Provides hooks for training loop events:
//! - `on_train_begin` / `on_train_end`
//! - `on_step_end` / `on_epoch_end`
//! - `on_iteration_end` (outer loops that retrain repeatedly)
//!
//! # Example
//!
//! ```rust
//! use fairtrain::train::callback::{TrainerCallback, CallbackContext};
//!
//! struct PrintCallback;
//!
//! impl TrainerCallback for PrintCallback {
//!     fn on_epoch_end(&mut self, ctx: &CallbackContext) {
//!         println!("Epoch {} finished with loss {:.4}", ctx.epoch, ctx.loss);
//!     }
//! }
//! ```

mod manager;
mod progress;
mod traits;

pub use manager::CallbackManager;
pub use progress::ProgressCallback;
pub use traits::{CallbackContext, TrainerCallback};
