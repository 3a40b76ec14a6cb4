//! Shared epoch/batch/evaluation loop
//!
//! Every training strategy drives the same [`Harness`]: it owns the model,
//! optimizer, optional scheduler and logging sink, and exposes the pieces a
//! strategy composes into its own control flow:
//!
//! - [`Harness::optimize_batch`]: forward, loss, backward, (clip), step
//! - [`Harness::run_epoch`]: one shuffled pass over the training set
//! - [`Harness::evaluate`]: test loss, accuracy and disparity
//! - [`Harness::finish_epoch`]: scheduler step and epoch callbacks
//! - [`Harness::restart`]: reinitialize model, optimizer and scheduler

mod core;
mod epoch;
mod result;
mod step;

pub use self::core::Harness;
pub use result::{EpochSummary, EvalReport, StepOutcome, TrainReport};
