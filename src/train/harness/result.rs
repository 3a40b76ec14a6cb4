//! Training result types

/// Outcome of one optimizer step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Loss value before the update
    pub loss: f32,
    /// Correctly classified rows of the batch
    pub correct: usize,
    /// Rows in the batch
    pub size: usize,
}

/// Mean training metrics of one epoch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpochSummary {
    /// Mean batch loss
    pub loss: f32,
    /// Training accuracy
    pub accuracy: f32,
    /// Batches run
    pub steps: usize,
}

/// Test-set evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvalReport {
    /// Mean cross entropy
    pub loss: f32,
    /// Accuracy
    pub accuracy: f32,
    /// Largest per-class disparity
    pub disparity_max: f32,
    /// Mean per-class disparity
    pub disparity_mean: f32,
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// Method that produced the run
    pub method: &'static str,
    /// Epochs completed across all outer iterations
    pub epochs: usize,
    /// Mean training loss of the last epoch
    pub final_loss: f32,
    /// Last test evaluation
    pub eval: EvalReport,
    /// Total training time in seconds
    pub elapsed_secs: f64,
}
