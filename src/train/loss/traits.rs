//! Loss function trait

use ndarray::Array2;

/// Per-row supervision for a batch
#[derive(Clone, Copy, Debug)]
pub struct LossTarget<'a> {
    /// True class per row
    pub labels: &'a [usize],
    /// Sensitive group per row
    pub groups: &'a [usize],
    /// Optional per-row sample weights
    pub weights: Option<&'a [f32]>,
}

impl<'a> LossTarget<'a> {
    /// Unweighted target
    pub fn new(labels: &'a [usize], groups: &'a [usize]) -> Self {
        Self {
            labels,
            groups,
            weights: None,
        }
    }

    /// Attach per-row weights
    pub fn with_weights(mut self, weights: &'a [f32]) -> Self {
        self.weights = Some(weights);
        self
    }
}

/// Scalar loss and its gradient with respect to the logits
#[derive(Clone, Debug)]
pub struct LossOutput {
    /// Loss value
    pub value: f32,
    /// `dL/dlogits`, same shape as the logits
    pub grad_logits: Array2<f32>,
}

impl LossOutput {
    /// Sum of two losses over the same logits
    pub fn add(mut self, other: LossOutput) -> Self {
        self.value += other.value;
        self.grad_logits += &other.grad_logits;
        self
    }

    /// Scale value and gradient
    pub fn scale(mut self, factor: f32) -> Self {
        self.value *= factor;
        self.grad_logits *= factor;
        self
    }
}

/// Trait for batch loss functions
pub trait LossFn: Send + Sync {
    /// Compute the loss for a batch of logits and its gradient
    fn forward(&self, logits: &Array2<f32>, target: &LossTarget<'_>) -> LossOutput;

    /// Name of the loss function
    fn name(&self) -> &'static str;
}
