//! Classifier collaborators
//!
//! Trainers only see models through the [`Classifier`] trait: a forward pass
//! producing per-class logits and a backward pass that turns a gradient with
//! respect to those logits into parameter gradients. Architectures are
//! small; anything implementing the trait can be trained.

mod linear;
mod mlp;

pub use linear::LinearClassifier;
pub use mlp::MlpClassifier;

use crate::Tensor;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;

/// A differentiable multi-class classifier
pub trait Classifier: Send {
    /// Number of output classes
    fn n_classes(&self) -> usize;

    /// Number of input features
    fn n_features(&self) -> usize;

    /// Compute logits (`batch × n_classes`) for a batch of inputs (`batch × n_features`)
    fn forward(&self, inputs: &Array2<f32>) -> Array2<f32>;

    /// Accumulate parameter gradients given `dL/dlogits` for the same inputs
    fn backward(&mut self, inputs: &Array2<f32>, grad_logits: &Array2<f32>);

    /// Mutable access to all trainable parameters
    fn params_mut(&mut self) -> Vec<&mut Tensor>;

    /// Read access to all trainable parameters
    fn params(&self) -> Vec<&Tensor>;

    /// Switch to training mode
    fn train_mode(&mut self);

    /// Switch to evaluation mode
    fn eval_mode(&mut self);

    /// Whether the model is in training mode
    fn is_training(&self) -> bool;

    /// Whether [`Classifier::reinitialize`] restores a fresh model
    fn supports_reinit(&self) -> bool {
        false
    }

    /// Re-draw all parameters as if the model had just been constructed
    fn reinitialize(&mut self) {}

    /// Short architecture name for logs
    fn name(&self) -> &'static str;

    /// Drop all accumulated gradients
    fn zero_grad(&mut self) {
        for p in self.params_mut() {
            p.zero_grad();
        }
    }
}

/// Argmax over each row of a logits matrix
pub fn argmax_rows(logits: &Array2<f32>) -> Vec<usize> {
    logits
        .outer_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| {
                    if v > bv {
                        (i, v)
                    } else {
                        (bi, bv)
                    }
                })
                .0
        })
        .collect()
}

/// Uniform `(-1/sqrt(fan_in), 1/sqrt(fan_in))` initialization
pub(crate) fn uniform_init(rng: &mut StdRng, rows: usize, fan_in: usize) -> Array2<f32> {
    let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
    Array2::from_shape_fn((rows, fan_in), |_| rng.gen_range(-bound..bound))
}
