//! Per-sample weighted cross entropy

use ndarray::{Array1, Array2};

use super::cross_entropy::{logit_grad, per_sample_cross_entropy};
use super::{LossFn, LossOutput, LossTarget};

/// Per-sample weighted cross entropy
///
/// L = mean_i(w_i · ℓ_i). Rows without a weight slice in the target count
/// with weight 1, which reduces to [`super::CrossEntropyLoss`].
pub struct SampleWeightedLoss;

impl LossFn for SampleWeightedLoss {
    fn forward(&self, logits: &Array2<f32>, target: &LossTarget<'_>) -> LossOutput {
        let n = target.labels.len();
        if n == 0 {
            return LossOutput {
                value: 0.0,
                grad_logits: Array2::zeros(logits.raw_dim()),
            };
        }
        let weights: Array1<f32> = match target.weights {
            Some(w) => {
                debug_assert_eq!(w.len(), n, "weights must match batch length");
                Array1::from(w.to_vec())
            }
            None => Array1::ones(n),
        };
        let (losses, probs) = per_sample_cross_entropy(logits, target.labels);
        let coeffs = &weights / n as f32;
        LossOutput {
            value: (&weights * &losses).sum() / n as f32,
            grad_logits: logit_grad(&probs, target.labels, &coeffs),
        }
    }

    fn name(&self) -> &'static str {
        "SampleWeighted"
    }
}
