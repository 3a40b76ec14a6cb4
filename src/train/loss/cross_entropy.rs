//! Cross Entropy Loss for classification
//!
//! Besides the mean loss this module holds the pieces every fairness loss is
//! built from: per-sample losses, softmax rows, and the chain rule from
//! per-sample loss coefficients (or probability gradients) to logits.

use ndarray::{Array1, Array2, Axis};

use super::{LossFn, LossOutput, LossTarget};

/// Row-wise softmax, shifted by the row max for stability
pub fn softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
    let mut out = logits.clone();
    for mut row in out.rows_mut() {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }
    out
}

/// Per-sample cross entropy `-ln softmax(z)_y` and the softmax probabilities
pub fn per_sample_cross_entropy(
    logits: &Array2<f32>,
    labels: &[usize],
) -> (Array1<f32>, Array2<f32>) {
    let probs = softmax_rows(logits);
    let losses = logits
        .outer_iter()
        .zip(labels)
        .map(|(row, &y)| {
            let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            let lse = max + row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln();
            lse - row[y]
        })
        .collect();
    (losses, probs)
}

/// `dL/dz_ik = a_i (p_ik - [k == y_i])` where `a_i = dL/dℓ_i`
pub fn logit_grad(probs: &Array2<f32>, labels: &[usize], coeffs: &Array1<f32>) -> Array2<f32> {
    let mut grad = probs.clone();
    for ((mut row, &y), &a) in grad.rows_mut().into_iter().zip(labels).zip(coeffs) {
        row[y] -= 1.0;
        row *= a;
    }
    grad
}

/// Chain rule through softmax: `dL/dz_ik = p_ik (g_ik - Σ_j g_ij p_ij)`
pub fn softmax_backward(probs: &Array2<f32>, grad_probs: &Array2<f32>) -> Array2<f32> {
    let inner = (grad_probs * probs).sum_axis(Axis(1)).insert_axis(Axis(1));
    probs * &(grad_probs - &inner)
}

/// Mean cross entropy over the batch
///
/// L = mean_i(-ln softmax(z_i)_{y_i})
pub struct CrossEntropyLoss;

impl LossFn for CrossEntropyLoss {
    fn forward(&self, logits: &Array2<f32>, target: &LossTarget<'_>) -> LossOutput {
        let n = target.labels.len();
        if n == 0 {
            return LossOutput {
                value: 0.0,
                grad_logits: Array2::zeros(logits.raw_dim()),
            };
        }
        let (losses, probs) = per_sample_cross_entropy(logits, target.labels);
        let coeffs = Array1::from_elem(n, 1.0 / n as f32);
        LossOutput {
            value: losses.sum() / n as f32,
            grad_logits: logit_grad(&probs, target.labels, &coeffs),
        }
    }

    fn name(&self) -> &'static str {
        "CrossEntropy"
    }
}
