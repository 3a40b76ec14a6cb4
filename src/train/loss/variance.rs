//! Robust variance-penalized objective
//!
//! `L = Σ_{g,c} L[g,c] / (G·C) + mean_c sqrt(var_g(L[·,c]) · ρ / G)` over the
//! zero-guarded subgroup mean cross entropy `L`. The variance is the unbiased
//! (n - 1) estimate across groups. This objective replaces the base loss.

use ndarray::{Array1, Array2, Axis};

use super::cross_entropy::{logit_grad, per_sample_cross_entropy};
use super::{LossFn, LossOutput, LossTarget};
use crate::fairness::{GroupClassTable, SubgroupAggregate};

/// Per-class unbiased variance across groups (0 with fewer than two groups)
pub fn class_variances(means: &GroupClassTable) -> Array1<f32> {
    let n_groups = means.nrows();
    if n_groups < 2 {
        return Array1::zeros(means.ncols());
    }
    means.var_axis(Axis(0), 1.0)
}

/// Variance penalty `mean_c sqrt(var_c · ρ / G)` and its gradient w.r.t. the mean table
///
/// A class with zero variance contributes zero value and zero gradient.
pub fn variance_penalty(means: &GroupClassTable, rho: f32) -> (f32, GroupClassTable) {
    let (n_groups, n_classes) = means.dim();
    let mut grad = Array2::zeros((n_groups, n_classes));
    if n_groups < 2 || n_classes == 0 {
        return (0.0, grad);
    }
    let vars = class_variances(means);
    let class_means = means.sum_axis(Axis(0)) / n_groups as f32;
    let scale = rho / n_groups as f32;

    let mut value = 0.0;
    for c in 0..n_classes {
        let term = (vars[c] * scale).max(0.0).sqrt();
        value += term;
        if term == 0.0 {
            continue;
        }
        // d sqrt(s·var)/dL_gc = s · (L_gc - m_c) / ((G - 1) · term)
        for g in 0..n_groups {
            grad[[g, c]] = scale * (means[[g, c]] - class_means[c])
                / ((n_groups - 1) as f32 * term)
                / n_classes as f32;
        }
    }
    (value / n_classes as f32, grad)
}

/// Average subgroup loss plus the cross-group variance penalty
pub struct RobustVarianceLoss {
    rho: f32,
    n_groups: usize,
    n_classes: usize,
}

impl RobustVarianceLoss {
    /// Create with variance coefficient `rho`
    pub fn new(rho: f32, n_groups: usize, n_classes: usize) -> Self {
        Self {
            rho,
            n_groups,
            n_classes,
        }
    }

    /// Split of the objective into `(avg_group_loss, var_loss)` for a mean table
    pub fn components(&self, means: &GroupClassTable) -> (f32, f32) {
        let n_sub = (self.n_groups * self.n_classes).max(1) as f32;
        (means.sum() / n_sub, variance_penalty(means, self.rho).0)
    }
}

impl LossFn for RobustVarianceLoss {
    fn forward(&self, logits: &Array2<f32>, target: &LossTarget<'_>) -> LossOutput {
        let (losses, probs) = per_sample_cross_entropy(logits, target.labels);
        let agg = SubgroupAggregate::from_losses(
            &losses,
            target.groups,
            target.labels,
            self.n_groups,
            self.n_classes,
        );
        let n_sub = agg.n_subgroups() as f32;
        let (var_loss, var_grad) = variance_penalty(agg.means(), self.rho);
        let grad_means = var_grad + 1.0 / n_sub;
        LossOutput {
            value: agg.means().sum() / n_sub + var_loss,
            grad_logits: logit_grad(&probs, target.labels, &agg.backprop(&grad_means)),
        }
    }

    fn name(&self) -> &'static str {
        "RobustVariance"
    }
}
