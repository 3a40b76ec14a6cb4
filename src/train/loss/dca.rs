//! Difference-of-conditional-accuracy (DCA) regularizer
//!
//! For a `(n_groups, n_classes)` table of subgroup mean losses `L`:
//! `DCA = mean_{g,c} |L[g,c] - mean_g' L[g',c]|`. The gradient uses the sign
//! subgradient with `sign(0) = 0`.

use ndarray::{Array1, Array2, Axis};

use super::cross_entropy::{logit_grad, per_sample_cross_entropy};
use super::{LossFn, LossOutput, LossTarget};
use crate::fairness::{GroupClassTable, SubgroupAggregate};

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Per-class DCA: `mean_g |L[g,c] - mean_g' L[g',c]|` for each class `c`
pub fn per_class_dca(means: &GroupClassTable) -> Array1<f32> {
    let Some(class_means) = means.mean_axis(Axis(0)) else {
        return Array1::zeros(means.ncols());
    };
    (means - &class_means)
        .mapv(f32::abs)
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(means.ncols()))
}

/// DCA value and its gradient with respect to the mean table
pub fn dca_penalty(means: &GroupClassTable) -> (f32, GroupClassTable) {
    let (n_groups, n_classes) = means.dim();
    if n_groups == 0 || n_classes == 0 {
        return (0.0, Array2::zeros(means.raw_dim()));
    }
    let class_means = means.sum_axis(Axis(0)) / n_groups as f32;
    let diffs = means - &class_means;
    let value = diffs.mapv(f32::abs).sum() / (n_groups * n_classes) as f32;

    // d|L_gc - m_c| / dL_hc = s_gc ([g == h] - 1/G)
    let signs = diffs.mapv(sign);
    let sign_means = signs.sum_axis(Axis(0)) / n_groups as f32;
    let grad = (signs - &sign_means) / (n_groups * n_classes) as f32;
    (value, grad)
}

/// Base loss plus `lambda * DCA` over the batch's subgroup mean cross entropy
pub struct DirectRegLoss {
    base: Box<dyn LossFn>,
    lambda: f32,
    n_groups: usize,
    n_classes: usize,
}

impl DirectRegLoss {
    /// Wrap a base loss
    pub fn new(base: Box<dyn LossFn>, lambda: f32, n_groups: usize, n_classes: usize) -> Self {
        Self {
            base,
            lambda,
            n_groups,
            n_classes,
        }
    }

    /// Regularizer alone (value and logit gradient), without the base loss
    pub fn regularizer(&self, logits: &Array2<f32>, target: &LossTarget<'_>) -> LossOutput {
        let (losses, probs) = per_sample_cross_entropy(logits, target.labels);
        let agg = SubgroupAggregate::from_losses(
            &losses,
            target.groups,
            target.labels,
            self.n_groups,
            self.n_classes,
        );
        let (value, grad_means) = dca_penalty(agg.means());
        LossOutput {
            value,
            grad_logits: logit_grad(&probs, target.labels, &agg.backprop(&grad_means)),
        }
    }
}

impl LossFn for DirectRegLoss {
    fn forward(&self, logits: &Array2<f32>, target: &LossTarget<'_>) -> LossOutput {
        let base = self.base.forward(logits, target);
        if self.lambda == 0.0 {
            return base;
        }
        base.add(self.regularizer(logits, target).scale(self.lambda))
    }

    fn name(&self) -> &'static str {
        "DirectReg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::loss::CrossEntropyLoss;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_equal_group_losses_zero_penalty() {
        let (value, grad) = dca_penalty(&arr2(&[[0.3, 0.7], [0.3, 0.7]]));
        assert_eq!(value, 0.0);
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_hand_computed_penalty() {
        // class 0 mean 0.5 → |±0.5|, class 1 mean 1.0 → |0|
        let means = arr2(&[[0.0, 1.0], [1.0, 1.0]]);
        let (value, grad) = dca_penalty(&means);
        assert_abs_diff_eq!(value, 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[[0, 0]], -0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[[1, 0]], 0.25, epsilon = 1e-6);
        assert_eq!(grad[[0, 1]], 0.0);

        let per_class = per_class_dca(&means);
        assert_abs_diff_eq!(per_class[0], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(per_class[1], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(per_class.mean().unwrap(), value, epsilon = 1e-6);
    }

    #[test]
    fn test_penalty_gradient_matches_finite_difference() {
        let means = arr2(&[[0.2, 0.9, 0.4], [0.55, 0.1, 0.45], [0.8, 0.3, 0.3]]);
        let (_, grad) = dca_penalty(&means);
        let eps = 1e-3;
        for g in 0..3 {
            for c in 0..3 {
                let mut plus = means.clone();
                plus[[g, c]] += eps;
                let mut minus = means.clone();
                minus[[g, c]] -= eps;
                let fd = (dca_penalty(&plus).0 - dca_penalty(&minus).0) / (2.0 * eps);
                assert_abs_diff_eq!(grad[[g, c]], fd, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn test_lambda_zero_is_base() {
        let logits = arr2(&[[0.1, 0.4], [0.7, -0.2]]);
        let labels = [0, 1];
        let groups = [0, 1];
        let target = LossTarget::new(&labels, &groups);
        let reg = DirectRegLoss::new(Box::new(CrossEntropyLoss), 0.0, 2, 2);
        let base = CrossEntropyLoss.forward(&logits, &target);
        assert_abs_diff_eq!(reg.forward(&logits, &target).value, base.value, epsilon = 1e-7);
    }

    #[test]
    fn test_regularized_value_adds_lambda_dca() {
        let logits = arr2(&[[0.1, 0.4], [0.7, -0.2], [1.0, 0.0]]);
        let labels = [0, 0, 1];
        let groups = [0, 1, 1];
        let target = LossTarget::new(&labels, &groups);
        let reg = DirectRegLoss::new(Box::new(CrossEntropyLoss), 2.0, 2, 2);
        let base = CrossEntropyLoss.forward(&logits, &target).value;
        let penalty = reg.regularizer(&logits, &target).value;
        assert!(penalty > 0.0);
        assert_abs_diff_eq!(reg.forward(&logits, &target).value, base + 2.0 * penalty, epsilon = 1e-6);
    }
}
