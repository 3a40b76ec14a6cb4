//! Group-balanced cross entropy

use ndarray::Array2;

use super::cross_entropy::{logit_grad, per_sample_cross_entropy};
use super::{LossFn, LossOutput, LossTarget};
use crate::fairness::SubgroupAggregate;

/// Mean over all `(group, class)` subgroups of the zero-guarded subgroup mean loss
///
/// Subgroups absent from the batch contribute 0 and still count in the
/// denominator `n_groups * n_classes`.
pub struct GroupBalancedLoss {
    n_groups: usize,
    n_classes: usize,
}

impl GroupBalancedLoss {
    /// Create for a fixed group/class layout
    pub fn new(n_groups: usize, n_classes: usize) -> Self {
        Self { n_groups, n_classes }
    }
}

impl LossFn for GroupBalancedLoss {
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
        let grad_means = Array2::from_elem((self.n_groups, self.n_classes), 1.0 / n_sub);
        LossOutput {
            value: agg.means().sum() / n_sub,
            grad_logits: logit_grad(&probs, target.labels, &agg.backprop(&grad_means)),
        }
    }

    fn name(&self) -> &'static str {
        "GroupBalanced"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_balanced_value_is_mean_of_subgroup_means() {
        let logits = arr2(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]);
        let labels = [0, 0, 1];
        let groups = [0, 0, 1];
        let out = GroupBalancedLoss::new(2, 2).forward(&logits, &LossTarget::new(&labels, &groups));
        let (losses, _) = per_sample_cross_entropy(&logits, &labels);
        let expected = ((losses[0] + losses[1]) / 2.0 + losses[2]) / 4.0;
        assert_abs_diff_eq!(out.value, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let logits = arr2(&[[0.3, -0.1], [0.2, 0.4], [-0.5, 0.1], [0.0, 0.9]]);
        let labels = [0, 1, 1, 0];
        let groups = [0, 0, 1, 1];
        let target = LossTarget::new(&labels, &groups);
        let loss = GroupBalancedLoss::new(2, 2);
        let out = loss.forward(&logits, &target);
        let eps = 1e-3;
        for i in 0..4 {
            for k in 0..2 {
                let mut plus = logits.clone();
                plus[[i, k]] += eps;
                let mut minus = logits.clone();
                minus[[i, k]] -= eps;
                let fd = (loss.forward(&plus, &target).value - loss.forward(&minus, &target).value)
                    / (2.0 * eps);
                assert_abs_diff_eq!(out.grad_logits[[i, k]], fd, epsilon = 1e-3);
            }
        }
    }
}
