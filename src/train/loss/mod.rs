//! Loss functions for fairness-aware training
//!
//! Every loss returns its value together with the gradient with respect to
//! the logits, which the harness hands to [`crate::model::Classifier::backward`].
//!
//! - [`CrossEntropyLoss`] - Mean cross entropy
//! - [`SampleWeightedLoss`] - Per-sample weighted cross entropy
//! - [`GroupBalancedLoss`] - Mean of subgroup mean cross entropy
//! - [`DirectRegLoss`] - Base loss plus the DCA regularizer
//! - [`RobustVarianceLoss`] - Average subgroup loss plus cross-group variance

mod cross_entropy;
mod dca;
mod group_balanced;
mod traits;
mod variance;
mod weighted;

pub use cross_entropy::{
    logit_grad, per_sample_cross_entropy, softmax_backward, softmax_rows, CrossEntropyLoss,
};
pub use dca::{dca_penalty, per_class_dca, DirectRegLoss};
pub use group_balanced::GroupBalancedLoss;
pub use traits::{LossFn, LossOutput, LossTarget};
pub use variance::{class_variances, variance_penalty, RobustVarianceLoss};
pub use weighted::SampleWeightedLoss;

/// Plain or group-balanced cross entropy, as selected by `balanced`
pub fn base_loss(balanced: bool, n_groups: usize, n_classes: usize) -> Box<dyn LossFn> {
    if balanced {
        Box::new(GroupBalancedLoss::new(n_groups, n_classes))
    } else {
        Box::new(CrossEntropyLoss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_names() {
        assert_eq!(CrossEntropyLoss.name(), "CrossEntropy");
        assert_eq!(SampleWeightedLoss.name(), "SampleWeighted");
        assert_eq!(GroupBalancedLoss::new(2, 2).name(), "GroupBalanced");
        assert_eq!(RobustVarianceLoss::new(1.0, 2, 2).name(), "RobustVariance");
        assert_eq!(
            DirectRegLoss::new(Box::new(CrossEntropyLoss), 1.0, 2, 2).name(),
            "DirectReg"
        );
        assert_eq!(base_loss(true, 2, 2).name(), "GroupBalanced");
        assert_eq!(base_loss(false, 2, 2).name(), "CrossEntropy");
    }
}
