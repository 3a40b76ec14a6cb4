//! Renyi-correlation regularized training

use super::{check_compatible, FairTrainer, StrategyParams};
use crate::data::FairDataset;
use crate::error::Result;
use crate::fairness::{collect_probabilities, RenyiWeights};
use crate::train::harness::{EvalReport, Harness, TrainReport};
use crate::train::{base_loss, softmax_backward, softmax_rows, LossFn, LossOutput, LossTarget};

/// Base loss plus `λ ·` correlation penalty, with a closed-form weight refresh
/// after every epoch
pub struct RenyiTrainer {
    params: StrategyParams,
    n_groups: usize,
    n_classes: usize,
    weights: RenyiWeights,
}

impl RenyiTrainer {
    /// Requires exactly two groups and a `dp` or `eo` criterion
    pub fn new(params: StrategyParams, n_groups: usize, n_classes: usize) -> Result<Self> {
        let weights = RenyiWeights::zeros(params.criterion, n_groups, n_classes)?;
        Ok(Self {
            params,
            n_groups,
            n_classes,
            weights,
        })
    }

    /// Current weight state
    pub fn weights(&self) -> &RenyiWeights {
        &self.weights
    }
}

impl FairTrainer for RenyiTrainer {
    fn name(&self) -> &'static str {
        "renyi"
    }

    fn train(
        &mut self,
        harness: &mut Harness,
        train: &dyn FairDataset,
        test: &dyn FairDataset,
    ) -> Result<TrainReport> {
        check_compatible(self.name(), harness, train, test, self.n_groups, self.n_classes)?;
        harness.set_method(self.name());

        let base = base_loss(harness.config().balanced, self.n_groups, self.n_classes);
        let lambda = self.params.lambda;
        let (batch_size, n_workers) = (harness.config().batch_size, harness.config().n_workers);

        harness.begin_run();
        let mut eval = EvalReport::default();
        for epoch in 0..harness.config().epochs {
            let weights = &self.weights;
            let (_, report) =
                harness.epoch(epoch, train, test, self.params.criterion, |logits, batch| {
                    let target = LossTarget::new(&batch.labels, &batch.groups);
                    let probs = softmax_rows(logits);
                    let (value, grad_probs) = weights.penalty(&probs, &batch.labels, &batch.groups);
                    let penalty = LossOutput {
                        value,
                        grad_logits: softmax_backward(&probs, &grad_probs),
                    };
                    base.forward(logits, &target).add(penalty.scale(lambda))
                })?;
            eval = report;

            let pass = collect_probabilities(train, harness.model_mut(), batch_size, n_workers)?;
            self.weights = self
                .weights
                .clone()
                .refresh(&pass.probs, &pass.labels, &pass.groups);

            let test_pass = collect_probabilities(test, harness.model_mut(), batch_size, n_workers)?;
            let (correlation, _) =
                self.weights
                    .penalty(&test_pass.probs, &test_pass.labels, &test_pass.groups);
            harness.log_scalar("renyi", correlation, epoch);
            log::debug!("renyi epoch {epoch}: test correlation {correlation:.4}");
        }
        Ok(harness.end_run(eval))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{data, harness};
    use super::*;
    use crate::error::Error;
    use crate::fairness::FairnessCriterion;
    use crate::tracking::SharedHistory;

    fn params(criterion: FairnessCriterion) -> StrategyParams {
        StrategyParams {
            criterion,
            lambda: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_groups_rejected() {
        let err = RenyiTrainer::new(params(FairnessCriterion::Dp), 3, 2).err().unwrap();
        assert!(matches!(
            err,
            Error::GroupCount {
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_dca_rejected() {
        assert!(matches!(
            RenyiTrainer::new(params(FairnessCriterion::Dca), 2, 2),
            Err(Error::UnsupportedCriterion { .. })
        ));
    }

    #[test]
    fn test_weights_refreshed_each_epoch() {
        for criterion in [FairnessCriterion::Dp, FairnessCriterion::Eo] {
            let (train, test) = data(2);
            let history = SharedHistory::new();
            let mut h = harness(2).with_sink(Box::new(history.clone()));
            let mut trainer = RenyiTrainer::new(params(criterion), 2, 2).unwrap();
            let report = trainer.train(&mut h, &train, &test).unwrap();

            assert!(report.final_loss.is_finite());
            let w = trainer.weights().weights();
            assert!(w.iter().all(|v| v.is_finite() && v.abs() <= 0.5));
            assert!(w.iter().any(|&v| v != 0.0));
            assert_eq!(history.snapshot().series("renyi").unwrap().len(), 2);
        }
    }
}
