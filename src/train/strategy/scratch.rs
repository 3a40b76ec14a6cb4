//! Empirical risk minimization baseline

use super::{check_compatible, FairTrainer, StrategyParams};
use crate::data::{balancing_weights, FairDataset};
use crate::error::Result;
use crate::train::harness::{EvalReport, Harness, TrainReport};
use crate::train::{base_loss, LossFn, LossTarget, SampleWeightedLoss};

/// Plain (or group-balanced) cross entropy, optionally count-reweighted
pub struct ScratchTrainer {
    params: StrategyParams,
    n_groups: usize,
    n_classes: usize,
}

impl ScratchTrainer {
    /// Create the baseline trainer; any criterion is accepted for evaluation
    pub fn new(params: StrategyParams, n_groups: usize, n_classes: usize) -> Self {
        Self {
            params,
            n_groups,
            n_classes,
        }
    }
}

impl FairTrainer for ScratchTrainer {
    fn name(&self) -> &'static str {
        "scratch"
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
        let weights = self.params.reweight.map(|scheme| balancing_weights(train, scheme));
        if weights.is_some() && harness.config().balanced {
            log::warn!("scratch: per-sample reweighting replaces the group-balanced base loss");
        }

        harness.begin_run();
        let mut eval = EvalReport::default();
        for epoch in 0..harness.config().epochs {
            let (_, report) =
                harness.epoch(epoch, train, test, self.params.criterion, |logits, batch| {
                    let target = LossTarget::new(&batch.labels, &batch.groups);
                    match &weights {
                        Some(w) => {
                            let bw: Vec<f32> = batch.indices.iter().map(|&i| w[i]).collect();
                            SampleWeightedLoss.forward(logits, &target.with_weights(&bw))
                        }
                        None => base.forward(logits, &target),
                    }
                })?;
            eval = report;
        }
        Ok(harness.end_run(eval))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{data, harness};
    use super::*;
    use crate::data::BalanceScheme;

    #[test]
    fn test_scratch_trains() {
        let (train, test) = data(2);
        let mut h = harness(3);
        let report = ScratchTrainer::new(StrategyParams::default(), 2, 2)
            .train(&mut h, &train, &test)
            .unwrap();
        assert_eq!(report.method, "scratch");
        assert_eq!(report.epochs, 3);
        assert!(report.final_loss.is_finite());
        assert!(report.eval.accuracy > 0.5);
    }

    #[test]
    fn test_scratch_with_reweighting() {
        let (train, test) = data(2);
        let mut h = harness(1);
        let params = StrategyParams {
            reweight: Some(BalanceScheme::GroupClass),
            ..Default::default()
        };
        let report = ScratchTrainer::new(params, 2, 2)
            .train(&mut h, &train, &test)
            .unwrap();
        assert!(report.final_loss.is_finite());
    }
}
