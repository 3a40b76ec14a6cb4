//! Direct regularization of the inter-group loss gap

use super::{check_compatible, full_pass_subgroup_means, FairTrainer, StrategyParams};
use crate::data::FairDataset;
use crate::error::{Error, Result};
use crate::fairness::FairnessCriterion;
use crate::train::harness::{EvalReport, Harness, TrainReport};
use crate::train::{base_loss, per_class_dca, DirectRegLoss, LossFn, LossTarget};

/// Base loss plus `λ · DCA` over per-batch subgroup mean losses
pub struct DirectRegTrainer {
    params: StrategyParams,
    n_groups: usize,
    n_classes: usize,
}

impl DirectRegTrainer {
    /// Only the `dca` criterion has a direct regularizer
    pub fn new(params: StrategyParams, n_groups: usize, n_classes: usize) -> Result<Self> {
        if params.criterion != FairnessCriterion::Dca {
            return Err(Error::UnsupportedCriterion {
                method: "direct_reg".to_string(),
                criterion: params.criterion.to_string(),
                supported: "dca".to_string(),
            });
        }
        Ok(Self {
            params,
            n_groups,
            n_classes,
        })
    }

    /// Log the per-class DCA of the full training set as `regs/l{c}`
    fn record_regularizer(
        &self,
        harness: &mut Harness,
        train: &dyn FairDataset,
        epoch: usize,
    ) -> Result<()> {
        let means = full_pass_subgroup_means(harness, train)?;
        let regs: Vec<(String, f32)> = per_class_dca(&means)
            .iter()
            .enumerate()
            .map(|(c, &v)| (format!("l{c}"), v))
            .collect();
        harness.log_scalars("regs", &regs, epoch);
        Ok(())
    }
}

impl FairTrainer for DirectRegTrainer {
    fn name(&self) -> &'static str {
        "direct_reg"
    }

    fn train(
        &mut self,
        harness: &mut Harness,
        train: &dyn FairDataset,
        test: &dyn FairDataset,
    ) -> Result<TrainReport> {
        check_compatible(self.name(), harness, train, test, self.n_groups, self.n_classes)?;
        harness.set_method(self.name());

        let loss = DirectRegLoss::new(
            base_loss(harness.config().balanced, self.n_groups, self.n_classes),
            self.params.lambda,
            self.n_groups,
            self.n_classes,
        );

        harness.begin_run();
        let mut eval = EvalReport::default();
        for epoch in 0..harness.config().epochs {
            let summary = harness.run_epoch(epoch, train, |logits, batch| {
                loss.forward(logits, &LossTarget::new(&batch.labels, &batch.groups))
            })?;
            if harness.config().record {
                self.record_regularizer(harness, train, epoch)?;
            }
            eval = harness.evaluate(epoch, test, self.params.criterion)?;
            harness.finish_epoch(epoch, &summary, &eval);
        }
        Ok(harness.end_run(eval))
    }
}
