//! Robust variance-penalized training

use super::{check_compatible, full_pass_subgroup_means, FairTrainer, StrategyParams};
use crate::data::FairDataset;
use crate::error::Result;
use crate::train::harness::{EvalReport, Harness, TrainReport};
use crate::train::{LossFn, LossTarget, RobustVarianceLoss};

/// Average subgroup loss plus per-class cross-group variance term
///
/// The robust objective replaces the base loss, so `training.balanced` has
/// no effect here.
pub struct RvpTrainer {
    params: StrategyParams,
    n_groups: usize,
    n_classes: usize,
}

impl RvpTrainer {
    /// Create the trainer; the criterion only selects the evaluation disparity
    pub fn new(params: StrategyParams, n_groups: usize, n_classes: usize) -> Self {
        Self {
            params,
            n_groups,
            n_classes,
        }
    }
}

impl FairTrainer for RvpTrainer {
    fn name(&self) -> &'static str {
        "rvp"
    }

    fn train(
        &mut self,
        harness: &mut Harness,
        train: &dyn FairDataset,
        test: &dyn FairDataset,
    ) -> Result<TrainReport> {
        check_compatible(self.name(), harness, train, test, self.n_groups, self.n_classes)?;
        harness.set_method(self.name());

        let loss = RobustVarianceLoss::new(self.params.rho, self.n_groups, self.n_classes);

        harness.begin_run();
        let mut eval = EvalReport::default();
        for epoch in 0..harness.config().epochs {
            let summary = harness.run_epoch(epoch, train, |logits, batch| {
                loss.forward(logits, &LossTarget::new(&batch.labels, &batch.groups))
            })?;
            if harness.config().record {
                let (avg, var) = loss.components(&full_pass_subgroup_means(harness, train)?);
                harness.log_scalar("rvp/avg_loss", avg, epoch);
                harness.log_scalar("rvp/var_loss", var, epoch);
            }
            eval = harness.evaluate(epoch, test, self.params.criterion)?;
            harness.finish_epoch(epoch, &summary, &eval);
        }
        Ok(harness.end_run(eval))
    }
}
