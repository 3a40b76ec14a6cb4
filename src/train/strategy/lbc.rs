//! Lagrangian reweighting via constraint-violation feedback
//!
//! Outer iteration `t`:
//!
//! 1. weights `w_i = sigmoid(λ)[g_i, y_i]`, recomputed from the multipliers
//! 2. optionally restart the model, optimizer and scheduler
//! 3. full inner training with weighted cross entropy
//! 4. full-pass predictions on the training set
//! 5. `λ ← λ − η · violation`
//!
//! Multipliers persist across iterations (and across calls to `train`).

use super::{check_compatible, table_scalars, FairTrainer, StrategyParams};
use crate::data::FairDataset;
use crate::error::{Error, Result};
use crate::fairness::{collect_statistics, compute_violations, FairnessCriterion, MultiplierState};
use crate::train::harness::{EvalReport, Harness, TrainReport};
use crate::train::{LossFn, LossTarget, SampleWeightedLoss};

/// Lagrangian multiplier reweighting trainer
pub struct LbcTrainer {
    params: StrategyParams,
    n_groups: usize,
    n_classes: usize,
    multipliers: MultiplierState,
}

impl LbcTrainer {
    /// Violations exist for `dp` and `eo` only
    pub fn new(params: StrategyParams, n_groups: usize, n_classes: usize) -> Result<Self> {
        if params.criterion == FairnessCriterion::Dca {
            return Err(Error::UnsupportedCriterion {
                method: "lbc".to_string(),
                criterion: params.criterion.to_string(),
                supported: "dp, eo".to_string(),
            });
        }
        Ok(Self {
            params,
            n_groups,
            n_classes,
            multipliers: MultiplierState::zeros(n_groups, n_classes),
        })
    }

    /// Current multipliers
    pub fn multipliers(&self) -> &MultiplierState {
        &self.multipliers
    }
}

impl FairTrainer for LbcTrainer {
    fn name(&self) -> &'static str {
        "lbc"
    }

    fn train(
        &mut self,
        harness: &mut Harness,
        train: &dyn FairDataset,
        test: &dyn FairDataset,
    ) -> Result<TrainReport> {
        check_compatible(self.name(), harness, train, test, self.n_groups, self.n_classes)?;
        harness.set_method(self.name());
        if self.params.restart_from_scratch && !harness.model().supports_reinit() {
            return Err(Error::Config(format!(
                "lbc: restart_from_scratch is set but model '{}' cannot be reinitialized",
                harness.model().name()
            )));
        }

        let (batch_size, n_workers) = (harness.config().batch_size, harness.config().n_workers);
        let layout = collect_statistics(train, None, batch_size, n_workers)?;
        let criterion = self.params.criterion;
        let iterations = self.params.iterations;

        harness.begin_run();
        let mut eval = EvalReport::default();
        let mut epoch = 0;
        for iteration in 0..iterations {
            let weights = self.multipliers.sample_weights(&layout.groups, &layout.labels);
            if self.params.restart_from_scratch {
                harness.restart()?;
            }

            for _ in 0..harness.config().epochs {
                let (_, report) = harness.epoch(epoch, train, test, criterion, |logits, batch| {
                    let bw: Vec<f32> = batch.indices.iter().map(|&i| weights[i]).collect();
                    let target = LossTarget::new(&batch.labels, &batch.groups).with_weights(&bw);
                    SampleWeightedLoss.forward(logits, &target)
                })?;
                eval = report;
                epoch += 1;
            }

            let stats = collect_statistics(train, Some(harness.model_mut()), batch_size, n_workers)?;
            let predictions = stats
                .predictions
                .as_deref()
                .ok_or_else(|| Error::Dataset("statistics pass returned no predictions".into()))?;
            let report = compute_violations(
                criterion,
                predictions,
                &stats.labels,
                &stats.groups,
                self.n_groups,
                self.n_classes,
            )?;

            self.multipliers = self
                .multipliers
                .clone()
                .descend(&report.violations, self.params.eta)?;

            harness.log_scalar("lbc/train_acc", report.accuracy, iteration);
            harness.log_scalars("lbc/violation", &table_scalars(&report.violations), iteration);
            harness.log_scalars(
                "lbc/multiplier",
                &table_scalars(self.multipliers.multipliers()),
                iteration,
            );
            log::info!(
                "lbc iteration {}/{}: train acc {:.3}, max |violation| {:.4}",
                iteration + 1,
                iterations,
                report.accuracy,
                report.violations.iter().fold(0.0f32, |m, v| m.max(v.abs()))
            );

            harness.model_mut().train_mode();
            harness.end_iteration(iteration, iterations);
        }
        Ok(harness.end_run(eval))
    }
}
