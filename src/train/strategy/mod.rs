//! Fairness training strategies
//!
//! Each strategy drives a [`Harness`] through its own control flow:
//!
//! - [`ScratchTrainer`]: empirical risk minimization, optionally balanced
//! - [`DirectRegTrainer`]: base loss plus λ · DCA regularizer
//! - [`LbcTrainer`]: Lagrangian multiplier reweighting with outer iterations
//! - [`RenyiTrainer`]: Renyi-correlation penalty with per-epoch weight refresh
//! - [`RvpTrainer`]: robust average subgroup loss plus cross-group variance
//!
//! Strategy-owned state (multipliers, correlation weights) is replaced only
//! between full passes, never while a batch is in flight.

mod direct_reg;
mod lbc;
mod renyi;
mod rvp;
mod scratch;

pub use direct_reg::DirectRegTrainer;
pub use lbc::LbcTrainer;
pub use renyi::RenyiTrainer;
pub use rvp::RvpTrainer;
pub use scratch::ScratchTrainer;

use serde::{Deserialize, Serialize};

use super::harness::{Harness, TrainReport};
use super::per_sample_cross_entropy;
use crate::data::{BalanceScheme, DataLoader, FairDataset};
use crate::error::{Error, Result};
use crate::fairness::{FairnessCriterion, GroupClassTable, SubgroupAccumulator, SubgroupAggregate};

/// A training algorithm over a shared harness
pub trait FairTrainer: Send {
    /// Registry name of the strategy
    fn name(&self) -> &'static str;

    /// Train `harness`'s model on `train`, evaluating on `test` every epoch
    fn train(
        &mut self,
        harness: &mut Harness,
        train: &dyn FairDataset,
        test: &dyn FairDataset,
    ) -> Result<TrainReport>;
}

/// Strategy coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Fairness criterion
    pub criterion: FairnessCriterion,
    /// Regularizer weight (direct_reg, renyi)
    pub lambda: f32,
    /// Multiplier learning rate (lbc)
    pub eta: f32,
    /// Variance coefficient (rvp)
    pub rho: f32,
    /// Outer iterations (lbc)
    pub iterations: usize,
    /// Reinitialize the model before every outer iteration (lbc)
    pub restart_from_scratch: bool,
    /// Count-based per-sample reweighting (scratch)
    pub reweight: Option<BalanceScheme>,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            criterion: FairnessCriterion::Eo,
            lambda: 1.0,
            eta: 0.1,
            rho: 1.0,
            iterations: 10,
            restart_from_scratch: true,
            reweight: None,
        }
    }
}

/// Check that datasets and model agree with the shape a trainer was built for
pub(crate) fn check_compatible(
    method: &str,
    harness: &Harness,
    train: &dyn FairDataset,
    test: &dyn FairDataset,
    n_groups: usize,
    n_classes: usize,
) -> Result<()> {
    for (split, ds) in [("train", train), ("test", test)] {
        if ds.n_groups() != n_groups || ds.n_classes() != n_classes {
            return Err(Error::Config(format!(
                "{method} was built for {n_groups} groups × {n_classes} classes, \
                 but the {split} split has {} × {}",
                ds.n_groups(),
                ds.n_classes()
            )));
        }
    }
    let model = harness.model();
    if model.n_classes() != n_classes || model.n_features() != train.n_features() {
        return Err(Error::ShapeMismatch {
            expected: vec![train.n_features(), n_classes],
            actual: vec![model.n_features(), model.n_classes()],
        });
    }
    Ok(())
}

/// Zero-guarded subgroup mean cross entropy over one full pass, without gradients
///
/// Leaves the model in evaluation mode.
pub(crate) fn full_pass_subgroup_means(
    harness: &mut Harness,
    dataset: &dyn FairDataset,
) -> Result<GroupClassTable> {
    let (n_groups, n_classes) = (dataset.n_groups(), dataset.n_classes());
    let (batch_size, n_workers) = (harness.config().batch_size, harness.config().n_workers);
    harness.model_mut().eval_mode();
    let model = harness.model();
    let mut acc = SubgroupAccumulator::new(n_groups, n_classes);

    DataLoader::new(dataset, batch_size)
        .with_workers(n_workers)
        .try_for_each(0, |_, batch| {
            let (losses, _) = per_sample_cross_entropy(&model.forward(&batch.inputs), &batch.labels);
            acc.add(&SubgroupAggregate::from_losses(
                &losses,
                &batch.groups,
                &batch.labels,
                n_groups,
                n_classes,
            ));
            Ok(())
        })?;
    Ok(acc.finish())
}

/// `(g{g}_c{c}, value)` pairs of a group-class table, row-major
pub(crate) fn table_scalars(table: &GroupClassTable) -> Vec<(String, f32)> {
    table
        .indexed_iter()
        .map(|((g, c), &v)| (format!("g{g}_c{c}"), v))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::data::{InMemoryDataset, SyntheticConfig, SyntheticDataset};
    use crate::model::LinearClassifier;
    use crate::optim::SGD;
    use crate::train::{Harness, TrainConfig};

    pub fn data(n_groups: usize) -> (InMemoryDataset, InMemoryDataset) {
        let cfg = SyntheticConfig {
            n_groups,
            per_cell: 30,
            test_per_cell: 10,
            n_features: 4,
            ..Default::default()
        };
        SyntheticDataset::train_test(&cfg).unwrap()
    }

    pub fn harness(epochs: usize) -> Harness {
        let model = LinearClassifier::new(4, 2, 0).unwrap();
        Harness::new(
            Box::new(model),
            Box::new(SGD::new(0.05, 0.9)),
            TrainConfig::new().with_epochs(epochs).with_batch_size(32),
        )
    }
}
