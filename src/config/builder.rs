//! Build training components from configuration

use super::schema::{DataSpec, FairSpec, ModelKind, ModelSpec, OptimSpec, SchedulerSpec};
use crate::data::{build_dataset, DatasetPair};
use crate::error::{Error, Result};
use crate::model::{Classifier, LinearClassifier, MlpClassifier};
use crate::optim::{
    Adam, CosineAnnealingLR, LRScheduler, MultiStepLR, Optimizer, PlateauMode, ReduceLROnPlateau,
    ScheduleMode, StepDecayLR, SGD,
};
use crate::train::Harness;

/// Build optimizer from configuration
pub fn build_optimizer(spec: &OptimSpec) -> Result<Box<dyn Optimizer>> {
    match spec.name.to_lowercase().as_str() {
        "sgd" => Ok(Box::new(
            SGD::new(spec.lr, spec.momentum).with_weight_decay(spec.weight_decay),
        )),
        "adam" => Ok(Box::new(
            Adam::new(spec.lr, spec.beta1, spec.beta2, spec.eps)
                .with_weight_decay(spec.weight_decay),
        )),
        name => Err(Error::Config(format!(
            "Unknown optimizer: {name}. Supported: sgd, adam"
        ))),
    }
}

/// Build a scheduler and the mode the training loop steps it in
///
/// Only `plateau` consumes the validation loss; the decision is made here,
/// once, and carried as a [`ScheduleMode`].
pub fn build_scheduler(
    spec: &SchedulerSpec,
    lr: f32,
    epochs: usize,
) -> Result<(Box<dyn LRScheduler>, ScheduleMode)> {
    match spec.name.to_lowercase().as_str() {
        "step" => Ok((
            Box::new(StepDecayLR::new(lr, spec.step_size, spec.gamma)),
            ScheduleMode::PerEpoch,
        )),
        "multistep" => Ok((
            Box::new(MultiStepLR::new(lr, spec.milestones.clone(), spec.gamma)),
            ScheduleMode::PerEpoch,
        )),
        "cosine" => Ok((
            Box::new(CosineAnnealingLR::new(
                lr,
                spec.t_max.unwrap_or(epochs),
                spec.min_lr,
            )),
            ScheduleMode::PerEpoch,
        )),
        "plateau" => {
            let mode = match spec.mode.to_lowercase().as_str() {
                "min" => PlateauMode::Min,
                "max" => PlateauMode::Max,
                other => {
                    return Err(Error::Config(format!(
                        "Unknown plateau mode: {other}. Supported: min, max"
                    )))
                }
            };
            let scheduler = ReduceLROnPlateau::new(lr)
                .with_mode(mode)
                .with_factor(spec.gamma)
                .with_patience(spec.patience)
                .with_threshold(spec.threshold)
                .with_cooldown(spec.cooldown)
                .with_min_lr(spec.min_lr);
            Ok((Box::new(scheduler), ScheduleMode::OnValidationLoss))
        }
        name => Err(Error::Config(format!(
            "Unknown scheduler: {name}. Supported: step, multistep, cosine, plateau"
        ))),
    }
}

/// Build a classifier for the given input width and class count
pub fn build_model(
    spec: &ModelSpec,
    n_features: usize,
    n_classes: usize,
) -> Result<Box<dyn Classifier>> {
    let model: Box<dyn Classifier> = match spec.kind {
        ModelKind::Linear => Box::new(LinearClassifier::new(n_features, n_classes, spec.seed)?),
        ModelKind::Mlp => Box::new(MlpClassifier::new(
            n_features,
            spec.hidden_dim,
            n_classes,
            spec.seed,
        )?),
    };
    Ok(model)
}

/// Build the `(train, test)` datasets named in the data section
pub fn build_datasets(spec: &DataSpec) -> Result<DatasetPair> {
    build_dataset(&spec.name, &spec.synthetic)
}

/// Assemble a harness (model, optimizer, optional scheduler) for a dataset shape
pub fn build_harness(spec: &FairSpec, n_features: usize, n_classes: usize) -> Result<Harness> {
    let model = build_model(&spec.model, n_features, n_classes)?;
    let optimizer = build_optimizer(&spec.optimizer)?;
    let mut harness = Harness::new(model, optimizer, spec.train_config());
    if let Some(sched) = &spec.scheduler {
        let (scheduler, mode) = build_scheduler(sched, spec.optimizer.lr, spec.training.epochs)?;
        harness = harness.with_scheduler(scheduler, mode);
    }
    Ok(harness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FairDataset;

    #[test]
    fn test_build_optimizers() {
        let sgd = build_optimizer(&OptimSpec::default()).unwrap();
        assert_eq!(sgd.name(), "sgd");
        let adam = build_optimizer(&OptimSpec {
            name: "Adam".to_string(),
            lr: 0.002,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(adam.lr(), 0.002);
        assert!(build_optimizer(&OptimSpec {
            name: "lion".to_string(),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_scheduler_modes() {
        let (_, mode) = build_scheduler(&SchedulerSpec::named("plateau"), 0.1, 10).unwrap();
        assert_eq!(mode, ScheduleMode::OnValidationLoss);
        for name in ["step", "multistep", "cosine"] {
            let (s, mode) = build_scheduler(&SchedulerSpec::named(name), 0.1, 10).unwrap();
            assert_eq!(mode, ScheduleMode::PerEpoch);
            assert!((s.get_lr() - 0.1).abs() < 1e-7);
        }
        assert!(build_scheduler(&SchedulerSpec::named("onecycle"), 0.1, 10).is_err());
    }

    #[test]
    fn test_build_model_kinds() {
        let linear = build_model(&ModelSpec::default(), 5, 3).unwrap();
        assert_eq!(linear.name(), "linear");
        assert_eq!(linear.n_classes(), 3);
        let mlp = build_model(
            &ModelSpec {
                kind: ModelKind::Mlp,
                hidden_dim: 4,
                seed: 1,
            },
            5,
            3,
        )
        .unwrap();
        assert_eq!(mlp.n_features(), 5);
        assert!(!mlp.supports_reinit());
    }

    #[test]
    fn test_build_datasets_unknown_name() {
        let spec = DataSpec {
            name: "adult".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            build_datasets(&spec),
            Err(Error::UnknownDataset(_))
        ));
    }

    #[test]
    fn test_build_harness_from_default_spec() {
        let spec = FairSpec {
            scheduler: Some(SchedulerSpec::named("cosine")),
            ..Default::default()
        };
        let (train, _) = build_datasets(&spec.data).unwrap();
        let harness = build_harness(&spec, train.n_features(), train.n_classes()).unwrap();
        assert_eq!(harness.config().epochs, spec.training.epochs);
        assert_eq!(harness.model().n_features(), train.n_features());
    }
}
