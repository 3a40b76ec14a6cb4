//! Single-command training from YAML configuration

use std::fs;
use std::path::Path;

use super::builder::{build_datasets, build_harness};
use super::schema::FairSpec;
use super::validate::validate_config;
use crate::data::FairDataset;
use crate::error::{Error, Result};
use crate::tracking::MetricsSink;
use crate::train::{build_trainer, ProgressCallback, TrainReport};

/// Load and validate a run specification from a YAML file
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<FairSpec> {
    let path = config_path.as_ref();
    let yaml_content =
        fs::read_to_string(path).map_err(|e| Error::io_path("reading config", path, e))?;
    let spec: FairSpec = serde_yaml::from_str(&yaml_content)?;
    validate_config(&spec)?;
    Ok(spec)
}

/// Options for [`train_from_spec`] that are not part of the YAML file
#[derive(Default)]
pub struct RunOptions {
    /// Print progress lines through a [`ProgressCallback`]
    pub progress: bool,
    /// Scalar sink for `test/*` and method-specific curves
    pub sink: Option<Box<dyn MetricsSink>>,
}

/// Build datasets, model, optimizer and trainer from a spec and run it
///
/// Configuration errors (unknown dataset, criterion the method does not
/// support, wrong group count) surface before the first batch.
pub fn train_from_spec(spec: &FairSpec, options: RunOptions) -> Result<TrainReport> {
    validate_config(spec)?;
    let (train, test) = build_datasets(&spec.data)?;
    let mut trainer = build_trainer(
        spec.method,
        spec.strategy_params(),
        train.n_groups(),
        train.n_classes(),
    )?;

    let mut harness = build_harness(spec, train.n_features(), train.n_classes())?;
    if let Some(sink) = options.sink {
        harness = harness.with_sink(sink);
    }
    if options.progress {
        harness.add_callback(ProgressCallback::new(spec.training.print_every));
    }

    log::info!(
        "{}: {} train / {} test samples, {} groups × {} classes, criterion {}",
        spec.method,
        train.len(),
        test.len(),
        train.n_groups(),
        train.n_classes(),
        spec.fairness.criterion
    );
    trainer.train(&mut harness, &train, &test)
}

/// Load a YAML file and train it without progress output or a sink
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<TrainReport> {
    let spec = load_config(config_path)?;
    train_from_spec(&spec, RunOptions::default())
}
