//! Declarative YAML run configuration
//!
//! - [`schema`]: the `FairSpec` document and its sections
//! - [`validate_config`]: range and name checks
//! - builders from spec sections to runtime objects
//! - [`train_from_spec`] / [`train_from_yaml`]: one-call runs

mod builder;
mod run;
pub mod schema;
mod validate;

pub use builder::{build_datasets, build_harness, build_model, build_optimizer, build_scheduler};
pub use run::{load_config, train_from_spec, train_from_yaml, RunOptions};
pub use schema::{
    DataSpec, FairSpec, FairnessSpec, ModelKind, ModelSpec, OptimSpec, SchedulerSpec,
    TrainingParams,
};
pub use validate::{validate_config, ValidationError};
