//! Dataset collaborators
//!
//! Trainers consume datasets through [`FairDataset`]: indexable samples that
//! carry a sensitive group id, a class label and their own index, plus the
//! dataset-level `n_groups` / `n_classes`. Loading and preprocessing real
//! datasets happens outside this crate; the only built-in source is the
//! synthetic generator used by the CLI and tests.

mod counts;
mod dataset;
mod loader;
mod registry;
mod synthetic;

pub use counts::{balancing_weights, group_class_counts, BalanceScheme};
pub use dataset::{FairDataset, InMemoryDataset, Sample};
pub use loader::{Batch, DataLoader};
pub use registry::{build_dataset, dataset_names, DatasetPair};
pub use synthetic::{SyntheticConfig, SyntheticDataset};
