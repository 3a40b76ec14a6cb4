//! Static dataset registry

use super::{InMemoryDataset, SyntheticConfig, SyntheticDataset};
use crate::error::{Error, Result};

/// A `(train, test)` split
pub type DatasetPair = (InMemoryDataset, InMemoryDataset);

type DatasetFactory = fn(&SyntheticConfig) -> Result<DatasetPair>;

const DATASETS: &[(&str, DatasetFactory)] = &[
    ("synthetic", synthetic),
    ("synthetic_unbiased", synthetic_unbiased),
];

fn synthetic(config: &SyntheticConfig) -> Result<DatasetPair> {
    SyntheticDataset::train_test(config)
}

fn synthetic_unbiased(config: &SyntheticConfig) -> Result<DatasetPair> {
    let config = SyntheticConfig {
        group_shift: 0.0,
        ..config.clone()
    };
    SyntheticDataset::train_test(&config)
}

/// Names accepted by [`build_dataset`]
pub fn dataset_names() -> Vec<&'static str> {
    DATASETS.iter().map(|(name, _)| *name).collect()
}

/// Build a registered dataset; unknown names fail fast
pub fn build_dataset(name: &str, config: &SyntheticConfig) -> Result<DatasetPair> {
    let (_, factory) = DATASETS
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| Error::UnknownDataset(name.to_string()))?;
    factory(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FairDataset;

    #[test]
    fn test_unknown_dataset_fails() {
        let err = build_dataset("celeba", &SyntheticConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnknownDataset(ref n) if n == "celeba"));
    }

    #[test]
    fn test_registered_names() {
        let names = dataset_names();
        assert!(names.contains(&"synthetic"));
        assert!(names.contains(&"synthetic_unbiased"));
    }

    #[test]
    fn test_build_synthetic() {
        let cfg = SyntheticConfig {
            per_cell: 4,
            test_per_cell: 2,
            ..Default::default()
        };
        let (train, test) = build_dataset("synthetic", &cfg).unwrap();
        assert_eq!(train.len(), 16);
        assert_eq!(test.len(), 8);
    }
}
