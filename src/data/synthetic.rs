//! Seeded synthetic group/class datasets
//!
//! Every `(group, class)` cell gets `per_cell` samples. The class signal lives
//! in one feature per class; `group_shift` weakens that signal for higher group
//! ids and leaks the group id into the last feature, so an unconstrained model
//! ends up with unequal per-group accuracy.

use super::InMemoryDataset;
use crate::error::Result;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Synthetic dataset parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Number of sensitive groups
    #[serde(default = "default_two")]
    pub n_groups: usize,
    /// Number of classes
    #[serde(default = "default_two")]
    pub n_classes: usize,
    /// Training samples per group-class cell
    #[serde(default = "default_per_cell")]
    pub per_cell: usize,
    /// Test samples per group-class cell
    #[serde(default = "default_test_per_cell")]
    pub test_per_cell: usize,
    /// Feature width (at least `n_classes + 1`)
    #[serde(default = "default_n_features")]
    pub n_features: usize,
    /// Strength of group-dependent signal degradation and leakage
    #[serde(default = "default_group_shift")]
    pub group_shift: f32,
    /// Amplitude of per-feature noise
    #[serde(default = "default_noise")]
    pub noise: f32,
    /// RNG seed (the test split uses `seed + 1`)
    #[serde(default)]
    pub seed: u64,
}

fn default_two() -> usize {
    2
}
fn default_per_cell() -> usize {
    100
}
fn default_test_per_cell() -> usize {
    25
}
fn default_n_features() -> usize {
    8
}
fn default_group_shift() -> f32 {
    1.0
}
fn default_noise() -> f32 {
    1.0
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_groups: default_two(),
            n_classes: default_two(),
            per_cell: default_per_cell(),
            test_per_cell: default_test_per_cell(),
            n_features: default_n_features(),
            group_shift: default_group_shift(),
            noise: default_noise(),
            seed: 0,
        }
    }
}

/// Generator for [`SyntheticConfig`] datasets
pub struct SyntheticDataset;

impl SyntheticDataset {
    /// Generate one split with `per_cell` samples per cell
    pub fn generate(config: &SyntheticConfig, per_cell: usize, seed: u64) -> Result<InMemoryDataset> {
        let mut rng = StdRng::seed_from_u64(seed);
        let n_features = config.n_features.max(config.n_classes + 1);
        let capacity = config.n_groups * config.n_classes * per_cell;
        let mut inputs = Vec::with_capacity(capacity);
        let mut groups = Vec::with_capacity(capacity);
        let mut labels = Vec::with_capacity(capacity);

        for g in 0..config.n_groups {
            let signal = 2.0 / (1.0 + config.group_shift * g as f32);
            for y in 0..config.n_classes {
                for _ in 0..per_cell {
                    let mut x = Array1::from_shape_fn(n_features, |_| {
                        config.noise * (rng.gen::<f32>() + rng.gen::<f32>() - 1.0)
                    });
                    x[y] += signal;
                    x[n_features - 1] += config.group_shift * g as f32;
                    inputs.push(x);
                    groups.push(g);
                    labels.push(y);
                }
            }
        }

        // interleave cells so that sequential batches mix groups and classes
        let mut order: Vec<usize> = (0..inputs.len()).collect();
        order.shuffle(&mut rng);
        let inputs = order.iter().map(|&i| inputs[i].clone()).collect();
        let groups = order.iter().map(|&i| groups[i]).collect();
        let labels = order.iter().map(|&i| labels[i]).collect();

        InMemoryDataset::from_parts(inputs, groups, labels, config.n_groups, config.n_classes)
    }

    /// Generate a `(train, test)` pair
    pub fn train_test(config: &SyntheticConfig) -> Result<(InMemoryDataset, InMemoryDataset)> {
        let train = Self::generate(config, config.per_cell, config.seed)?;
        let test = Self::generate(config, config.test_per_cell, config.seed.wrapping_add(1))?;
        Ok((train, test))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{group_class_counts, FairDataset};

    #[test]
    fn test_every_cell_filled() {
        let cfg = SyntheticConfig {
            n_groups: 3,
            n_classes: 2,
            per_cell: 10,
            ..Default::default()
        };
        let ds = SyntheticDataset::generate(&cfg, cfg.per_cell, 0).unwrap();
        assert_eq!(ds.len(), 60);
        assert!(group_class_counts(&ds).iter().all(|&c| c == 10));
    }

    #[test]
    fn test_seed_reproducible() {
        let cfg = SyntheticConfig::default();
        let a = SyntheticDataset::generate(&cfg, 5, 9).unwrap();
        let b = SyntheticDataset::generate(&cfg, 5, 9).unwrap();
        assert_eq!(a.samples(), b.samples());
    }

    #[test]
    fn test_feature_width_covers_classes() {
        let cfg = SyntheticConfig {
            n_classes: 5,
            n_features: 2,
            per_cell: 1,
            ..Default::default()
        };
        let ds = SyntheticDataset::generate(&cfg, 1, 0).unwrap();
        assert_eq!(ds.n_features(), 6);
    }

    #[test]
    fn test_train_test_sizes() {
        let cfg = SyntheticConfig::default();
        let (train, test) = SyntheticDataset::train_test(&cfg).unwrap();
        assert_eq!(train.len(), 400);
        assert_eq!(test.len(), 100);
    }
}
