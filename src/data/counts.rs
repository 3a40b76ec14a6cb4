//! Group-class counting and count-based balancing weights

use super::FairDataset;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// How balancing weights are derived from group-class counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceScheme {
    /// `len / count[group, label]`: every subgroup carries equal total weight
    #[default]
    GroupClass,
    /// `len / Σ_g count[g, label]`: every class carries equal total weight
    Class,
}

/// Count samples per `(group, label)` cell
pub fn group_class_counts(dataset: &dyn FairDataset) -> Array2<usize> {
    let mut counts = Array2::zeros((dataset.n_groups(), dataset.n_classes()));
    for i in 0..dataset.len() {
        let s = dataset.get(i);
        counts[[s.group, s.label]] += 1;
    }
    counts
}

/// Per-sample weights (aligned with dataset order) that equalize subgroup or class mass
///
/// Cells with zero count never receive a weight because no sample falls in them.
pub fn balancing_weights(dataset: &dyn FairDataset, scheme: BalanceScheme) -> Vec<f32> {
    let counts = group_class_counts(dataset);
    let total = dataset.len() as f32;
    let class_counts = counts.sum_axis(Axis(0));
    (0..dataset.len())
        .map(|i| {
            let s = dataset.get(i);
            let denom = match scheme {
                BalanceScheme::GroupClass => counts[[s.group, s.label]],
                BalanceScheme::Class => class_counts[s.label],
            };
            total / denom.max(1) as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryDataset;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;

    fn skewed() -> InMemoryDataset {
        // group 0: 3 × label 0, 1 × label 1; group 1: 2 × label 1
        InMemoryDataset::from_parts(
            vec![arr1(&[0.0]); 6],
            vec![0, 0, 0, 0, 1, 1],
            vec![0, 0, 0, 1, 1, 1],
            2,
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_group_class_counts() {
        let counts = group_class_counts(&skewed());
        assert_eq!(counts[[0, 0]], 3);
        assert_eq!(counts[[0, 1]], 1);
        assert_eq!(counts[[1, 0]], 0);
        assert_eq!(counts[[1, 1]], 2);
    }

    #[test]
    fn test_group_class_weights() {
        let w = balancing_weights(&skewed(), BalanceScheme::GroupClass);
        assert_abs_diff_eq!(w[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[3], 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[4], 3.0, epsilon = 1e-6);
        // every non-empty subgroup sums to len
        assert_abs_diff_eq!(w[0] + w[1] + w[2], 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_class_weights() {
        let w = balancing_weights(&skewed(), BalanceScheme::Class);
        assert_abs_diff_eq!(w[0], 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(w[5], 2.0, epsilon = 1e-6);
    }
}
