//! Renyi-correlation soft weights
//!
//! The weight matrix is `1 × C` for demographic parity and `C × C` for equal
//! opportunity (row `c` belongs to the samples whose true label is `c`). Each
//! sample contributes `Σ_k (-w_rk² + w_rk·s̃) p_k`, where `s̃ = 2·group - 1`
//! and `r` is the row the sample reads. The refresh is the closed-form
//! maximizer `w_rk = Σ s̃ p_k / (2 Σ p_k)` over the samples of row `r`.

use super::violation::FairnessCriterion;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};

/// Signed binary group indicator `2·g - 1`
pub fn signed_groups(groups: &[usize]) -> Array1<f32> {
    groups.iter().map(|&g| 2.0 * g as f32 - 1.0).collect()
}

/// Correlation weight matrix
#[derive(Clone, Debug, PartialEq)]
pub struct RenyiWeights {
    criterion: FairnessCriterion,
    weights: Array2<f32>,
}

impl RenyiWeights {
    /// Zero weights; requires exactly two groups and a `dp` or `eo` criterion
    pub fn zeros(criterion: FairnessCriterion, n_groups: usize, n_classes: usize) -> Result<Self> {
        if n_groups != 2 {
            return Err(Error::GroupCount {
                method: "renyi".to_string(),
                expected: 2,
                actual: n_groups,
            });
        }
        let rows = match criterion {
            FairnessCriterion::Dp => 1,
            FairnessCriterion::Eo => n_classes,
            FairnessCriterion::Dca => {
                return Err(Error::UnsupportedCriterion {
                    method: "renyi".to_string(),
                    criterion: criterion.to_string(),
                    supported: "dp, eo".to_string(),
                })
            }
        };
        Ok(Self {
            criterion,
            weights: Array2::zeros((rows, n_classes)),
        })
    }

    /// Current weight matrix
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Criterion the matrix was built for
    pub fn criterion(&self) -> FairnessCriterion {
        self.criterion
    }

    fn n_classes(&self) -> usize {
        self.weights.ncols()
    }

    fn row_of(&self, label: usize) -> usize {
        match self.criterion {
            FairnessCriterion::Eo => label,
            _ => 0,
        }
    }

    /// Sample indices feeding each row
    fn row_members(&self, labels: &[usize]) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.weights.nrows()];
        for (i, &y) in labels.iter().enumerate() {
            members[self.row_of(y)].push(i);
        }
        members
    }

    /// Correlation penalty for a batch and its gradient with respect to `probs`
    ///
    /// DP averages over the batch. EO averages within each true-class subset
    /// and sums over classes; empty subsets contribute nothing.
    pub fn penalty(&self, probs: &Array2<f32>, labels: &[usize], groups: &[usize]) -> (f32, Array2<f32>) {
        let s_tilde = signed_groups(groups);
        let mut grad = Array2::zeros(probs.raw_dim());
        let mut value = 0.0;

        for (row, members) in self.row_members(labels).iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let scale = 1.0 / members.len() as f32;
            let w = self.weights.row(row);
            for &i in members {
                for k in 0..self.n_classes() {
                    let coeff = -w[k] * w[k] + w[k] * s_tilde[i];
                    value += coeff * probs[[i, k]] * scale;
                    grad[[i, k]] = coeff * scale;
                }
            }
        }
        (value, grad)
    }

    /// Closed-form refresh from a full pass of probabilities
    ///
    /// Returns the new state; the old one is consumed. A row whose denominator
    /// is zero (no samples of that class) keeps weight 0.
    pub fn refresh(self, probs: &Array2<f32>, labels: &[usize], groups: &[usize]) -> Self {
        let s_tilde = signed_groups(groups);
        let n_classes = self.n_classes();
        let mut weights = Array2::zeros(self.weights.raw_dim());

        for (row, members) in self.row_members(labels).iter().enumerate() {
            for k in 0..n_classes {
                let num: f32 = members.iter().map(|&i| s_tilde[i] * probs[[i, k]]).sum();
                let den: f32 = 2.0 * members.iter().map(|&i| probs[[i, k]]).sum::<f32>();
                if den == 0.0 {
                    log::warn!("renyi weight row {row}, class {k} has no probability mass; set to 0");
                    continue;
                }
                weights[[row, k]] = num / den;
            }
        }

        Self {
            criterion: self.criterion,
            weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_shapes() {
        let dp = RenyiWeights::zeros(FairnessCriterion::Dp, 2, 3).unwrap();
        assert_eq!(dp.weights().dim(), (1, 3));
        let eo = RenyiWeights::zeros(FairnessCriterion::Eo, 2, 3).unwrap();
        assert_eq!(eo.weights().dim(), (3, 3));
    }

    #[test]
    fn test_more_than_two_groups_fails() {
        let err = RenyiWeights::zeros(FairnessCriterion::Dp, 3, 2).unwrap_err();
        assert!(matches!(err, Error::GroupCount { actual: 3, .. }));
    }

    #[test]
    fn test_dca_fails() {
        assert!(RenyiWeights::zeros(FairnessCriterion::Dca, 2, 2).is_err());
    }

    #[test]
    fn test_zero_weights_zero_penalty() {
        let w = RenyiWeights::zeros(FairnessCriterion::Dp, 2, 2).unwrap();
        let probs = arr2(&[[0.3, 0.7], [0.9, 0.1]]);
        let (value, grad) = w.penalty(&probs, &[0, 1], &[0, 1]);
        assert_eq!(value, 0.0);
        assert!(grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_dp_refresh_hand_computed() {
        // s̃ = [-1, +1]
        let probs = arr2(&[[0.8, 0.2], [0.4, 0.6]]);
        let w = RenyiWeights::zeros(FairnessCriterion::Dp, 2, 2)
            .unwrap()
            .refresh(&probs, &[0, 1], &[0, 1]);
        // class 0: (-0.8 + 0.4) / (2 * 1.2); class 1: (-0.2 + 0.6) / (2 * 0.8)
        assert_abs_diff_eq!(w.weights()[[0, 0]], -0.4 / 2.4, epsilon = 1e-6);
        assert_abs_diff_eq!(w.weights()[[0, 1]], 0.4 / 1.6, epsilon = 1e-6);
    }

    #[test]
    fn test_eo_penalty_after_refresh() {
        let probs = arr2(&[[0.8, 0.2], [0.4, 0.6], [0.5, 0.5]]);
        let labels = [0, 0, 1];
        let groups = [0, 1, 1];
        let w = RenyiWeights::zeros(FairnessCriterion::Eo, 2, 2)
            .unwrap()
            .refresh(&probs, &labels, &groups);
        assert_abs_diff_eq!(w.weights()[[0, 0]], -0.4 / 2.4, epsilon = 1e-6);
        // row 1 only sees sample 2 with s̃ = +1
        assert_abs_diff_eq!(w.weights()[[1, 0]], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(w.weights()[[1, 1]], 0.5, epsilon = 1e-6);

        let (value, grad) = w.penalty(&probs, &labels, &groups);
        // row 1: Σ_k (-0.25 + 0.5) * 0.5 = 0.25
        let w00: f32 = -0.4 / 2.4;
        let w01: f32 = 0.4 / 1.6;
        let c00 = -w00 * w00 - w00;
        let c01 = -w01 * w01 - w01;
        let c10 = -w00 * w00 + w00;
        let c11 = -w01 * w01 + w01;
        let row0 = 0.5 * (c00 * 0.8 + c01 * 0.2 + c10 * 0.4 + c11 * 0.6);
        assert_abs_diff_eq!(value, row0 + 0.25, epsilon = 1e-5);
        assert_abs_diff_eq!(grad[[2, 0]], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[[0, 0]], 0.5 * c00, epsilon = 1e-6);
    }
}
