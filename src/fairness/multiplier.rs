//! Lagrangian multiplier state
//!
//! Multipliers live in a `(n_groups, n_classes)` table. Sample weights are
//! always derived from the current multipliers through a sigmoid link and are
//! never accumulated; the multipliers themselves persist across outer
//! iterations and only change through [`MultiplierState::descend`].

use super::subgroup::GroupClassTable;
use crate::error::{Error, Result};
use ndarray::Array2;

/// Logistic sigmoid
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-subgroup Lagrange multipliers
#[derive(Clone, Debug, PartialEq)]
pub struct MultiplierState {
    multipliers: GroupClassTable,
}

impl MultiplierState {
    /// All-zero multipliers (every weight starts at 0.5)
    pub fn zeros(n_groups: usize, n_classes: usize) -> Self {
        Self {
            multipliers: Array2::zeros((n_groups, n_classes)),
        }
    }

    /// Raw multiplier table
    pub fn multipliers(&self) -> &GroupClassTable {
        &self.multipliers
    }

    /// `sigmoid(multipliers)` elementwise
    pub fn weight_matrix(&self) -> GroupClassTable {
        self.multipliers.mapv(sigmoid)
    }

    /// Per-sample weights `sigmoid(multipliers)[group, label]`, aligned with the inputs
    pub fn sample_weights(&self, groups: &[usize], labels: &[usize]) -> Vec<f32> {
        let w = self.weight_matrix();
        groups
            .iter()
            .zip(labels)
            .map(|(&g, &y)| w[[g, y]])
            .collect()
    }

    /// One descent step: `multipliers - eta * violations`
    pub fn descend(self, violations: &GroupClassTable, eta: f32) -> Result<Self> {
        if violations.dim() != self.multipliers.dim() {
            let (g, c) = self.multipliers.dim();
            let (vg, vc) = violations.dim();
            return Err(Error::ShapeMismatch {
                expected: vec![g, c],
                actual: vec![vg, vc],
            });
        }
        Ok(Self {
            multipliers: self.multipliers - &(violations * eta),
        })
    }
}
