//! Constraint violations and disparity metrics

use super::subgroup::GroupClassTable;
use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fairness criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FairnessCriterion {
    /// Demographic parity: equal predicted-class rate across groups
    Dp,
    /// Equal opportunity: equal true-positive rate across groups
    Eo,
    /// Difference of conditional accuracy: equal per-class loss across groups
    Dca,
}

impl FairnessCriterion {
    /// Lowercase name as used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dp => "dp",
            Self::Eo => "eo",
            Self::Dca => "dca",
        }
    }
}

impl fmt::Display for FairnessCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FairnessCriterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dp" => Ok(Self::Dp),
            "eo" => Ok(Self::Eo),
            "dca" => Ok(Self::Dca),
            other => Err(Error::Config(format!("unknown fairness criterion: {other}"))),
        }
    }
}

/// Violations from one statistics pass
#[derive(Clone, Debug, PartialEq)]
pub struct ViolationReport {
    /// Fraction of correct predictions
    pub accuracy: f32,
    /// `(n_groups, n_classes)` gap between group rate and pivot rate
    pub violations: GroupClassTable,
}

fn check_aligned(predictions: &[usize], labels: &[usize], groups: &[usize]) -> Result<()> {
    if predictions.len() != labels.len() || labels.len() != groups.len() {
        return Err(Error::ShapeMismatch {
            expected: vec![labels.len(); 3],
            actual: vec![predictions.len(), labels.len(), groups.len()],
        });
    }
    Ok(())
}

fn accuracy(predictions: &[usize], labels: &[usize]) -> f32 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions.iter().zip(labels).filter(|(p, y)| p == y).count();
    correct as f32 / labels.len() as f32
}

fn guarded_ratio(num: f32, den: f32, what: &str) -> f32 {
    if den == 0.0 {
        log::warn!("empty {what}; violation contribution set to 0");
        0.0
    } else {
        num / den
    }
}

/// Demographic-parity violation
///
/// `v[g, c] = #{group g predicted c} / #{group g} - #{predicted c} / n`
pub fn dp_violations(
    predictions: &[usize],
    labels: &[usize],
    groups: &[usize],
    n_groups: usize,
    n_classes: usize,
) -> Result<ViolationReport> {
    check_aligned(predictions, labels, groups)?;
    let mut predicted = Array2::<f32>::zeros((n_groups, n_classes));
    let mut group_size = vec![0.0f32; n_groups];
    for (&p, &g) in predictions.iter().zip(groups) {
        predicted[[g, p]] += 1.0;
        group_size[g] += 1.0;
    }
    let total = predictions.len() as f32;
    let overall: Vec<f32> = (0..n_classes)
        .map(|c| predicted.column(c).sum())
        .collect();

    let violations = Array2::from_shape_fn((n_groups, n_classes), |(g, c)| {
        if group_size[g] == 0.0 {
            log::warn!("group {g} has no samples; DP violation set to 0");
            return 0.0;
        }
        predicted[[g, c]] / group_size[g] - guarded_ratio(overall[c], total, "dataset")
    });

    Ok(ViolationReport {
        accuracy: accuracy(predictions, labels),
        violations,
    })
}

/// Equal-opportunity violation
///
/// `v[g, c] = #{group g, label c, predicted c} / #{group g, label c}
///          - #{label c, predicted c} / #{label c}`
pub fn eo_violations(
    predictions: &[usize],
    labels: &[usize],
    groups: &[usize],
    n_groups: usize,
    n_classes: usize,
) -> Result<ViolationReport> {
    check_aligned(predictions, labels, groups)?;
    let mut hits = Array2::<f32>::zeros((n_groups, n_classes));
    let mut cell = Array2::<f32>::zeros((n_groups, n_classes));
    for ((&p, &y), &g) in predictions.iter().zip(labels).zip(groups) {
        cell[[g, y]] += 1.0;
        if p == y {
            hits[[g, y]] += 1.0;
        }
    }

    let mut violations = Array2::zeros((n_groups, n_classes));
    for c in 0..n_classes {
        let class_total = cell.column(c).sum();
        if class_total == 0.0 {
            log::warn!("class {c} has no samples; EO violations for it set to 0");
            continue;
        }
        let pivot = hits.column(c).sum() / class_total;
        for g in 0..n_groups {
            if cell[[g, c]] == 0.0 {
                log::warn!("subgroup (group {g}, class {c}) is empty; EO violation set to 0");
                continue;
            }
            violations[[g, c]] = hits[[g, c]] / cell[[g, c]] - pivot;
        }
    }

    Ok(ViolationReport {
        accuracy: accuracy(predictions, labels),
        violations,
    })
}

/// Dispatch on the criterion; only `dp` and `eo` have a violation form
pub fn compute_violations(
    criterion: FairnessCriterion,
    predictions: &[usize],
    labels: &[usize],
    groups: &[usize],
    n_groups: usize,
    n_classes: usize,
) -> Result<ViolationReport> {
    match criterion {
        FairnessCriterion::Dp => dp_violations(predictions, labels, groups, n_groups, n_classes),
        FairnessCriterion::Eo => eo_violations(predictions, labels, groups, n_groups, n_classes),
        FairnessCriterion::Dca => Err(Error::UnsupportedCriterion {
            method: "violation".to_string(),
            criterion: criterion.to_string(),
            supported: "dp, eo".to_string(),
        }),
    }
}

/// Max and mean over classes of the across-group spread of a rate
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Disparity {
    /// Largest per-class spread
    pub max: f32,
    /// Mean per-class spread
    pub mean: f32,
}

/// Per-class `max_g - min_g` of the rate table produced by `criterion`
///
/// DP compares predicted-c rates; EO and DCA compare per-(group, class)
/// accuracy. Empty cells are skipped.
pub fn disparity(
    criterion: FairnessCriterion,
    predictions: &[usize],
    labels: &[usize],
    groups: &[usize],
    n_groups: usize,
    n_classes: usize,
) -> Disparity {
    let mut num = Array2::<f32>::zeros((n_groups, n_classes));
    let mut den = Array2::<f32>::zeros((n_groups, n_classes));
    for ((&p, &y), &g) in predictions.iter().zip(labels).zip(groups) {
        match criterion {
            FairnessCriterion::Dp => {
                for c in 0..n_classes {
                    den[[g, c]] += 1.0;
                }
                num[[g, p]] += 1.0;
            }
            FairnessCriterion::Eo | FairnessCriterion::Dca => {
                den[[g, y]] += 1.0;
                if p == y {
                    num[[g, y]] += 1.0;
                }
            }
        }
    }

    let spreads: Vec<f32> = (0..n_classes)
        .filter_map(|c| {
            let rates: Vec<f32> = (0..n_groups)
                .filter(|&g| den[[g, c]] > 0.0)
                .map(|g| num[[g, c]] / den[[g, c]])
                .collect();
            if rates.is_empty() {
                return None;
            }
            let hi = rates.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let lo = rates.iter().copied().fold(f32::INFINITY, f32::min);
            Some(hi - lo)
        })
        .collect();

    if spreads.is_empty() {
        return Disparity::default();
    }
    Disparity {
        max: spreads.iter().copied().fold(0.0, f32::max),
        mean: spreads.iter().sum::<f32>() / spreads.len() as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_criterion_parse_and_display() {
        assert_eq!("EO".parse::<FairnessCriterion>().unwrap(), FairnessCriterion::Eo);
        assert_eq!(FairnessCriterion::Dca.to_string(), "dca");
        assert!("tpr".parse::<FairnessCriterion>().is_err());
    }

    #[test]
    fn test_dp_hand_computed() {
        // group 0 predicts [0, 0, 1, 1]; group 1 predicts [1, 1]
        let preds = [0, 0, 1, 1, 1, 1];
        let labels = [0, 1, 1, 0, 1, 1];
        let groups = [0, 0, 0, 0, 1, 1];
        let report = dp_violations(&preds, &labels, &groups, 2, 2).unwrap();
        let v = &report.violations;
        assert_abs_diff_eq!(v[[0, 0]], 0.5 - 2.0 / 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v[[0, 1]], 0.5 - 4.0 / 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v[[1, 0]], 0.0 - 2.0 / 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(v[[1, 1]], 1.0 - 4.0 / 6.0, epsilon = 1e-6);
        assert_abs_diff_eq!(report.accuracy, 4.0 / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_eo_hand_computed() {
        let preds = [1, 0, 1, 1];
        let labels = [1, 1, 1, 1];
        let groups = [0, 0, 1, 1];
        let report = eo_violations(&preds, &labels, &groups, 2, 2).unwrap();
        let v = &report.violations;
        assert_abs_diff_eq!(v[[0, 1]], 0.5 - 0.75, epsilon = 1e-6);
        assert_abs_diff_eq!(v[[1, 1]], 1.0 - 0.75, epsilon = 1e-6);
        // class 0 has no samples at all
        assert_eq!(v[[0, 0]], 0.0);
        assert_eq!(v[[1, 0]], 0.0);
    }

    #[test]
    fn test_empty_group_is_guarded() {
        let report = dp_violations(&[0, 1], &[0, 1], &[0, 0], 3, 2).unwrap();
        assert!(report.violations.iter().all(|v| v.is_finite()));
        assert_eq!(report.violations[[2, 0]], 0.0);
    }

    #[test]
    fn test_misaligned_inputs_fail() {
        let err = dp_violations(&[0], &[0, 1], &[0, 1], 2, 2).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_dca_has_no_violation_form() {
        let err = compute_violations(FairnessCriterion::Dca, &[0], &[0], &[0], 1, 2).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCriterion { .. }));
    }

    #[test]
    fn test_disparity_eo_accuracy_spread() {
        // class 0: group 0 acc 1.0, group 1 acc 0.5; class 1: both 1.0
        let preds = [0, 0, 0, 1, 1, 1];
        let labels = [0, 0, 0, 0, 1, 1];
        let groups = [0, 0, 1, 1, 0, 1];
        let d = disparity(FairnessCriterion::Eo, &preds, &labels, &groups, 2, 2);
        assert_abs_diff_eq!(d.max, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(d.mean, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_disparity_dp_equal_rates_is_zero() {
        let preds = [0, 1, 0, 1];
        let labels = [0, 0, 1, 1];
        let groups = [0, 0, 1, 1];
        let d = disparity(FairnessCriterion::Dp, &preds, &labels, &groups, 2, 2);
        assert_eq!(d, Disparity::default());
    }
}
