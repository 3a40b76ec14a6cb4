//! Subgroup bookkeeping
//!
//! A subgroup is a `(group, class)` pair flattened to `group * n_classes + label`.
//! Per-subgroup mean losses are computed with a one-hot membership mask
//! (`n_subgroups × batch`) and a masked matrix product.
//!
//! Zero-guard policy: every subgroup mean divides by `count + (count == 0)`,
//! so a cell absent from the batch (or dataset) has mean 0 instead of NaN and
//! contributes no gradient. The same guard is used by every aggregation in
//! this crate.

use ndarray::{Array1, Array2, Axis};

/// A `(n_groups, n_classes)` table of counts, losses, weights or violations
pub type GroupClassTable = Array2<f32>;

/// Flatten `(group, label)` into a subgroup id
pub fn subgroup_id(group: usize, label: usize, n_classes: usize) -> usize {
    group * n_classes + label
}

/// Inverse of [`subgroup_id`]
pub fn split_subgroup(id: usize, n_classes: usize) -> (usize, usize) {
    (id / n_classes, id % n_classes)
}

/// One-hot membership mask: `mask[s, i] = 1` iff sample `i` belongs to subgroup `s`
pub fn membership_mask(
    groups: &[usize],
    labels: &[usize],
    n_groups: usize,
    n_classes: usize,
) -> Array2<f32> {
    let n_subgroups = n_groups * n_classes;
    let mut mask = Array2::zeros((n_subgroups, groups.len()));
    for (i, (&g, &y)) in groups.iter().zip(labels).enumerate() {
        mask[[subgroup_id(g, y, n_classes), i]] = 1.0;
    }
    mask
}

/// Replace zero counts by 1
pub fn guarded_denominator(counts: &Array1<f32>) -> Array1<f32> {
    counts.mapv(|c| if c == 0.0 { 1.0 } else { c })
}

fn unflatten(flat: &Array1<f32>, n_groups: usize, n_classes: usize) -> GroupClassTable {
    Array2::from_shape_fn((n_groups, n_classes), |(g, c)| {
        flat[subgroup_id(g, c, n_classes)]
    })
}

/// Per-subgroup mean of a per-sample quantity, with the mask kept for backprop
#[derive(Clone, Debug)]
pub struct SubgroupAggregate {
    n_groups: usize,
    n_classes: usize,
    mask: Array2<f32>,
    counts: Array1<f32>,
    denom: Array1<f32>,
    sums: Array1<f32>,
    means: GroupClassTable,
}

impl SubgroupAggregate {
    /// Aggregate per-sample losses into a `(n_groups, n_classes)` mean table
    pub fn from_losses(
        per_sample: &Array1<f32>,
        groups: &[usize],
        labels: &[usize],
        n_groups: usize,
        n_classes: usize,
    ) -> Self {
        let mask = membership_mask(groups, labels, n_groups, n_classes);
        let counts = mask.sum_axis(Axis(1));
        let denom = guarded_denominator(&counts);
        let sums = mask.dot(per_sample);
        let means = unflatten(&(&sums / &denom), n_groups, n_classes);
        let empty = counts.iter().filter(|&&c| c == 0.0).count();
        if empty > 0 {
            log::debug!("{empty} subgroup(s) absent from batch, mean loss guarded to 0");
        }
        Self {
            n_groups,
            n_classes,
            mask,
            counts,
            denom,
            sums,
            means,
        }
    }

    /// Mean loss per `(group, class)`
    pub fn means(&self) -> &GroupClassTable {
        &self.means
    }

    /// Sample count per `(group, class)`
    pub fn counts(&self) -> GroupClassTable {
        unflatten(&self.counts, self.n_groups, self.n_classes)
    }

    /// Mean loss per flattened subgroup id
    pub fn flat_means(&self) -> Array1<f32> {
        &self.sums / &self.denom
    }

    /// Number of subgroups with no samples
    pub fn empty_cells(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0.0).count()
    }

    /// Total number of subgroups
    pub fn n_subgroups(&self) -> usize {
        self.n_groups * self.n_classes
    }

    /// Chain rule from `dL/d means[g, c]` to `dL/d per_sample[i]`
    pub fn backprop(&self, grad_means: &GroupClassTable) -> Array1<f32> {
        let flat = Array1::from_shape_fn(self.n_subgroups(), |s| {
            let (g, c) = split_subgroup(s, self.n_classes);
            grad_means[[g, c]] / self.denom[s]
        });
        self.mask.t().dot(&flat)
    }
}

/// Accumulates subgroup sums and counts across batches of a full pass
///
/// The zero guard is applied once, when the pass is finished.
#[derive(Clone, Debug)]
pub struct SubgroupAccumulator {
    n_groups: usize,
    n_classes: usize,
    sums: Array1<f32>,
    counts: Array1<f32>,
}

impl SubgroupAccumulator {
    /// Empty accumulator
    pub fn new(n_groups: usize, n_classes: usize) -> Self {
        Self {
            n_groups,
            n_classes,
            sums: Array1::zeros(n_groups * n_classes),
            counts: Array1::zeros(n_groups * n_classes),
        }
    }

    /// Add one batch
    pub fn add(&mut self, batch: &SubgroupAggregate) {
        self.sums += &batch.sums;
        self.counts += &batch.counts;
    }

    /// Guarded mean table over everything added so far
    pub fn finish(&self) -> GroupClassTable {
        let empty = self.counts.iter().filter(|&&c| c == 0.0).count();
        if empty > 0 {
            log::warn!("{empty} subgroup(s) have no samples in the full pass; their mean loss is 0");
        }
        let means = &self.sums / &guarded_denominator(&self.counts);
        unflatten(&means, self.n_groups, self.n_classes)
    }
}
