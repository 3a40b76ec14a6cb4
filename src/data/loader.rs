//! Mini-batch loading with optional prefetch workers

use super::FairDataset;
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::mpsc::sync_channel;

/// Batches each worker may build ahead of the training thread
const PREFETCH_DEPTH: usize = 2;

/// A collated mini-batch
#[derive(Clone, Debug)]
pub struct Batch {
    /// Stacked inputs (`batch × n_features`)
    pub inputs: Array2<f32>,
    /// Sensitive group per row
    pub groups: Vec<usize>,
    /// Class label per row
    pub labels: Vec<usize>,
    /// Dataset index per row
    pub indices: Vec<usize>,
}

impl Batch {
    /// Number of rows
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    /// Whether the batch has no rows
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Gather the given dataset indices into a batch
    pub fn collate(dataset: &dyn FairDataset, indices: &[usize]) -> Self {
        let mut inputs = Array2::zeros((indices.len(), dataset.n_features()));
        let mut groups = Vec::with_capacity(indices.len());
        let mut labels = Vec::with_capacity(indices.len());
        let mut sample_indices = Vec::with_capacity(indices.len());
        for (row, &i) in indices.iter().enumerate() {
            let sample = dataset.get(i);
            inputs.row_mut(row).assign(&sample.input);
            groups.push(sample.group);
            labels.push(sample.label);
            sample_indices.push(sample.index);
        }
        Self {
            inputs,
            groups,
            labels,
            indices: sample_indices,
        }
    }
}

/// Iterates a [`FairDataset`] in mini-batches
///
/// With `n_workers > 0`, batches are collated on scoped worker threads and
/// handed over through bounded channels. Worker `w` builds batches
/// `w, w + n, w + 2n, ...` and the training thread receives them round-robin,
/// so batch order is identical to the single-threaded path.
pub struct DataLoader<'a> {
    dataset: &'a dyn FairDataset,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
    n_workers: usize,
}

impl<'a> DataLoader<'a> {
    /// Sequential, non-shuffled loader
    pub fn new(dataset: &'a dyn FairDataset, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: false,
            seed: 0,
            n_workers: 0,
        }
    }

    /// Reshuffle every epoch, deterministically from `seed`
    pub fn shuffled(mut self, seed: u64) -> Self {
        self.shuffle = true;
        self.seed = seed;
        self
    }

    /// Collate batches on `n_workers` background threads
    pub fn with_workers(mut self, n_workers: usize) -> Self {
        self.n_workers = n_workers;
        self
    }

    /// Number of batches per pass (last batch may be partial)
    pub fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    /// Whether a pass yields no batches
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dataset indices of each batch for the given epoch
    pub fn batch_indices(&self, epoch: usize) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch as u64));
            order.shuffle(&mut rng);
        }
        order
            .chunks(self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }

    /// Run `f(batch_idx, batch)` over one full pass, stopping at the first error
    pub fn try_for_each<F>(&self, epoch: usize, mut f: F) -> Result<()>
    where
        F: FnMut(usize, Batch) -> Result<()>,
    {
        let plan = self.batch_indices(epoch);
        let dataset = self.dataset;

        if self.n_workers == 0 || plan.len() < 2 {
            for (i, indices) in plan.iter().enumerate() {
                f(i, Batch::collate(dataset, indices))?;
            }
            return Ok(());
        }

        let n_workers = self.n_workers.min(plan.len());
        let plan_ref = &plan;
        std::thread::scope(|scope| {
            let mut receivers = Vec::with_capacity(n_workers);
            for worker in 0..n_workers {
                let (tx, rx) = sync_channel::<Batch>(PREFETCH_DEPTH);
                scope.spawn(move || {
                    for indices in plan_ref.iter().skip(worker).step_by(n_workers) {
                        if tx.send(Batch::collate(dataset, indices)).is_err() {
                            // receiver dropped: the training thread stopped early
                            break;
                        }
                    }
                });
                receivers.push(rx);
            }

            for i in 0..plan_ref.len() {
                let batch = receivers[i % n_workers].recv().map_err(|_| {
                    Error::Dataset(format!("prefetch worker {} stopped", i % n_workers))
                })?;
                f(i, batch)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemoryDataset;
    use ndarray::arr1;

    fn toy(n: usize) -> InMemoryDataset {
        InMemoryDataset::from_parts(
            (0..n).map(|i| arr1(&[i as f32, 1.0])).collect(),
            (0..n).map(|i| i % 2).collect(),
            (0..n).map(|i| (i / 2) % 2).collect(),
            2,
            2,
        )
        .unwrap()
    }

    fn collect(loader: &DataLoader<'_>, epoch: usize) -> Vec<Vec<usize>> {
        let mut seen = Vec::new();
        loader
            .try_for_each(epoch, |_, b| {
                seen.push(b.indices.clone());
                Ok(())
            })
            .unwrap();
        seen
    }

    #[test]
    fn test_sequential_order_and_partial_last_batch() {
        let ds = toy(10);
        let loader = DataLoader::new(&ds, 4);
        assert_eq!(loader.len(), 3);
        let seen = collect(&loader, 0);
        assert_eq!(seen, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn test_collate_rows_match_samples() {
        let ds = toy(5);
        let batch = Batch::collate(&ds, &[3, 1]);
        assert_eq!(batch.inputs[[0, 0]], 3.0);
        assert_eq!(batch.inputs[[1, 0]], 1.0);
        assert_eq!(batch.groups, vec![1, 1]);
        assert_eq!(batch.size(), 2);
    }

    #[test]
    fn test_shuffle_is_deterministic_per_epoch() {
        let ds = toy(32);
        let loader = DataLoader::new(&ds, 8).shuffled(42);
        assert_eq!(loader.batch_indices(0), loader.batch_indices(0));
        assert_ne!(loader.batch_indices(0), loader.batch_indices(1));
        let mut all: Vec<usize> = loader.batch_indices(3).concat();
        all.sort_unstable();
        assert_eq!(all, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_workers_preserve_order() {
        let ds = toy(50);
        let sequential = collect(&DataLoader::new(&ds, 7).shuffled(1), 2);
        let threaded = collect(&DataLoader::new(&ds, 7).shuffled(1).with_workers(3), 2);
        assert_eq!(sequential, threaded);
    }

    #[test]
    fn test_error_stops_pass() {
        let ds = toy(40);
        let loader = DataLoader::new(&ds, 4).with_workers(2);
        let mut calls = 0;
        let result = loader.try_for_each(0, |i, _| {
            calls += 1;
            if i == 2 {
                Err(Error::Dataset("stop".into()))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_empty_dataset_yields_nothing() {
        let ds = InMemoryDataset::new(Vec::new(), 2, 2).unwrap();
        let loader = DataLoader::new(&ds, 4).with_workers(2);
        assert!(loader.is_empty());
        assert!(collect(&loader, 0).is_empty());
    }
}
