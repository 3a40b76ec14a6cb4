//! Sample and dataset abstractions

use crate::error::{Error, Result};
use ndarray::Array1;

/// One labeled sample
///
/// `weight` is a placeholder kept for layout compatibility with weighted
/// samplers; trainers derive their own weights from group and label.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Feature vector
    pub input: Array1<f32>,
    /// Placeholder weight (always 1.0 for built-in datasets)
    pub weight: f32,
    /// Sensitive group id in `0..n_groups`
    pub group: usize,
    /// Class label in `0..n_classes`
    pub label: usize,
    /// Position of the sample within its split
    pub index: usize,
}

impl Sample {
    /// Create a sample with unit placeholder weight
    pub fn new(input: Array1<f32>, group: usize, label: usize, index: usize) -> Self {
        Self {
            input,
            weight: 1.0,
            group,
            label,
            index,
        }
    }
}

/// Dataset contract consumed by every trainer
///
/// Enumeration by `0..len()` must be deterministic, and `get(i).index == i`.
pub trait FairDataset: Send + Sync {
    /// Number of samples
    fn len(&self) -> usize;

    /// Whether the dataset has no samples
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch sample `index`
    fn get(&self, index: usize) -> Sample;

    /// Number of sensitive groups
    fn n_groups(&self) -> usize;

    /// Number of target classes
    fn n_classes(&self) -> usize;

    /// Width of each feature vector
    fn n_features(&self) -> usize;
}

/// Dataset held fully in memory
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    samples: Vec<Sample>,
    n_groups: usize,
    n_classes: usize,
    n_features: usize,
}

impl InMemoryDataset {
    /// Build a dataset, checking the contract for every sample
    pub fn new(samples: Vec<Sample>, n_groups: usize, n_classes: usize) -> Result<Self> {
        if n_groups == 0 || n_classes == 0 {
            return Err(Error::Dataset(format!(
                "n_groups and n_classes must be positive (got {n_groups}, {n_classes})"
            )));
        }
        let n_features = samples.first().map_or(0, |s| s.input.len());
        for (pos, s) in samples.iter().enumerate() {
            if s.group >= n_groups {
                return Err(Error::Dataset(format!(
                    "sample {pos}: group {} out of range 0..{n_groups}",
                    s.group
                )));
            }
            if s.label >= n_classes {
                return Err(Error::Dataset(format!(
                    "sample {pos}: label {} out of range 0..{n_classes}",
                    s.label
                )));
            }
            if s.index != pos {
                return Err(Error::Dataset(format!(
                    "sample {pos}: index {} does not match its position",
                    s.index
                )));
            }
            if s.input.len() != n_features {
                return Err(Error::ShapeMismatch {
                    expected: vec![n_features],
                    actual: vec![s.input.len()],
                });
            }
        }
        Ok(Self {
            samples,
            n_groups,
            n_classes,
            n_features,
        })
    }

    /// Build from parallel vectors, assigning indices by position
    pub fn from_parts(
        inputs: Vec<Array1<f32>>,
        groups: Vec<usize>,
        labels: Vec<usize>,
        n_groups: usize,
        n_classes: usize,
    ) -> Result<Self> {
        if inputs.len() != groups.len() || inputs.len() != labels.len() {
            return Err(Error::ShapeMismatch {
                expected: vec![inputs.len(); 3],
                actual: vec![inputs.len(), groups.len(), labels.len()],
            });
        }
        let samples = inputs
            .into_iter()
            .zip(groups)
            .zip(labels)
            .enumerate()
            .map(|(i, ((x, g), y))| Sample::new(x, g, y, i))
            .collect();
        Self::new(samples, n_groups, n_classes)
    }

    /// Borrow all samples
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl FairDataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get(&self, index: usize) -> Sample {
        self.samples[index].clone()
    }

    fn n_groups(&self) -> usize {
        self.n_groups
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
