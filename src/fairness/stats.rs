//! Full-pass statistics collection
//!
//! A statistics pass walks the whole dataset once, in dataset order, without
//! gradients, and returns aligned per-sample arrays.

use crate::data::{DataLoader, FairDataset};
use crate::error::{Error, Result};
use crate::model::{argmax_rows, Classifier};
use crate::train::loss::softmax_rows;
use ndarray::{s, Array2};

/// Aligned predictions, labels and groups from one full pass
#[derive(Clone, Debug, PartialEq)]
pub struct Statistics {
    /// Predicted class per sample; `None` when no model was supplied
    pub predictions: Option<Vec<usize>>,
    /// True class per sample
    pub labels: Vec<usize>,
    /// Sensitive group per sample
    pub groups: Vec<usize>,
}

impl Statistics {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the pass was empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Softmax probabilities with labels and groups from one full pass
#[derive(Clone, Debug)]
pub struct ProbabilityPass {
    /// `n × n_classes` class probabilities
    pub probs: Array2<f32>,
    /// True class per sample
    pub labels: Vec<usize>,
    /// Sensitive group per sample
    pub groups: Vec<usize>,
}

fn ensure_non_empty(dataset: &dyn FairDataset) -> Result<()> {
    if dataset.is_empty() {
        return Err(Error::Dataset(
            "statistics pass over an empty dataset".to_string(),
        ));
    }
    Ok(())
}

/// Collect predictions (if a model is given), labels and groups
///
/// The model is left in evaluation mode; a caller that resumes training must
/// call [`Classifier::train_mode`] itself.
pub fn collect_statistics(
    dataset: &dyn FairDataset,
    mut model: Option<&mut dyn Classifier>,
    batch_size: usize,
    n_workers: usize,
) -> Result<Statistics> {
    ensure_non_empty(dataset)?;
    if let Some(m) = model.as_deref_mut() {
        m.eval_mode();
    }

    let n = dataset.len();
    let mut predictions = model.as_ref().map(|_| Vec::with_capacity(n));
    let mut labels = Vec::with_capacity(n);
    let mut groups = Vec::with_capacity(n);

    DataLoader::new(dataset, batch_size)
        .with_workers(n_workers)
        .try_for_each(0, |_, batch| {
            if let (Some(m), Some(preds)) = (model.as_deref(), predictions.as_mut()) {
                preds.extend(argmax_rows(&m.forward(&batch.inputs)));
            }
            labels.extend_from_slice(&batch.labels);
            groups.extend_from_slice(&batch.groups);
            Ok(())
        })?;

    Ok(Statistics {
        predictions,
        labels,
        groups,
    })
}

/// Collect softmax probabilities, labels and groups
///
/// Like [`collect_statistics`], the model is left in evaluation mode.
pub fn collect_probabilities(
    dataset: &dyn FairDataset,
    model: &mut dyn Classifier,
    batch_size: usize,
    n_workers: usize,
) -> Result<ProbabilityPass> {
    ensure_non_empty(dataset)?;
    model.eval_mode();

    let n = dataset.len();
    let mut probs = Array2::zeros((n, dataset.n_classes()));
    let mut labels = Vec::with_capacity(n);
    let mut groups = Vec::with_capacity(n);
    let mut offset = 0;
    let model: &dyn Classifier = model;

    DataLoader::new(dataset, batch_size)
        .with_workers(n_workers)
        .try_for_each(0, |_, batch| {
            let rows = batch.size();
            let p = softmax_rows(&model.forward(&batch.inputs));
            probs.slice_mut(s![offset..offset + rows, ..]).assign(&p);
            offset += rows;
            labels.extend_from_slice(&batch.labels);
            groups.extend_from_slice(&batch.groups);
            Ok(())
        })?;

    Ok(ProbabilityPass {
        probs,
        labels,
        groups,
    })
}
