//! Training step operations

use ndarray::Array2;

use super::core::Harness;
use super::result::StepOutcome;
use crate::data::Batch;
use crate::model::argmax_rows;
use crate::optim::clip_grad_norm;
use crate::train::LossOutput;

impl Harness {
    /// Perform a single optimization step on one batch
    ///
    /// `loss_fn` maps the batch logits to a loss value and its logit
    /// gradient. With SAM enabled it is evaluated a second time at the
    /// perturbed parameters, and that gradient drives the real update.
    /// The reported loss and accuracy are those of the unperturbed forward.
    pub fn optimize_batch<L>(&mut self, batch: &Batch, loss_fn: L) -> StepOutcome
    where
        L: Fn(&Array2<f32>, &Batch) -> LossOutput,
    {
        self.model.zero_grad();
        let logits = self.model.forward(&batch.inputs);
        let output = loss_fn(&logits, batch);
        self.model.backward(&batch.inputs, &output.grad_logits);

        if let Some(sam) = self.sam.as_mut() {
            sam.first_step(&mut self.model.params_mut());
            let perturbed = self.model.forward(&batch.inputs);
            let second = loss_fn(&perturbed, batch);
            self.model.backward(&batch.inputs, &second.grad_logits);

            let mut params = self.model.params_mut();
            if let Some(max_norm) = self.config.max_grad_norm {
                clip_grad_norm(&mut params, max_norm);
            }
            sam.second_step(&mut params, self.optimizer.as_mut());
        } else {
            let mut params = self.model.params_mut();
            if let Some(max_norm) = self.config.max_grad_norm {
                clip_grad_norm(&mut params, max_norm);
            }
            self.optimizer.step(&mut params);
            self.optimizer.zero_grad(&mut params);
        }

        self.metrics.increment_step();

        let correct = argmax_rows(&logits)
            .iter()
            .zip(&batch.labels)
            .filter(|(p, y)| p == y)
            .count();
        StepOutcome {
            loss: output.value,
            correct,
            size: batch.size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Batch, InMemoryDataset};
    use crate::model::LinearClassifier;
    use crate::optim::SGD;
    use crate::train::{CrossEntropyLoss, LossFn, LossTarget, TrainConfig};
    use ndarray::arr1;

    fn batch() -> Batch {
        let ds = InMemoryDataset::from_parts(
            vec![
                arr1(&[1.0, 0.0]),
                arr1(&[0.0, 1.0]),
                arr1(&[1.0, 0.2]),
                arr1(&[0.1, 1.0]),
            ],
            vec![0, 0, 1, 1],
            vec![0, 1, 0, 1],
            2,
            2,
        )
        .unwrap();
        Batch::collate(&ds, &[0, 1, 2, 3])
    }

    fn ce(logits: &Array2<f32>, b: &Batch) -> LossOutput {
        CrossEntropyLoss.forward(logits, &LossTarget::new(&b.labels, &b.groups))
    }

    fn harness(config: TrainConfig) -> Harness {
        let model = LinearClassifier::new(2, 2, 3).unwrap();
        Harness::new(Box::new(model), Box::new(SGD::new(0.5, 0.0)), config)
    }

    #[test]
    fn test_optimize_batch_reduces_loss() {
        let mut h = harness(TrainConfig::new());
        let b = batch();
        let first = h.optimize_batch(&b, ce);
        for _ in 0..20 {
            h.optimize_batch(&b, ce);
        }
        let last = h.optimize_batch(&b, ce);
        assert!(last.loss < first.loss);
        assert_eq!(last.size, 4);
        assert_eq!(h.metrics.steps, 22);
    }

    #[test]
    fn test_gradients_cleared_after_step() {
        let mut h = harness(TrainConfig::new().with_grad_clip(0.1));
        h.optimize_batch(&batch(), ce);
        for p in h.model.params() {
            assert!(p.grad().map_or(true, |g| g.iter().all(|&v| v == 0.0)));
        }
    }

    #[test]
    fn test_sam_step_updates_params_and_clears_grads() {
        let mut h = harness(TrainConfig::new().with_sam(0.05));
        let before: Vec<_> = h.model.params().iter().map(|p| p.data().clone()).collect();
        let outcome = h.optimize_batch(&batch(), ce);
        assert!(outcome.loss.is_finite());
        let after: Vec<_> = h.model.params().iter().map(|p| p.data().clone()).collect();
        assert_ne!(before, after);
        for p in h.model.params() {
            assert!(p.grad().map_or(true, |g| g.iter().all(|&v| v == 0.0)));
        }
    }
}
