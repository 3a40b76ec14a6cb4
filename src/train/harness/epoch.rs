//! Epoch-level training and evaluation operations

use std::time::Instant;

use ndarray::Array2;

use super::core::Harness;
use super::result::{EpochSummary, EvalReport};
use crate::data::{Batch, DataLoader, FairDataset};
use crate::error::{Error, Result};
use crate::fairness::{disparity, FairnessCriterion};
use crate::model::argmax_rows;
use crate::optim::ScheduleMode;
use crate::train::callback::CallbackContext;
use crate::train::{per_sample_cross_entropy, LossOutput};

impl Harness {
    /// Train for one shuffled pass over `train`
    ///
    /// Step callbacks receive the loss and accuracy averaged over the last
    /// `log_interval` batches. The epoch mean is recorded in
    /// [`Harness::metrics`].
    pub fn run_epoch<L>(
        &mut self,
        epoch: usize,
        train: &dyn FairDataset,
        loss_fn: L,
    ) -> Result<EpochSummary>
    where
        L: Fn(&Array2<f32>, &Batch) -> LossOutput,
    {
        self.model.train_mode();
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }

        let loader = DataLoader::new(train, self.config.batch_size)
            .shuffled(self.config.seed)
            .with_workers(self.config.n_workers);
        let steps_per_epoch = loader.len();
        let log_interval = self.config.log_interval.max(1);

        let mut total_loss = 0.0;
        let mut total_correct = 0;
        let mut total_seen = 0;
        let mut window = (0.0f32, 0usize, 0usize);
        let mut window_start = Instant::now();

        // the pass index keeps shuffles distinct across restarts
        loader.try_for_each(self.metrics.epoch, |i, batch| {
            let outcome = self.optimize_batch(&batch, &loss_fn);
            total_loss += outcome.loss;
            total_correct += outcome.correct;
            total_seen += outcome.size;
            window.0 += outcome.loss;
            window.1 += outcome.correct;
            window.2 += outcome.size;

            if !self.callbacks.is_empty() {
                let batches_in_window = (i % log_interval) + 1;
                let ctx = CallbackContext {
                    steps_per_epoch,
                    loss: window.0 / batches_in_window as f32,
                    acc: window.1 as f32 / window.2.max(1) as f32,
                    elapsed_secs: window_start.elapsed().as_secs_f64(),
                    ..self.build_context(epoch, i + 1)
                };
                self.callbacks.on_step_end(&ctx);
            }
            if (i + 1) % log_interval == 0 {
                window = (0.0, 0, 0);
                window_start = Instant::now();
            }
            Ok(())
        })?;

        let summary = EpochSummary {
            loss: total_loss / steps_per_epoch.max(1) as f32,
            accuracy: total_correct as f32 / total_seen.max(1) as f32,
            steps: steps_per_epoch,
        };
        self.metrics.record_epoch(summary.loss, self.lr());
        Ok(summary)
    }

    /// Evaluate on `test` and log `test/*` scalars at `epoch`
    ///
    /// Leaves the model in evaluation mode.
    pub fn evaluate(
        &mut self,
        epoch: usize,
        test: &dyn FairDataset,
        criterion: FairnessCriterion,
    ) -> Result<EvalReport> {
        if test.is_empty() {
            return Err(Error::Dataset("evaluation dataset is empty".to_string()));
        }
        self.model.eval_mode();

        let n = test.len();
        let mut loss_sum = 0.0;
        let mut predictions = Vec::with_capacity(n);
        let mut labels = Vec::with_capacity(n);
        let mut groups = Vec::with_capacity(n);
        let model = self.model.as_ref();

        DataLoader::new(test, self.config.batch_size)
            .with_workers(self.config.n_workers)
            .try_for_each(0, |_, batch| {
                let logits = model.forward(&batch.inputs);
                let (losses, _) = per_sample_cross_entropy(&logits, &batch.labels);
                loss_sum += losses.sum();
                predictions.extend(argmax_rows(&logits));
                labels.extend_from_slice(&batch.labels);
                groups.extend_from_slice(&batch.groups);
                Ok(())
            })?;

        let correct = predictions.iter().zip(&labels).filter(|(p, y)| p == y).count();
        let spread = disparity(
            criterion,
            &predictions,
            &labels,
            &groups,
            test.n_groups(),
            test.n_classes(),
        );
        let report = EvalReport {
            loss: loss_sum / n as f32,
            accuracy: correct as f32 / n as f32,
            disparity_max: spread.max,
            disparity_mean: spread.mean,
        };

        self.metrics.record_validation(report.loss, report.accuracy);
        self.log_scalar("test/loss", report.loss, epoch);
        self.log_scalar("test/acc", report.accuracy, epoch);
        self.log_scalar("test/disparity_max", report.disparity_max, epoch);
        self.log_scalar("test/disparity_mean", report.disparity_mean, epoch);
        Ok(report)
    }

    /// Step the scheduler and notify epoch callbacks
    ///
    /// A scheduler in [`ScheduleMode::OnValidationLoss`] receives the
    /// evaluation loss; any other steps unconditionally.
    pub fn finish_epoch(&mut self, epoch: usize, train: &EpochSummary, eval: &EvalReport) {
        if let Some((scheduler, mode)) = self.scheduler.as_mut() {
            match mode {
                ScheduleMode::PerEpoch => scheduler.step(None),
                ScheduleMode::OnValidationLoss => scheduler.step(Some(eval.loss)),
            }
            scheduler.apply(self.optimizer.as_mut());
        }

        if self.config.record {
            self.log_scalar("train/loss", train.loss, epoch);
            self.log_scalar("train/acc", train.accuracy, epoch);
        }

        let ctx = CallbackContext {
            loss: train.loss,
            acc: train.accuracy,
            steps_per_epoch: train.steps,
            val_loss: Some(eval.loss),
            val_acc: Some(eval.accuracy),
            val_disparity: Some(eval.disparity_max),
            ..self.build_context(epoch, train.steps)
        };
        self.callbacks.on_epoch_end(&ctx);
    }

    /// `run_epoch`, `evaluate` and `finish_epoch` in sequence
    pub fn epoch<L>(
        &mut self,
        epoch: usize,
        train: &dyn FairDataset,
        test: &dyn FairDataset,
        criterion: FairnessCriterion,
        loss_fn: L,
    ) -> Result<(EpochSummary, EvalReport)>
    where
        L: Fn(&Array2<f32>, &Batch) -> LossOutput,
    {
        let summary = self.run_epoch(epoch, train, loss_fn)?;
        let eval = self.evaluate(epoch, test, criterion)?;
        self.finish_epoch(epoch, &summary, &eval);
        Ok((summary, eval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SyntheticConfig;
    use crate::data::SyntheticDataset;
    use crate::model::LinearClassifier;
    use crate::optim::{ReduceLROnPlateau, SGD};
    use crate::tracking::SharedHistory;
    use crate::train::callback::TrainerCallback;
    use crate::train::{CrossEntropyLoss, LossFn, LossTarget, TrainConfig};
    use std::sync::{Arc, Mutex};

    fn data() -> (crate::data::InMemoryDataset, crate::data::InMemoryDataset) {
        let cfg = SyntheticConfig {
            per_cell: 20,
            test_per_cell: 10,
            n_features: 4,
            ..Default::default()
        };
        SyntheticDataset::train_test(&cfg).unwrap()
    }

    fn ce(logits: &Array2<f32>, b: &Batch) -> LossOutput {
        CrossEntropyLoss.forward(logits, &LossTarget::new(&b.labels, &b.groups))
    }

    fn harness(config: TrainConfig) -> Harness {
        let model = LinearClassifier::new(4, 2, 0).unwrap();
        Harness::new(Box::new(model), Box::new(SGD::new(0.05, 0.9)), config)
    }

    struct StepCounter(Arc<Mutex<Vec<usize>>>);

    impl TrainerCallback for StepCounter {
        fn on_step_end(&mut self, ctx: &CallbackContext) {
            self.0.lock().unwrap().push(ctx.step);
        }
    }

    #[test]
    fn test_run_epoch_records_metrics() {
        let (train, _) = data();
        let mut h = harness(TrainConfig::new().with_batch_size(16));
        let summary = h.run_epoch(0, &train, ce).unwrap();
        assert_eq!(summary.steps, 5);
        assert!(summary.loss.is_finite());
        assert!((0.0..=1.0).contains(&summary.accuracy));
        assert_eq!(h.metrics.epoch, 1);
        assert_eq!(h.metrics.steps, 5);
    }

    #[test]
    fn test_step_callbacks_fire_per_batch() {
        let (train, _) = data();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut h = harness(TrainConfig::new().with_batch_size(40).with_workers(2));
        h.add_callback(StepCounter(Arc::clone(&seen)));
        h.run_epoch(0, &train, ce).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_evaluate_logs_to_sink() {
        let (_, test) = data();
        let history = SharedHistory::new();
        let mut h = harness(TrainConfig::new()).with_sink(Box::new(history.clone()));
        let report = h.evaluate(3, &test, FairnessCriterion::Eo).unwrap();
        assert!(report.loss.is_finite());
        assert!(report.disparity_mean <= report.disparity_max);
        let snapshot = history.snapshot();
        for tag in ["test/loss", "test/acc", "test/disparity_max", "test/disparity_mean"] {
            assert_eq!(snapshot.series(tag).unwrap()[0].step, 3);
        }
        assert!(!h.model().is_training());
    }

    #[test]
    fn test_evaluate_empty_dataset_fails() {
        let empty = crate::data::InMemoryDataset::from_parts(vec![], vec![], vec![], 2, 2).unwrap();
        let mut h = harness(TrainConfig::new());
        assert!(matches!(
            h.evaluate(0, &empty, FairnessCriterion::Dp),
            Err(Error::Dataset(_))
        ));
    }

    #[test]
    fn test_plateau_scheduler_consumes_eval_loss() {
        let mut h = harness(TrainConfig::new()).with_scheduler(
            Box::new(ReduceLROnPlateau::new(0.05).with_patience(0).with_factor(0.5)),
            ScheduleMode::OnValidationLoss,
        );
        let train = EpochSummary::default();
        let eval = EvalReport {
            loss: 1.0,
            ..Default::default()
        };
        h.finish_epoch(0, &train, &eval);
        h.finish_epoch(1, &train, &eval);
        assert!(h.lr() < 0.05);
    }

    #[test]
    fn test_epoch_trains_and_evaluates() {
        let (train, test) = data();
        let mut h = harness(TrainConfig::new().with_batch_size(32));
        let mut first = None;
        let mut last = None;
        for e in 0..5 {
            let (s, _) = h.epoch(e, &train, &test, FairnessCriterion::Dp, ce).unwrap();
            first.get_or_insert(s.loss);
            last = Some(s.loss);
        }
        assert!(last.unwrap() < first.unwrap());
        assert_eq!(h.metrics.val_losses.len(), 5);
    }
}
