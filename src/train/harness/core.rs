//! Core Harness struct and basic methods

use std::time::Instant;

use super::result::{EvalReport, TrainReport};
use crate::error::{Error, Result};
use crate::model::Classifier;
use crate::optim::{LRScheduler, Optimizer, Sam, ScheduleMode};
use crate::tracking::MetricsSink;
use crate::train::callback::{CallbackContext, CallbackManager, TrainerCallback};
use crate::train::{MetricsTracker, TrainConfig};

/// Owner of the model and its update machinery
///
/// # Example
///
/// ```no_run
/// use fairtrain::model::LinearClassifier;
/// use fairtrain::optim::SGD;
/// use fairtrain::train::{Harness, ProgressCallback, TrainConfig};
///
/// let model = LinearClassifier::new(8, 2, 0).unwrap();
/// let mut harness = Harness::new(
///     Box::new(model),
///     Box::new(SGD::new(0.01, 0.9)),
///     TrainConfig::new().with_epochs(5),
/// );
/// harness.add_callback(ProgressCallback::new(10));
/// ```
pub struct Harness {
    /// Model being trained
    pub(crate) model: Box<dyn Classifier>,

    /// Optimizer
    pub(crate) optimizer: Box<dyn Optimizer>,

    /// Scheduler and how it is stepped
    pub(crate) scheduler: Option<(Box<dyn LRScheduler>, ScheduleMode)>,

    /// Sharpness-aware wrapper, present when `sam_rho` is configured
    pub(crate) sam: Option<Sam>,

    /// Training configuration
    pub(crate) config: TrainConfig,

    /// Metrics tracker
    pub metrics: MetricsTracker,

    /// Callback manager
    pub(crate) callbacks: CallbackManager,

    /// Optional scalar sink
    pub(crate) sink: Option<Box<dyn MetricsSink>>,

    /// Name of the method driving this harness
    pub(crate) method: &'static str,

    /// Training start time
    pub(crate) start_time: Option<Instant>,
}

impl Harness {
    /// Create a harness; SAM is enabled when `config.sam_rho` is set
    pub fn new(
        model: Box<dyn Classifier>,
        optimizer: Box<dyn Optimizer>,
        config: TrainConfig,
    ) -> Self {
        Self {
            model,
            optimizer,
            scheduler: None,
            sam: config.sam_rho.map(Sam::new),
            config,
            metrics: MetricsTracker::new(),
            callbacks: CallbackManager::new(),
            sink: None,
            method: "scratch",
            start_time: None,
        }
    }

    /// Attach a learning rate scheduler
    pub fn with_scheduler(mut self, scheduler: Box<dyn LRScheduler>, mode: ScheduleMode) -> Self {
        scheduler.apply(self.optimizer.as_mut());
        self.scheduler = Some((scheduler, mode));
        self
    }

    /// Attach a scalar sink
    pub fn with_sink(mut self, sink: Box<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Add a callback to the harness
    pub fn add_callback<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.add(callback);
    }

    /// Get reference to callback manager
    pub fn callbacks(&self) -> &CallbackManager {
        &self.callbacks
    }

    /// Training configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// The model
    pub fn model(&self) -> &dyn Classifier {
        self.model.as_ref()
    }

    /// The model, mutably
    pub fn model_mut(&mut self) -> &mut dyn Classifier {
        self.model.as_mut()
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Method name reported to callbacks
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Set the method name reported to callbacks
    pub fn set_method(&mut self, method: &'static str) {
        self.method = method;
    }

    /// Send one scalar to the sink, if any
    pub fn log_scalar(&mut self, tag: &str, value: f32, epoch: usize) {
        if let Some(sink) = self.sink.as_mut() {
            sink.add_scalar(tag, value, epoch);
        }
    }

    /// Send a scalar group to the sink, if any
    pub fn log_scalars(&mut self, tag: &str, values: &[(String, f32)], epoch: usize) {
        if let Some(sink) = self.sink.as_mut() {
            sink.add_scalars(tag, values, epoch);
        }
    }

    /// Reinitialize the model and reset optimizer and scheduler state
    ///
    /// Fails if the model cannot be reinitialized in place.
    pub fn restart(&mut self) -> Result<()> {
        if !self.model.supports_reinit() {
            return Err(Error::Config(format!(
                "model '{}' does not support restarting from scratch",
                self.model.name()
            )));
        }
        self.model.reinitialize();
        self.model.zero_grad();
        self.optimizer.reset();
        if let Some((scheduler, _)) = self.scheduler.as_mut() {
            scheduler.reset();
            scheduler.apply(self.optimizer.as_mut());
        }
        log::debug!("{}: model, optimizer and scheduler restarted", self.method);
        Ok(())
    }

    /// Mark the start of a run and notify callbacks
    pub fn begin_run(&mut self) {
        self.start_time = Some(Instant::now());
        let ctx = self.build_context(0, 0);
        self.callbacks.on_train_begin(&ctx);
    }

    /// Notify callbacks that an outer iteration finished
    pub fn end_iteration(&mut self, iteration: usize, max_iterations: usize) {
        let ctx = CallbackContext {
            iteration: Some(iteration),
            max_iterations: Some(max_iterations),
            ..self.build_context(self.metrics.epoch, 0)
        };
        self.callbacks.on_iteration_end(&ctx);
    }

    /// Notify callbacks and summarize the run
    pub fn end_run(&mut self, eval: EvalReport) -> TrainReport {
        let ctx = self.build_context(self.metrics.epoch, 0);
        self.callbacks.on_train_end(&ctx);
        TrainReport {
            method: self.method,
            epochs: self.metrics.epoch,
            final_loss: self.metrics.losses.last().copied().unwrap_or(f32::NAN),
            eval,
            elapsed_secs: self.elapsed_secs(),
        }
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.start_time.map_or(0.0, |t| t.elapsed().as_secs_f64())
    }

    /// Build callback context from current state
    pub(crate) fn build_context(&self, epoch: usize, step: usize) -> CallbackContext {
        CallbackContext {
            method: self.method,
            epoch,
            max_epochs: self.config.epochs,
            step,
            global_step: self.metrics.steps,
            lr: self.lr(),
            elapsed_secs: self.elapsed_secs(),
            ..Default::default()
        }
    }
}
