//! Fairness-aware training loop
//!
//! This module provides:
//! - Loss functions with analytic logit gradients (cross entropy, weighted,
//!   group-balanced, DCA-regularized, robust variance)
//! - Training configuration and metrics tracking
//! - Callbacks for progress output
//! - The [`Harness`] shared by every strategy
//! - The strategies themselves and a static registry keyed by [`Method`]
//!
//! # Example
//!
//! ```no_run
//! use fairtrain::data::{build_dataset, SyntheticConfig};
//! use fairtrain::fairness::FairnessCriterion;
//! use fairtrain::model::LinearClassifier;
//! use fairtrain::optim::SGD;
//! use fairtrain::train::{build_trainer, Harness, Method, StrategyParams, TrainConfig};
//!
//! let (train, test) = build_dataset("synthetic", &SyntheticConfig::default()).unwrap();
//! let model = LinearClassifier::new(8, 2, 0).unwrap();
//! let mut harness = Harness::new(
//!     Box::new(model),
//!     Box::new(SGD::new(0.01, 0.9)),
//!     TrainConfig::new().with_epochs(5),
//! );
//! let params = StrategyParams {
//!     criterion: FairnessCriterion::Eo,
//!     iterations: 3,
//!     ..Default::default()
//! };
//! let mut trainer = build_trainer(Method::Lbc, params, 2, 2).unwrap();
//! let report = trainer.train(&mut harness, &train, &test).unwrap();
//! println!("test acc {:.3}", report.eval.accuracy);
//! ```

pub mod callback;
mod config;
mod harness;
pub mod loss;
mod registry;
pub mod strategy;

pub use callback::{CallbackContext, CallbackManager, ProgressCallback, TrainerCallback};
pub use config::{MetricsTracker, TrainConfig};
pub use harness::{EpochSummary, EvalReport, Harness, StepOutcome, TrainReport};
pub use loss::{
    base_loss, class_variances, dca_penalty, logit_grad, per_class_dca, per_sample_cross_entropy,
    softmax_backward, softmax_rows, variance_penalty, CrossEntropyLoss, DirectRegLoss,
    GroupBalancedLoss, LossFn, LossOutput, LossTarget, RobustVarianceLoss, SampleWeightedLoss,
};
pub use registry::{build_trainer, Method};
pub use strategy::{
    DirectRegTrainer, FairTrainer, LbcTrainer, RenyiTrainer, RvpTrainer, ScratchTrainer,
    StrategyParams,
};
