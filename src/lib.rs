//! # fairtrain
//!
//! Group-fairness-aware training for small classifiers.
//!
//! Every method trains through the same [`train::Harness`] (model,
//! optimizer, optional scheduler and sharpness-aware step) and differs only
//! in the loss it builds and the state it carries between passes:
//!
//! - `scratch`: plain or group/class-balanced empirical risk minimization
//! - `direct_reg`: cross entropy plus a differentiable per-class DCA penalty
//! - `lbc`: Lagrangian reweighting with multipliers updated between runs
//! - `renyi`: a Rényi-correlation penalty for binary groups
//! - `rvp`: robust variance of per-class losses across groups
//!
//! Runs are described by a YAML [`config::FairSpec`] and launched with
//! [`config::train_from_spec`] or the `fairtrain` binary.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod fairness;
pub mod model;
pub mod optim;
pub mod tensor;
pub mod tracking;
pub mod train;

pub use error::{Error, Result};
pub use tensor::Tensor;
