//! YAML schema definitions for declarative fairness training runs

use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{BalanceScheme, SyntheticConfig};
use crate::fairness::FairnessCriterion;
use crate::train::{Method, StrategyParams, TrainConfig};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete run specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairSpec {
    /// Training method
    #[serde(default = "default_method")]
    pub method: Method,

    /// Dataset selection
    #[serde(default)]
    pub data: DataSpec,

    /// Classifier architecture
    #[serde(default)]
    pub model: ModelSpec,

    /// Optimizer
    #[serde(default)]
    pub optimizer: OptimSpec,

    /// Optional learning rate scheduler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerSpec>,

    /// Training loop parameters
    #[serde(default)]
    pub training: TrainingParams,

    /// Fairness criterion and strategy coefficients
    #[serde(default)]
    pub fairness: FairnessSpec,
}

fn default_method() -> Method {
    Method::Scratch
}

impl Default for FairSpec {
    fn default() -> Self {
        Self {
            method: default_method(),
            data: DataSpec::default(),
            model: ModelSpec::default(),
            optimizer: OptimSpec::default(),
            scheduler: None,
            training: TrainingParams::default(),
            fairness: FairnessSpec::default(),
        }
    }
}

impl FairSpec {
    /// Runtime training configuration
    pub fn train_config(&self) -> TrainConfig {
        let t = &self.training;
        TrainConfig {
            epochs: t.epochs,
            batch_size: t.batch_size,
            n_workers: t.n_workers,
            log_interval: t.print_every,
            seed: t.seed,
            balanced: t.balanced,
            max_grad_norm: t.max_grad_norm,
            sam_rho: t.sam_rho,
            record: t.record,
        }
    }

    /// Strategy coefficients
    pub fn strategy_params(&self) -> StrategyParams {
        let f = &self.fairness;
        StrategyParams {
            criterion: f.criterion,
            lambda: f.lambda,
            eta: f.eta,
            rho: f.rho,
            iterations: f.iterations,
            restart_from_scratch: f.restart_from_scratch,
            reweight: f.reweight,
        }
    }
}

/// Dataset registry key plus generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// Registry name
    #[serde(default = "default_dataset")]
    pub name: String,

    /// Generator parameters
    #[serde(flatten)]
    pub synthetic: SyntheticConfig,
}

fn default_dataset() -> String {
    "synthetic".to_string()
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            name: default_dataset(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Classifier family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Single affine layer
    #[default]
    Linear,
    /// One hidden ReLU layer
    Mlp,
}

/// Classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Architecture
    #[serde(default)]
    pub kind: ModelKind,

    /// Hidden width (mlp only)
    #[serde(default = "default_hidden_dim")]
    pub hidden_dim: usize,

    /// Initialization seed
    #[serde(default)]
    pub seed: u64,
}

fn default_hidden_dim() -> usize {
    64
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            kind: ModelKind::default(),
            hidden_dim: default_hidden_dim(),
            seed: 0,
        }
    }
}

/// Optimizer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimSpec {
    /// Optimizer name (sgd, adam)
    #[serde(default = "default_optimizer")]
    pub name: String,

    /// Learning rate
    #[serde(default = "default_lr")]
    pub lr: f32,

    /// SGD momentum
    #[serde(default = "default_momentum")]
    pub momentum: f32,

    /// L2 weight decay
    #[serde(default)]
    pub weight_decay: f32,

    /// Adam first-moment decay
    #[serde(default = "default_beta1")]
    pub beta1: f32,

    /// Adam second-moment decay
    #[serde(default = "default_beta2")]
    pub beta2: f32,

    /// Adam epsilon
    #[serde(default = "default_eps")]
    pub eps: f32,
}

fn default_optimizer() -> String {
    "sgd".to_string()
}
fn default_lr() -> f32 {
    0.01
}
fn default_momentum() -> f32 {
    0.9
}
fn default_beta1() -> f32 {
    0.9
}
fn default_beta2() -> f32 {
    0.999
}
fn default_eps() -> f32 {
    1e-8
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self {
            name: default_optimizer(),
            lr: default_lr(),
            momentum: default_momentum(),
            weight_decay: 0.0,
            beta1: default_beta1(),
            beta2: default_beta2(),
            eps: default_eps(),
        }
    }
}

/// Learning rate scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSpec {
    /// Scheduler name (step, multistep, cosine, plateau)
    pub name: String,

    /// Decay interval in epochs (step)
    #[serde(default = "default_step_size")]
    pub step_size: usize,

    /// Decay epochs (multistep)
    #[serde(default)]
    pub milestones: Vec<usize>,

    /// Decay factor (step, multistep, plateau)
    #[serde(default = "default_gamma")]
    pub gamma: f32,

    /// Cosine period in epochs; defaults to the epoch count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_max: Option<usize>,

    /// Learning rate floor (cosine, plateau)
    #[serde(default)]
    pub min_lr: f32,

    /// Whether the monitored loss should go down ("min") or up ("max")
    #[serde(default = "default_plateau_mode")]
    pub mode: String,

    /// Epochs without improvement before decaying (plateau)
    #[serde(default = "default_patience")]
    pub patience: usize,

    /// Relative improvement threshold (plateau)
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Epochs to wait after a decay (plateau)
    #[serde(default)]
    pub cooldown: usize,
}

fn default_step_size() -> usize {
    10
}
fn default_gamma() -> f32 {
    0.1
}
fn default_plateau_mode() -> String {
    "min".to_string()
}
fn default_patience() -> usize {
    10
}
fn default_threshold() -> f32 {
    1e-4
}

impl SchedulerSpec {
    /// Scheduler of the given name with default parameters
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            step_size: default_step_size(),
            milestones: Vec::new(),
            gamma: default_gamma(),
            t_max: None,
            min_lr: 0.0,
            mode: default_plateau_mode(),
            patience: default_patience(),
            threshold: default_threshold(),
            cooldown: 0,
        }
    }
}

/// Training loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingParams {
    /// Epochs per run
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Mini-batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Prefetch workers
    #[serde(default)]
    pub n_workers: usize,

    /// Progress line every N batches
    #[serde(default = "default_print_every")]
    pub print_every: usize,

    /// Shuffle seed
    #[serde(default)]
    pub seed: u64,

    /// Group-balanced base cross entropy
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub balanced: bool,

    /// Global gradient norm clip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_grad_norm: Option<f32>,

    /// Sharpness-aware radius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sam_rho: Option<f32>,

    /// Per-epoch logging of training metrics and regularizers
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub record: bool,

    /// Compute device
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_epochs() -> usize {
    30
}
fn default_batch_size() -> usize {
    128
}
fn default_print_every() -> usize {
    10
}
fn default_device() -> String {
    "cpu".to_string()
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            n_workers: 0,
            print_every: default_print_every(),
            seed: 0,
            balanced: false,
            max_grad_norm: None,
            sam_rho: None,
            record: false,
            device: default_device(),
        }
    }
}

/// Fairness criterion and strategy coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessSpec {
    /// Criterion (dp, eo, dca)
    #[serde(default = "default_criterion")]
    pub criterion: FairnessCriterion,

    /// Regularizer weight
    #[serde(default = "default_one")]
    pub lambda: f32,

    /// Multiplier learning rate
    #[serde(default = "default_eta")]
    pub eta: f32,

    /// Variance coefficient
    #[serde(default = "default_one")]
    pub rho: f32,

    /// Outer iterations
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Reinitialize the model before every outer iteration
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_lenient")]
    pub restart_from_scratch: bool,

    /// Count-based per-sample reweighting for the baseline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reweight: Option<BalanceScheme>,
}

fn default_criterion() -> FairnessCriterion {
    FairnessCriterion::Eo
}
fn default_one() -> f32 {
    1.0
}
fn default_eta() -> f32 {
    0.1
}
fn default_iterations() -> usize {
    10
}
fn default_true() -> bool {
    true
}

impl Default for FairnessSpec {
    fn default() -> Self {
        Self {
            criterion: default_criterion(),
            lambda: default_one(),
            eta: default_eta(),
            rho: default_one(),
            iterations: default_iterations(),
            restart_from_scratch: true,
            reweight: None,
        }
    }
}
