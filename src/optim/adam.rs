//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array2;

/// Adam with bias correction and optional L2 weight decay
///
/// m_t = β1 m + (1 - β1) g, v_t = β2 v + (1 - β2) g²,
/// θ_t = θ - lr_t m_t / (√v_t + ε) with lr_t = lr √(1 - β2^t) / (1 - β1^t)
pub struct Adam {
    lr: f32,
    initial_lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Option<Array2<f32>>>,
    v: Vec<Option<Array2<f32>>>,
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            lr,
            initial_lr: lr,
            beta1,
            beta2,
            epsilon,
            weight_decay: 0.0,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Adam with β1 = 0.9, β2 = 0.999, ε = 1e-8
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    /// Add `weight_decay * θ` to every gradient
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Number of steps taken since construction or the last reset
    pub fn step_count(&self) -> u64 {
        self.t
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        if self.m.len() < params.len() {
            self.m.resize(params.len(), None);
            self.v.resize(params.len(), None);
        }
        self.t += 1;

        let lr_t = self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)));

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else {
                continue;
            };
            let grad = if self.weight_decay > 0.0 {
                grad + &(param.data() * self.weight_decay)
            } else {
                grad.clone()
            };

            let m_t = match &self.m[i] {
                Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                None => &grad * (1.0 - self.beta1),
            };
            let grad_sq = &grad * &grad;
            let v_t = match &self.v[i] {
                Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                None => &grad_sq * (1.0 - self.beta2),
            };

            let update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
            *param.data_mut() -= &update;

            self.m[i] = Some(m_t);
            self.v[i] = Some(v_t);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.t = 0;
        self.m.clear();
        self.v.clear();
        self.lr = self.initial_lr;
    }

    fn name(&self) -> &'static str {
        "adam"
    }
}
