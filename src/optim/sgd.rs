//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array2;

/// SGD optimizer with optional momentum and L2 weight decay
pub struct SGD {
    lr: f32,
    initial_lr: f32,
    momentum: f32,
    weight_decay: f32,
    velocities: Vec<Option<Array2<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self {
            lr,
            initial_lr: lr,
            momentum,
            weight_decay: 0.0,
            velocities: Vec::new(),
        }
    }

    /// Add `weight_decay * θ` to every gradient
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Momentum coefficient
    pub fn momentum(&self) -> f32 {
        self.momentum
    }

    fn ensure_velocities(&mut self, n: usize) {
        if self.velocities.len() < n {
            self.velocities.resize(n, None);
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        self.ensure_velocities(params.len());

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else {
                continue;
            };
            let grad = if self.weight_decay > 0.0 {
                grad + &(param.data() * self.weight_decay)
            } else {
                grad.clone()
            };

            if self.momentum > 0.0 {
                // v = momentum * v - lr * grad
                let velocity = match &self.velocities[i] {
                    Some(v) => v * self.momentum - &grad * self.lr,
                    None => &grad * (-self.lr),
                };
                *param.data_mut() += &velocity;
                self.velocities[i] = Some(velocity);
            } else {
                *param.data_mut() -= &(&grad * self.lr);
            }
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.velocities.clear();
        self.lr = self.initial_lr;
    }

    fn name(&self) -> &'static str {
        "sgd"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    fn param(value: f32, grad: f32) -> Tensor {
        let mut t = Tensor::new(arr2(&[[value]]), true);
        t.set_grad(arr2(&[[grad]]));
        t
    }

    #[test]
    fn test_plain_step() {
        let mut p = param(1.0, 2.0);
        let mut opt = SGD::new(0.1, 0.0);
        opt.step(&mut [&mut p]);
        assert_abs_diff_eq!(p.data()[[0, 0]], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_momentum_accumulates() {
        let mut p = param(0.0, 1.0);
        let mut opt = SGD::new(0.1, 0.9);
        opt.step(&mut [&mut p]);
        assert_abs_diff_eq!(p.data()[[0, 0]], -0.1, epsilon = 1e-6);
        opt.step(&mut [&mut p]);
        // v = 0.9 * -0.1 - 0.1 = -0.19
        assert_abs_diff_eq!(p.data()[[0, 0]], -0.29, epsilon = 1e-6);
    }

    #[test]
    fn test_weight_decay() {
        let mut p = param(2.0, 0.0);
        let mut opt = SGD::new(0.5, 0.0).with_weight_decay(0.1);
        opt.step(&mut [&mut p]);
        assert_abs_diff_eq!(p.data()[[0, 0]], 1.9, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_clears_velocity_and_lr() {
        let mut p = param(0.0, 1.0);
        let mut opt = SGD::new(0.1, 0.9);
        opt.step(&mut [&mut p]);
        opt.set_lr(0.01);
        opt.reset();
        assert_abs_diff_eq!(opt.lr(), 0.1, epsilon = 1e-9);
        let before = p.data()[[0, 0]];
        opt.step(&mut [&mut p]);
        assert_abs_diff_eq!(p.data()[[0, 0]] - before, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_params_without_grad_untouched() {
        let mut p = Tensor::new(arr2(&[[3.0]]), true);
        SGD::new(0.1, 0.9).step(&mut [&mut p]);
        assert_eq!(p.data()[[0, 0]], 3.0);
    }
}
