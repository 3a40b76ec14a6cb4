//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are handed over as borrowed references collected from a model,
/// always in the same order, so per-parameter state is indexed by position.
pub trait Optimizer: Send {
    /// Perform a single optimization step using the accumulated gradients
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Zero gradients on referenced parameters
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Drop all per-parameter state and restore the initial learning rate
    fn reset(&mut self);

    /// Short name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    struct PlainDescent {
        lr: f32,
    }

    impl Optimizer for PlainDescent {
        fn step(&mut self, params: &mut [&mut Tensor]) {
            for param in params.iter_mut() {
                if let Some(grad) = param.grad().cloned() {
                    *param.data_mut() -= &(grad * self.lr);
                }
            }
        }

        fn lr(&self) -> f32 {
            self.lr
        }

        fn set_lr(&mut self, lr: f32) {
            self.lr = lr;
        }

        fn reset(&mut self) {}

        fn name(&self) -> &'static str {
            "plain"
        }
    }

    #[test]
    fn test_default_zero_grad() {
        let mut t = Tensor::new(arr2(&[[1.0, 2.0]]), true);
        t.set_grad(arr2(&[[0.5, 0.5]]));
        let mut opt = PlainDescent { lr: 0.1 };
        opt.step(&mut [&mut t]);
        assert!((t.data()[[0, 0]] - 0.95).abs() < 1e-6);
        opt.zero_grad(&mut [&mut t]);
        assert!(t.grad().is_none());
    }
}
