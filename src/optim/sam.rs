//! Sharpness-aware two-step updates
//!
//! `first_step` moves every parameter to `θ + ρ g / ‖g‖` and remembers the
//! perturbation; after the loss has been recomputed there, `second_step`
//! restores `θ` and lets the wrapped optimizer apply the new gradient.

use super::clip::global_grad_norm;
use super::Optimizer;
use crate::Tensor;
use ndarray::Array2;

/// Sharpness-aware minimization around a base optimizer
pub struct Sam {
    rho: f32,
    perturbations: Vec<Option<Array2<f32>>>,
}

impl Sam {
    /// Create a SAM wrapper with neighbourhood radius `rho`
    pub fn new(rho: f32) -> Self {
        Self {
            rho,
            perturbations: Vec::new(),
        }
    }

    /// Neighbourhood radius
    pub fn rho(&self) -> f32 {
        self.rho
    }

    /// Ascend to the worst-case neighbour and zero the gradients
    pub fn first_step(&mut self, params: &mut [&mut Tensor]) {
        let scale = self.rho / (global_grad_norm(params) + 1e-12);
        self.perturbations.clear();
        for param in params.iter_mut() {
            let e = param.grad().map(|g| g * scale);
            if let Some(e) = &e {
                *param.data_mut() += e;
            }
            self.perturbations.push(e);
            param.zero_grad();
        }
    }

    /// Undo the perturbation, step the base optimizer and zero the gradients
    pub fn second_step(&mut self, params: &mut [&mut Tensor], base: &mut dyn Optimizer) {
        for (param, e) in params.iter_mut().zip(self.perturbations.drain(..)) {
            if let Some(e) = e {
                *param.data_mut() -= &e;
            }
        }
        base.step(params);
        base.zero_grad(params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optim::SGD;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_first_step_perturbs_by_rho() {
        let mut p = Tensor::new(arr2(&[[1.0, 1.0]]), true);
        p.set_grad(arr2(&[[3.0, 4.0]]));
        let mut sam = Sam::new(0.5);
        sam.first_step(&mut [&mut p]);
        assert_abs_diff_eq!(p.data()[[0, 0]], 1.3, epsilon = 1e-6);
        assert_abs_diff_eq!(p.data()[[0, 1]], 1.4, epsilon = 1e-6);
        assert!(p.grad().is_none());
    }

    #[test]
    fn test_second_step_restores_then_steps() {
        let mut p = Tensor::new(arr2(&[[1.0]]), true);
        p.set_grad(arr2(&[[2.0]]));
        let mut sam = Sam::new(0.1);
        let mut base = SGD::new(0.5, 0.0);
        sam.first_step(&mut [&mut p]);
        assert_abs_diff_eq!(p.data()[[0, 0]], 1.1, epsilon = 1e-6);
        // gradient measured at the perturbed point
        p.set_grad(arr2(&[[1.0]]));
        sam.second_step(&mut [&mut p], &mut base);
        assert_abs_diff_eq!(p.data()[[0, 0]], 0.5, epsilon = 1e-6);
        assert!(p.grad().is_none());
    }
}
