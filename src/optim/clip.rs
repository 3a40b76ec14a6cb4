//! Gradient clipping utilities

use crate::Tensor;

/// Clip gradients by global norm
///
/// global_norm = sqrt(Σ ‖g‖²); when it exceeds `max_norm` every gradient is
/// scaled by `max_norm / global_norm`. Returns the norm before clipping.
pub fn clip_grad_norm(params: &mut [&mut Tensor], max_norm: f32) -> f32 {
    let global_norm = global_grad_norm(params);

    if global_norm > max_norm {
        let clip_coef = max_norm / global_norm;
        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                let clipped = grad * clip_coef;
                param.set_grad(clipped);
            }
        }
    }

    global_norm
}

/// `sqrt(Σ ‖g‖²)` over all parameters with a gradient
pub fn global_grad_norm(params: &[&mut Tensor]) -> f32 {
    params
        .iter()
        .map(|p| p.grad_norm_sq())
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_clip_scales_to_max_norm() {
        let mut a = Tensor::new(arr2(&[[0.0, 0.0]]), true);
        let mut b = Tensor::new(arr2(&[[0.0]]), true);
        a.set_grad(arr2(&[[3.0, 0.0]]));
        b.set_grad(arr2(&[[4.0]]));
        let norm = clip_grad_norm(&mut [&mut a, &mut b], 1.0);
        assert_abs_diff_eq!(norm, 5.0, epsilon = 1e-6);
        let after = global_grad_norm(&[&mut a, &mut b]);
        assert_abs_diff_eq!(after, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_clip_below_threshold() {
        let mut a = Tensor::new(arr2(&[[0.0]]), true);
        a.set_grad(arr2(&[[0.5]]));
        clip_grad_norm(&mut [&mut a], 1.0);
        assert_eq!(a.grad().unwrap()[[0, 0]], 0.5);
    }
}
