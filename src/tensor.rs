//! Trainable parameter tensor
//!
//! Model parameters are stored as 2-D `f32` arrays together with an optional
//! gradient buffer. Gradients are written by `Classifier::backward` and consumed
//! by optimizers; biases are stored as `1 × n` rows.

use ndarray::Array2;

/// A parameter matrix with an accumulated gradient
#[derive(Clone, Debug)]
pub struct Tensor {
    data: Array2<f32>,
    grad: Option<Array2<f32>>,
    requires_grad: bool,
}

impl Tensor {
    /// Wrap an existing matrix
    pub fn new(data: Array2<f32>, requires_grad: bool) -> Self {
        Self {
            data,
            grad: None,
            requires_grad,
        }
    }

    /// Create a `1 × n` row tensor from a vector
    pub fn from_vec(values: Vec<f32>, requires_grad: bool) -> Self {
        let n = values.len();
        let data = Array2::from_shape_fn((1, n), |(_, j)| values[j]);
        Self::new(data, requires_grad)
    }

    /// Create a zero-filled tensor with the given shape
    pub fn zeros(shape: (usize, usize), requires_grad: bool) -> Self {
        Self::new(Array2::zeros(shape), requires_grad)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shape as `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Parameter values
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Mutable parameter values
    pub fn data_mut(&mut self) -> &mut Array2<f32> {
        &mut self.data
    }

    /// Accumulated gradient, if any
    pub fn grad(&self) -> Option<&Array2<f32>> {
        self.grad.as_ref()
    }

    /// Whether this tensor receives gradients
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Replace the gradient
    pub fn set_grad(&mut self, grad: Array2<f32>) {
        debug_assert_eq!(grad.dim(), self.data.dim(), "gradient shape mismatch");
        self.grad = Some(grad);
    }

    /// Add to the gradient (no-op when `requires_grad` is false)
    pub fn accumulate_grad(&mut self, grad: &Array2<f32>) {
        if !self.requires_grad {
            return;
        }
        debug_assert_eq!(grad.dim(), self.data.dim(), "gradient shape mismatch");
        match self.grad.as_mut() {
            Some(existing) => *existing += grad,
            None => self.grad = Some(grad.clone()),
        }
    }

    /// Drop the accumulated gradient
    pub fn zero_grad(&mut self) {
        self.grad = None;
    }

    /// Squared L2 norm of the gradient (0 when absent)
    pub fn grad_norm_sq(&self) -> f32 {
        self.grad
            .as_ref()
            .map_or(0.0, |g| g.iter().map(|&v| v * v).sum())
    }
}
