//! Multinomial logistic regression

use super::{uniform_init, Classifier};
use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Linear classifier: `logits = X Wᵀ + b`
///
/// # Example
///
/// ```
/// use fairtrain::model::{Classifier, LinearClassifier};
/// use ndarray::Array2;
///
/// let model = LinearClassifier::new(4, 2, 0).unwrap();
/// let logits = model.forward(&Array2::zeros((3, 4)));
/// assert_eq!(logits.dim(), (3, 2));
/// ```
pub struct LinearClassifier {
    weight: Tensor,
    bias: Tensor,
    seed: u64,
    restarts: u64,
    training: bool,
}

impl LinearClassifier {
    /// Create a linear classifier with seeded uniform initialization
    pub fn new(n_features: usize, n_classes: usize, seed: u64) -> Result<Self> {
        if n_features == 0 || n_classes < 2 {
            return Err(Error::Config(format!(
                "linear classifier needs n_features > 0 and n_classes >= 2 (got {n_features}, {n_classes})"
            )));
        }
        let mut model = Self {
            weight: Tensor::zeros((n_classes, n_features), true),
            bias: Tensor::zeros((1, n_classes), true),
            seed,
            restarts: 0,
            training: true,
        };
        model.draw();
        Ok(model)
    }

    fn draw(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.restarts));
        let (n_classes, n_features) = self.weight.shape();
        *self.weight.data_mut() = uniform_init(&mut rng, n_classes, n_features);
        *self.bias.data_mut() = uniform_init(&mut rng, 1, n_classes);
        self.weight.zero_grad();
        self.bias.zero_grad();
    }

    /// Weight matrix (`n_classes × n_features`)
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// Bias row (`1 × n_classes`)
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
}

impl Classifier for LinearClassifier {
    fn n_classes(&self) -> usize {
        self.weight.shape().0
    }

    fn n_features(&self) -> usize {
        self.weight.shape().1
    }

    fn forward(&self, inputs: &Array2<f32>) -> Array2<f32> {
        inputs.dot(&self.weight.data().t()) + self.bias.data()
    }

    fn backward(&mut self, inputs: &Array2<f32>, grad_logits: &Array2<f32>) {
        let grad_w = grad_logits.t().dot(inputs);
        let grad_b = grad_logits.sum_axis(Axis(0)).insert_axis(Axis(0));
        self.weight.accumulate_grad(&grad_w);
        self.bias.accumulate_grad(&grad_b);
    }

    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weight, &mut self.bias]
    }

    fn params(&self) -> Vec<&Tensor> {
        vec![&self.weight, &self.bias]
    }

    fn train_mode(&mut self) {
        self.training = true;
    }

    fn eval_mode(&mut self) {
        self.training = false;
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn supports_reinit(&self) -> bool {
        true
    }

    fn reinitialize(&mut self) {
        self.restarts += 1;
        self.draw();
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
