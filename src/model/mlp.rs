//! One-hidden-layer perceptron with ReLU activation

use super::{uniform_init, Classifier};
use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// `logits = relu(X W1ᵀ + b1) W2ᵀ + b2`
pub struct MlpClassifier {
    w1: Tensor,
    b1: Tensor,
    w2: Tensor,
    b2: Tensor,
    seed: u64,
    restarts: u64,
    training: bool,
}

impl MlpClassifier {
    /// Create an MLP with `hidden_dim` hidden units
    pub fn new(n_features: usize, hidden_dim: usize, n_classes: usize, seed: u64) -> Result<Self> {
        if n_features == 0 || hidden_dim == 0 || n_classes < 2 {
            return Err(Error::Config(format!(
                "mlp needs n_features > 0, hidden_dim > 0, n_classes >= 2 (got {n_features}, {hidden_dim}, {n_classes})"
            )));
        }
        let mut model = Self {
            w1: Tensor::zeros((hidden_dim, n_features), true),
            b1: Tensor::zeros((1, hidden_dim), true),
            w2: Tensor::zeros((n_classes, hidden_dim), true),
            b2: Tensor::zeros((1, n_classes), true),
            seed,
            restarts: 0,
            training: true,
        };
        model.draw();
        Ok(model)
    }

    fn draw(&mut self) {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(self.restarts));
        let (hidden, n_features) = self.w1.shape();
        let n_classes = self.w2.shape().0;
        *self.w1.data_mut() = uniform_init(&mut rng, hidden, n_features);
        *self.b1.data_mut() = uniform_init(&mut rng, 1, hidden);
        *self.w2.data_mut() = uniform_init(&mut rng, n_classes, hidden);
        *self.b2.data_mut() = uniform_init(&mut rng, 1, n_classes);
        for p in self.params_mut() {
            p.zero_grad();
        }
    }

    fn pre_activation(&self, inputs: &Array2<f32>) -> Array2<f32> {
        inputs.dot(&self.w1.data().t()) + self.b1.data()
    }

    /// Hidden layer width
    pub fn hidden_dim(&self) -> usize {
        self.w1.shape().0
    }
}

impl Classifier for MlpClassifier {
    fn n_classes(&self) -> usize {
        self.w2.shape().0
    }

    fn n_features(&self) -> usize {
        self.w1.shape().1
    }

    fn forward(&self, inputs: &Array2<f32>) -> Array2<f32> {
        let hidden = self.pre_activation(inputs).mapv(|v| v.max(0.0));
        hidden.dot(&self.w2.data().t()) + self.b2.data()
    }

    fn backward(&mut self, inputs: &Array2<f32>, grad_logits: &Array2<f32>) {
        // Activations are recomputed rather than cached between forward and backward
        let z1 = self.pre_activation(inputs);
        let a1 = z1.mapv(|v| v.max(0.0));

        let grad_w2 = grad_logits.t().dot(&a1);
        let grad_b2 = grad_logits.sum_axis(Axis(0)).insert_axis(Axis(0));

        let mut grad_z1 = grad_logits.dot(self.w2.data());
        grad_z1.zip_mut_with(&z1, |g, &z| {
            if z <= 0.0 {
                *g = 0.0;
            }
        });
        let grad_w1 = grad_z1.t().dot(inputs);
        let grad_b1 = grad_z1.sum_axis(Axis(0)).insert_axis(Axis(0));

        self.w1.accumulate_grad(&grad_w1);
        self.b1.accumulate_grad(&grad_b1);
        self.w2.accumulate_grad(&grad_w2);
        self.b2.accumulate_grad(&grad_b2);
    }

    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w1, &mut self.b1, &mut self.w2, &mut self.b2]
    }

    fn params(&self) -> Vec<&Tensor> {
        vec![&self.w1, &self.b1, &self.w2, &self.b2]
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

    fn name(&self) -> &'static str {
        "mlp"
    }
}
