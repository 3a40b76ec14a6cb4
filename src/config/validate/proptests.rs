//! Property-based tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use proptest::prelude::*;

fn arb_valid_spec() -> impl Strategy<Value = FairSpec> {
    (
        1usize..256,                        // batch_size
        1e-6f32..1.0,                       // lr
        1usize..100,                        // epochs
        proptest::option::of(0.1f32..10.0), // max_grad_norm
        0.0f32..10.0,                       // lambda
        1usize..20,                         // iterations
    )
        .prop_map(|(batch_size, lr, epochs, max_grad_norm, lambda, iterations)| FairSpec {
            optimizer: OptimSpec {
                lr,
                ..Default::default()
            },
            training: TrainingParams {
                batch_size,
                epochs,
                max_grad_norm,
                ..Default::default()
            },
            fairness: FairnessSpec {
                lambda,
                iterations,
                ..Default::default()
            },
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_spec_passes(spec in arb_valid_spec()) {
        prop_assert!(validate_config(&spec).is_ok());
    }

    #[test]
    fn prop_lr_above_one_rejected(spec in arb_valid_spec(), lr in 1.0001f32..100.0) {
        let mut spec = spec;
        spec.optimizer.lr = lr;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidLearningRate(_))
        ));
    }

    #[test]
    fn prop_negative_lambda_rejected(spec in arb_valid_spec(), lambda in -100.0f32..-1e-6) {
        let mut spec = spec;
        spec.fairness.lambda = lambda;
        prop_assert!(matches!(
            validate_config(&spec),
            Err(ValidationError::InvalidLambda(_))
        ));
    }
}
