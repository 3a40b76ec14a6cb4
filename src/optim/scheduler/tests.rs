//! Tests for learning rate schedulers

use super::*;
use crate::optim::SGD;
use approx::assert_abs_diff_eq;

#[test]
fn test_cosine_annealing_endpoints() {
    let mut scheduler = CosineAnnealingLR::new(1.0, 100, 0.1);
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-6);
    for _ in 0..50 {
        scheduler.step(None);
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.55, epsilon = 1e-4);
    for _ in 0..50 {
        scheduler.step(None);
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.1, epsilon = 1e-6);
}

#[test]
fn test_cosine_annealing_decreases_monotonically() {
    let mut scheduler = CosineAnnealingLR::new(1.0, 20, 0.0);
    let mut prev_lr = scheduler.get_lr();
    for _ in 0..20 {
        scheduler.step(None);
        let lr = scheduler.get_lr();
        assert!(lr <= prev_lr);
        prev_lr = lr;
    }
}

#[test]
fn test_step_decay() {
    let mut scheduler = StepDecayLR::new(1.0, 2, 0.5);
    let lrs: Vec<f32> = (0..5)
        .map(|_| {
            let lr = scheduler.get_lr();
            scheduler.step(None);
            lr
        })
        .collect();
    assert_eq!(lrs, vec![1.0, 1.0, 0.5, 0.5, 0.25]);
}

#[test]
fn test_step_decay_zero_step_size_constant() {
    let mut scheduler = StepDecayLR::new(0.3, 0, 0.1);
    scheduler.step(None);
    assert_abs_diff_eq!(scheduler.get_lr(), 0.3, epsilon = 1e-9);
}

#[test]
fn test_multistep_milestones() {
    let mut scheduler = MultiStepLR::new(1.0, vec![20, 10], 0.1);
    assert_eq!(scheduler.milestones(), &[10, 20]);
    for _ in 0..10 {
        scheduler.step(None);
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.1, epsilon = 1e-7);
    for _ in 0..10 {
        scheduler.step(None);
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.01, epsilon = 1e-8);
    scheduler.reset();
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_plateau_reduces_after_patience() {
    let mut scheduler = ReduceLROnPlateau::new(1.0).with_patience(2).with_factor(0.5);
    scheduler.step(Some(1.0));
    scheduler.step(Some(1.0));
    scheduler.step(Some(1.0));
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-9);
    scheduler.step(Some(1.0));
    assert_abs_diff_eq!(scheduler.get_lr(), 0.5, epsilon = 1e-9);
}

#[test]
fn test_plateau_improvement_resets_patience() {
    let mut scheduler = ReduceLROnPlateau::new(1.0).with_patience(1);
    for loss in [1.0, 0.9, 0.8, 0.7, 0.6] {
        scheduler.step(Some(loss));
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_plateau_ignores_missing_metric() {
    let mut scheduler = ReduceLROnPlateau::new(1.0).with_patience(0);
    for _ in 0..5 {
        scheduler.step(None);
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_plateau_respects_min_lr_and_reset() {
    let mut scheduler = ReduceLROnPlateau::new(1.0)
        .with_patience(0)
        .with_min_lr(0.05)
        .with_mode(PlateauMode::Max);
    for _ in 0..10 {
        scheduler.step(Some(0.5));
    }
    assert_abs_diff_eq!(scheduler.get_lr(), 0.05, epsilon = 1e-9);
    scheduler.reset();
    assert_abs_diff_eq!(scheduler.get_lr(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_apply_sets_optimizer_lr() {
    let mut scheduler = StepDecayLR::new(0.1, 1, 0.5);
    let mut opt = SGD::new(0.1, 0.0);
    scheduler.step(None);
    scheduler.apply(&mut opt);
    assert_abs_diff_eq!(crate::optim::Optimizer::lr(&opt), 0.05, epsilon = 1e-9);
}
