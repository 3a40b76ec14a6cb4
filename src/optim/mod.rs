//! Optimizers and learning-rate schedules for classifier training

mod adam;
mod clip;
mod optimizer;
mod sam;
mod scheduler;
mod sgd;

pub use adam::Adam;
pub use clip::{clip_grad_norm, global_grad_norm};
pub use optimizer::Optimizer;
pub use sam::Sam;
pub use scheduler::{
    CosineAnnealingLR, LRScheduler, MultiStepLR, PlateauMode, ReduceLROnPlateau, ScheduleMode,
    StepDecayLR,
};
pub use sgd::SGD;
