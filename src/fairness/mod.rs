//! Fairness bookkeeping shared by every training strategy
//!
//! - [`subgroup`]: `(group, class)` flattening, membership masks, zero-guarded means
//! - [`stats`]: full-pass prediction/probability collection
//! - [`violation`]: DP/EO violations and evaluation disparity
//! - [`multiplier`]: Lagrangian multiplier state
//! - [`renyi`]: Renyi-correlation weight state

pub mod multiplier;
pub mod renyi;
pub mod stats;
pub mod subgroup;
pub mod violation;

pub use multiplier::{sigmoid, MultiplierState};
pub use renyi::{signed_groups, RenyiWeights};
pub use stats::{collect_probabilities, collect_statistics, ProbabilityPass, Statistics};
pub use subgroup::{
    guarded_denominator, membership_mask, split_subgroup, subgroup_id, GroupClassTable,
    SubgroupAccumulator, SubgroupAggregate,
};
pub use violation::{
    compute_violations, disparity, dp_violations, eo_violations, Disparity, FairnessCriterion,
    ViolationReport,
};
