//! Static strategy registry

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::strategy::{
    DirectRegTrainer, FairTrainer, LbcTrainer, RenyiTrainer, RvpTrainer, ScratchTrainer,
    StrategyParams,
};
use crate::error::{Error, Result};

/// Training method identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Empirical risk minimization baseline
    Scratch,
    /// DCA-regularized training
    DirectReg,
    /// Lagrangian multiplier reweighting
    Lbc,
    /// Renyi-correlation regularization
    Renyi,
    /// Robust variance penalty
    Rvp,
}

type TrainerFactory = fn(StrategyParams, usize, usize) -> Result<Box<dyn FairTrainer>>;

const TRAINERS: &[(Method, &str, TrainerFactory)] = &[
    (
        Method::Scratch,
        "ERM with optional group-balanced loss or count reweighting",
        scratch,
    ),
    (
        Method::DirectReg,
        "base loss + lambda * DCA regularizer (criterion: dca)",
        direct_reg,
    ),
    (
        Method::Lbc,
        "Lagrangian multiplier reweighting over outer iterations (criterion: dp, eo)",
        lbc,
    ),
    (
        Method::Renyi,
        "Renyi-correlation penalty, two groups only (criterion: dp, eo)",
        renyi,
    ),
    (
        Method::Rvp,
        "average subgroup loss + rho-scaled cross-group variance",
        rvp,
    ),
];

fn scratch(p: StrategyParams, g: usize, c: usize) -> Result<Box<dyn FairTrainer>> {
    Ok(Box::new(ScratchTrainer::new(p, g, c)))
}

fn direct_reg(p: StrategyParams, g: usize, c: usize) -> Result<Box<dyn FairTrainer>> {
    Ok(Box::new(DirectRegTrainer::new(p, g, c)?))
}

fn lbc(p: StrategyParams, g: usize, c: usize) -> Result<Box<dyn FairTrainer>> {
    Ok(Box::new(LbcTrainer::new(p, g, c)?))
}

fn renyi(p: StrategyParams, g: usize, c: usize) -> Result<Box<dyn FairTrainer>> {
    Ok(Box::new(RenyiTrainer::new(p, g, c)?))
}

fn rvp(p: StrategyParams, g: usize, c: usize) -> Result<Box<dyn FairTrainer>> {
    Ok(Box::new(RvpTrainer::new(p, g, c)))
}

impl Method {
    /// Every registered method, in registry order
    pub fn all() -> Vec<Method> {
        TRAINERS.iter().map(|(m, _, _)| *m).collect()
    }

    /// Registry name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scratch => "scratch",
            Self::DirectReg => "direct_reg",
            Self::Lbc => "lbc",
            Self::Renyi => "renyi",
            Self::Rvp => "rvp",
        }
    }

    /// One-line description
    pub fn description(&self) -> &'static str {
        TRAINERS
            .iter()
            .find(|(m, _, _)| m == self)
            .map_or("", |(_, d, _)| *d)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Method::all()
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::UnknownMethod(s.to_string()))
    }
}

/// Construct the trainer registered for `method`
///
/// Fails fast on a criterion or group count the method cannot handle.
pub fn build_trainer(
    method: Method,
    params: StrategyParams,
    n_groups: usize,
    n_classes: usize,
) -> Result<Box<dyn FairTrainer>> {
    let (_, _, factory) = TRAINERS
        .iter()
        .find(|(m, _, _)| *m == method)
        .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;
    factory(params, n_groups, n_classes)
}
