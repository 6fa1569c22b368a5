use crate::algorithm::AlgorithmParams;
use crate::item::Algorithm;
use crate::traits::*;
use serde::{Deserialize, Serialize};

/// Settings for a drill session, every field is optional in the yaml file.
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DrillConfig {
    pub algorithm: Algorithm,
    pub failure_quality: Quality,
    pub learn_fraction: f64,
    pub sm5_initial_interval: Interval,
    /// Number of reviews to perform.
    pub iterations: usize,
    /// Seed for reproducible sessions, entropy if absent.
    pub seed: Option<u64>,
    /// Fail every item once before the session starts.
    pub prime: bool,
    /// Reject qualities outside of 0..=5.
    pub check_quality: bool,
}

impl Default for DrillConfig {
    fn default() -> Self {
        let params = AlgorithmParams::default();
        DrillConfig {
            algorithm: Algorithm::default(),
            failure_quality: params.failure_quality,
            learn_fraction: params.learn_fraction,
            sm5_initial_interval: params.sm5_initial_interval,
            iterations: 50,
            seed: None,
            prime: true,
            check_quality: false,
        }
    }
}

impl DrillConfig {
    /// Load from a yaml file.
    pub fn load(filename: &str) -> DrillResult<Self> {
        let file = std::fs::File::open(filename)?;
        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn from_yaml(text: &str) -> DrillResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn params(&self) -> AlgorithmParams {
        AlgorithmParams {
            failure_quality: self.failure_quality,
            learn_fraction: self.learn_fraction,
            sm5_initial_interval: self.sm5_initial_interval,
        }
    }
}
