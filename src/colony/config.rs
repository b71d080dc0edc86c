//! Colony run parameters.

use crate::error::{ColonyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the ants of one iteration are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Tours built concurrently on the rayon pool
    Parallel,
    /// Tours built one after another on the calling thread
    Sequential,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Parallel => write!(f, "parallel"),
            ExecutionMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// ACO configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Number of ants
    pub num_ants: usize,
    /// Number of iterations
    pub num_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub rho: f64,
    /// Master seed of the per-ant random streams
    pub seed: u64,
    pub mode: ExecutionMode,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        ColonyConfig {
            num_ants: 16,
            num_iterations: 1000,
            alpha: 1.0,
            beta: 2.0,
            rho: 0.5,
            seed: 42,
            mode: ExecutionMode::Parallel,
        }
    }
}

impl ColonyConfig {
    /// Check the parameters before a run
    pub fn validate(&self) -> Result<()> {
        if self.num_ants == 0 {
            return Err(ColonyError::InvalidConfig(
                "number of ants must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.rho) {
            return Err(ColonyError::InvalidConfig(format!(
                "evaporation rate must lie in [0, 1], got {}",
                self.rho
            )));
        }
        if !self.alpha.is_finite() || !self.beta.is_finite() {
            return Err(ColonyError::InvalidConfig(format!(
                "alpha and beta must be finite, got alpha={} beta={}",
                self.alpha, self.beta
            )));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read {}: {}", path.as_ref().display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("Invalid colony config: {}", e))
    }
}
