//! Simulation configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file or a
//! missing file both yield the default configuration.

use serde::{Deserialize, Serialize};
use simulation_types::{SimulationError, SimulationResult};
use std::path::Path;

/// Run-wide simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Virtual time the run starts at (ms); `None` uses the current UTC time
    pub epoch_ms: Option<i64>,
    /// Abort the whole run when a single instance fails
    pub strict: bool,
    /// Clamp the low bound of a uniform sampler at zero instead of failing
    pub clamp_negative_durations: bool,
    /// Longest path the path finder will build before reporting a cycle
    pub max_path_nodes: usize,
    /// Allowed deviation of a gateway's weight sum from 1
    pub probability_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            epoch_ms: None,
            strict: false,
            clamp_negative_durations: false,
            max_path_nodes: 10_000,
            probability_tolerance: 1e-6,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_epoch_ms(mut self, epoch_ms: i64) -> Self {
        self.epoch_ms = Some(epoch_ms);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_clamp_negative_durations(mut self, clamp: bool) -> Self {
        self.clamp_negative_durations = clamp;
        self
    }

    pub fn with_max_path_nodes(mut self, max: usize) -> Self {
        self.max_path_nodes = max;
        self
    }

    pub fn with_probability_tolerance(mut self, tolerance: f64) -> Self {
        self.probability_tolerance = tolerance;
        self
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> SimulationResult<Self> {
        let config: SimulationConfig =
            toml::from_str(contents).map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml_str(&contents)
        } else {
            tracing::debug!(path = %path.display(), "No simulation config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> SimulationResult<String> {
        toml::to_string_pretty(self).map_err(|e| SimulationError::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> SimulationResult<()> {
        if !(self.probability_tolerance.is_finite() && self.probability_tolerance > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "probability_tolerance must be positive, got {}",
                self.probability_tolerance
            )));
        }
        if self.max_path_nodes == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_path_nodes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
