//! Per-node simulation parameters
//!
//! Each node may carry a duration distribution, the time unit its samples
//! are expressed in, branch weights and a resource cost. A node without
//! data executes in zero time.

use crate::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Time Unit ────────────────────────────────────────────────────────

/// Unit a sampled duration is expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    #[serde(alias = "ms")]
    Milliseconds,
    #[serde(alias = "s")]
    Seconds,
    #[serde(alias = "min")]
    Minutes,
    #[serde(alias = "h")]
    Hours,
    #[serde(alias = "d")]
    Days,
}

impl TimeUnit {
    /// Milliseconds in one unit
    pub fn millis_per_unit(&self) -> i64 {
        match self {
            TimeUnit::Milliseconds => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Days => 86_400_000,
        }
    }

    /// Convert a value in this unit to milliseconds; `None` on overflow
    pub fn to_millis(&self, value: i64) -> Option<i64> {
        value.checked_mul(self.millis_per_unit())
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        };
        write!(f, "{}", name)
    }
}

// ── Duration Distribution ────────────────────────────────────────────

/// How a node's execution time is drawn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DurationDistribution {
    /// Always `duration`
    Fixed { duration: i64 },
    /// Uniform over `[duration - range, duration + range]`
    Uniform { duration: i64, range: i64 },
    /// Gaussian around `mean`
    Normal { mean: f64, std_dev: f64 },
    /// Exponential with the given mean
    Exponential { mean: f64 },
    /// Poisson with the given mean
    Poisson { mean: f64 },
}

impl Default for DurationDistribution {
    fn default() -> Self {
        DurationDistribution::Fixed { duration: 0 }
    }
}

impl DurationDistribution {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            DurationDistribution::Fixed { .. } => "fixed",
            DurationDistribution::Uniform { .. } => "uniform",
            DurationDistribution::Normal { .. } => "normal",
            DurationDistribution::Exponential { .. } => "exponential",
            DurationDistribution::Poisson { .. } => "poisson",
        }
    }
}

// ── Node Simulation Data ─────────────────────────────────────────────

/// Simulation parameters for one node
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSimulationData {
    #[serde(default)]
    pub distribution: DurationDistribution,
    #[serde(default)]
    pub time_unit: TimeUnit,
    /// Branch weight of a boundary event relative to its host's normal exit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    /// Cost of one time unit of work (user tasks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_time_unit: Option<f64>,
    /// Outgoing branch weights by target node; override edge probabilities
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub branch_weights: IndexMap<NodeId, f64>,
}

impl NodeSimulationData {
    pub fn new(distribution: DurationDistribution) -> Self {
        Self {
            distribution,
            ..Default::default()
        }
    }

    pub fn fixed(duration: i64) -> Self {
        Self::new(DurationDistribution::Fixed { duration })
    }

    pub fn uniform(duration: i64, range: i64) -> Self {
        Self::new(DurationDistribution::Uniform { duration, range })
    }

    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Self::new(DurationDistribution::Normal { mean, std_dev })
    }

    pub fn exponential(mean: f64) -> Self {
        Self::new(DurationDistribution::Exponential { mean })
    }

    pub fn poisson(mean: f64) -> Self {
        Self::new(DurationDistribution::Poisson { mean })
    }

    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn with_cost_per_time_unit(mut self, cost: f64) -> Self {
        self.cost_per_time_unit = Some(cost);
        self
    }

    pub fn with_branch_weight(mut self, target: impl Into<NodeId>, weight: f64) -> Self {
        self.branch_weights.insert(target.into(), weight);
        self
    }

    /// Resource cost of `duration` time units of work, if a rate is set
    pub fn resource_cost(&self, duration: i64) -> Option<f64> {
        self.cost_per_time_unit.map(|rate| rate * duration as f64)
    }
}
