//! Duration sampling
//!
//! A [`TimeGenerator`] draws how long one node execution takes, in the
//! node's time unit. Generators hold only their parameters; every draw
//! takes its entropy from the caller's RNG, so a seeded run replays
//! exactly.

use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use simulation_types::{
    DurationDistribution, NodeId, NodeSimulationData, SimulationError, SimulationResult,
};

/// Draws one execution duration
pub trait TimeGenerator: Send + Sync {
    fn generate_time(&self, rng: &mut dyn RngCore) -> SimulationResult<i64>;
}

/// Builds a generator from a node's simulation data
pub trait TimeGeneratorFactory: Send + Sync {
    fn new_time_generator(
        &self,
        node_id: &NodeId,
        data: &NodeSimulationData,
    ) -> SimulationResult<Box<dyn TimeGenerator>>;
}

// ── Generators ───────────────────────────────────────────────────────

/// Always the configured duration
#[derive(Debug, Clone, Copy)]
pub struct ConstantTimeGenerator {
    duration: i64,
}

impl ConstantTimeGenerator {
    pub fn new(duration: i64) -> Self {
        Self { duration }
    }
}

impl TimeGenerator for ConstantTimeGenerator {
    fn generate_time(&self, _rng: &mut dyn RngCore) -> SimulationResult<i64> {
        Ok(self.duration)
    }
}

/// Uniform over an inclusive interval
#[derive(Debug, Clone, Copy)]
pub struct RandomTimeGenerator {
    low: i64,
    high: i64,
}

impl RandomTimeGenerator {
    /// `low <= high` is checked by the factory
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }
}

impl TimeGenerator for RandomTimeGenerator {
    fn generate_time(&self, rng: &mut dyn RngCore) -> SimulationResult<i64> {
        Ok(rng.gen_range(self.low..=self.high))
    }
}

/// Gaussian draws, rounded, negative draws clamped to zero
#[derive(Debug, Clone, Copy)]
pub struct NormalTimeGenerator {
    distribution: Normal<f64>,
}

impl TimeGenerator for NormalTimeGenerator {
    fn generate_time(&self, rng: &mut dyn RngCore) -> SimulationResult<i64> {
        Ok(to_duration(self.distribution.sample(rng)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExponentialTimeGenerator {
    distribution: Exp<f64>,
}

impl TimeGenerator for ExponentialTimeGenerator {
    fn generate_time(&self, rng: &mut dyn RngCore) -> SimulationResult<i64> {
        Ok(to_duration(self.distribution.sample(rng)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PoissonTimeGenerator {
    distribution: Poisson<f64>,
}

impl TimeGenerator for PoissonTimeGenerator {
    fn generate_time(&self, rng: &mut dyn RngCore) -> SimulationResult<i64> {
        Ok(to_duration(self.distribution.sample(rng)))
    }
}

/// Round a continuous draw to a non-negative duration (saturating)
fn to_duration(sample: f64) -> i64 {
    sample.round().max(0.0) as i64
}

// ── Factory ──────────────────────────────────────────────────────────

/// Maps each [`DurationDistribution`] to its generator
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionTimeGeneratorFactory {
    clamp_negative: bool,
}

impl DistributionTimeGeneratorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp a uniform interval's low bound at zero instead of failing
    pub fn with_clamp_negative(mut self, clamp: bool) -> Self {
        self.clamp_negative = clamp;
        self
    }
}

impl TimeGeneratorFactory for DistributionTimeGeneratorFactory {
    fn new_time_generator(
        &self,
        node_id: &NodeId,
        data: &NodeSimulationData,
    ) -> SimulationResult<Box<dyn TimeGenerator>> {
        match data.distribution {
            DurationDistribution::Fixed { duration } => {
                if duration < 0 {
                    return Err(SimulationError::configuration(
                        node_id,
                        format!("duration must not be negative, got {}", duration),
                    ));
                }
                Ok(Box::new(ConstantTimeGenerator::new(duration)))
            }
            DurationDistribution::Uniform { duration, range } => {
                if duration < 0 || range < 0 {
                    return Err(SimulationError::configuration(
                        node_id,
                        format!(
                            "duration and range must not be negative, got {} +/- {}",
                            duration, range
                        ),
                    ));
                }
                let low = if range > duration {
                    if !self.clamp_negative {
                        return Err(SimulationError::configuration(
                            node_id,
                            format!("range {} exceeds duration {}", range, duration),
                        ));
                    }
                    0
                } else {
                    duration - range
                };
                let high = duration.checked_add(range).ok_or_else(|| {
                    SimulationError::configuration(node_id, "duration + range overflows")
                })?;
                Ok(Box::new(RandomTimeGenerator::new(low, high)))
            }
            DurationDistribution::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(SimulationError::configuration(
                        node_id,
                        format!("invalid normal parameters mean={} std_dev={}", mean, std_dev),
                    ));
                }
                let distribution = Normal::new(mean, std_dev)
                    .map_err(|e| SimulationError::configuration(node_id, e.to_string()))?;
                Ok(Box::new(NormalTimeGenerator { distribution }))
            }
            DurationDistribution::Exponential { mean } => {
                if !mean.is_finite() || mean <= 0.0 {
                    return Err(SimulationError::configuration(
                        node_id,
                        format!("exponential mean must be positive, got {}", mean),
                    ));
                }
                let distribution = Exp::new(1.0 / mean)
                    .map_err(|e| SimulationError::configuration(node_id, e.to_string()))?;
                Ok(Box::new(ExponentialTimeGenerator { distribution }))
            }
            DurationDistribution::Poisson { mean } => {
                if !mean.is_finite() || mean <= 0.0 {
                    return Err(SimulationError::configuration(
                        node_id,
                        format!("poisson mean must be positive, got {}", mean),
                    ));
                }
                let distribution = Poisson::new(mean)
                    .map_err(|e| SimulationError::configuration(node_id, e.to_string()))?;
                Ok(Box::new(PoissonTimeGenerator { distribution }))
            }
        }
    }
}
