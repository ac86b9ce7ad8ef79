//! Simulation context: everything one run shares across instance walks
//!
//! The context owns the virtual clock, the running maximum end time and
//! the seeded RNG. It borrows the data provider and the sampler factory.
//! It is threaded through every walk by `&mut`.

use crate::clock::SimulationClock;
use crate::provider::SimulationDataProvider;
use crate::sampler::TimeGeneratorFactory;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use simulation_types::{SimNode, SimulationResult, TimeUnit};

/// A sampled node duration, in the node's own time unit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampledDuration {
    pub duration: i64,
    pub unit: TimeUnit,
}

impl SampledDuration {
    pub fn zero() -> Self {
        Self {
            duration: 0,
            unit: TimeUnit::Milliseconds,
        }
    }
}

pub struct SimulationContext<'a> {
    clock: SimulationClock,
    max_end_time: i64,
    provider: &'a dyn SimulationDataProvider,
    factory: &'a dyn TimeGeneratorFactory,
    rng: ChaCha8Rng,
}

impl<'a> SimulationContext<'a> {
    /// Create a context whose clock stands at `epoch`.
    ///
    /// `seed` makes every draw reproducible; `None` seeds from entropy.
    pub fn new(
        epoch: i64,
        provider: &'a dyn SimulationDataProvider,
        factory: &'a dyn TimeGeneratorFactory,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            clock: SimulationClock::new(epoch),
            max_end_time: epoch,
            provider,
            factory,
            rng,
        }
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn current_time(&self) -> i64 {
        self.clock.current_time()
    }

    pub fn advance_time(&mut self, duration: i64, unit: TimeUnit) -> SimulationResult<i64> {
        self.clock.advance_time(duration, unit)
    }

    pub fn advance_to(&mut self, time: i64) -> i64 {
        self.clock.advance_to(time)
    }

    /// Raise the maximum end time; lower values are ignored
    pub fn set_max_end_time(&mut self, time: i64) {
        self.max_end_time = self.max_end_time.max(time);
    }

    pub fn max_end_time(&self) -> i64 {
        self.max_end_time
    }

    pub fn data_provider(&self) -> &dyn SimulationDataProvider {
        self.provider
    }

    /// Draw an execution duration for `node`. Nodes without simulation
    /// data take no time.
    pub fn sample_duration(&mut self, node: &SimNode) -> SimulationResult<SampledDuration> {
        let provider = self.provider;
        let data = match provider.simulation_data_for_node(&node.id) {
            Some(data) => data,
            None => {
                tracing::trace!(node_id = %node.id, "No simulation data, zero duration");
                return Ok(SampledDuration::zero());
            }
        };
        let generator = self.factory.new_time_generator(&node.id, data)?;
        let duration = generator.generate_time(&mut self.rng)?;
        Ok(SampledDuration {
            duration,
            unit: data.time_unit,
        })
    }
}
