//! Virtual clock
//!
//! Simulated time in milliseconds. It only moves when told to and never
//! moves backward.

use simulation_types::{SimulationError, SimulationResult, TimeUnit};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationClock {
    epoch: i64,
    current: i64,
}

impl SimulationClock {
    /// A clock standing at `epoch`
    pub fn new(epoch: i64) -> Self {
        Self {
            epoch,
            current: epoch,
        }
    }

    pub fn current_time(&self) -> i64 {
        self.current
    }

    pub fn epoch(&self) -> i64 {
        self.epoch
    }

    /// Time elapsed since the epoch
    pub fn elapsed(&self) -> i64 {
        self.current - self.epoch
    }

    /// Move forward by `duration` units; returns the new time
    pub fn advance_time(&mut self, duration: i64, unit: TimeUnit) -> SimulationResult<i64> {
        if duration < 0 {
            return Err(SimulationError::InvalidDuration { duration });
        }
        let millis = unit
            .to_millis(duration)
            .ok_or(SimulationError::InvalidDuration { duration })?;
        self.current = self
            .current
            .checked_add(millis)
            .ok_or(SimulationError::InvalidDuration { duration })?;
        Ok(self.current)
    }

    /// Move to `time` if it is later than now; returns the new time
    pub fn advance_to(&mut self, time: i64) -> i64 {
        if time > self.current {
            self.current = time;
        }
        self.current
    }
}
