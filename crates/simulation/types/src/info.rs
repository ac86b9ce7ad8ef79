//! Run-level information: what was simulated and when

use crate::{NodeId, PathId, ProcessId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a simulation run
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationRunId(pub String);

impl SimulationRunId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SimulationRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of one simulation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationInfo {
    pub run_id: SimulationRunId,
    pub process_id: ProcessId,
    pub process_name: String,
    /// Instances requested (not necessarily simulated, see path allocation)
    pub number_of_executions: u32,
    /// Milliseconds between consecutive instance starts on one path
    pub interval: i64,
    /// Name of the aggregation rule set; recorded, never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set: Option<String>,
    /// Virtual time the run started at (ms)
    pub start_time: i64,
    /// Latest end time of any simulated node (ms)
    pub end_time: i64,
}

impl SimulationInfo {
    pub fn new(
        process_id: ProcessId,
        process_name: impl Into<String>,
        number_of_executions: u32,
        interval: i64,
    ) -> Self {
        Self {
            run_id: SimulationRunId::generate(),
            process_id,
            process_name: process_name.into(),
            number_of_executions,
            interval,
            rule_set: None,
            start_time: 0,
            end_time: 0,
        }
    }

    pub fn with_rule_set(mut self, rule_set: Option<String>) -> Self {
        self.rule_set = rule_set;
        self
    }

    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = start_time;
        self.end_time = start_time;
        self
    }

    /// Simulated wall time covered by the run
    pub fn elapsed(&self) -> i64 {
        self.end_time - self.start_time
    }

    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.start_time)
    }

    pub fn end_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.end_time)
    }
}

/// An instance walk that was abandoned in non-strict mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceFailure {
    pub path_id: PathId,
    /// Index of the instance within its path (0-based)
    pub instance_index: u32,
    pub instance_id: u64,
    pub node_id: NodeId,
    pub message: String,
}
