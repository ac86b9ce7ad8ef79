//! Aggregated simulation statistics
//!
//! Raw events are folded into buckets keyed by activity, terminal node
//! or process. Buckets are created on the first matching event and only
//! ever updated afterwards.

use crate::{NodeId, PathId, ProcessId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Bucket Keys ──────────────────────────────────────────────────────

/// Identity of an aggregation bucket
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateKey {
    Activity {
        process_id: ProcessId,
        node_id: NodeId,
    },
    EndEvent {
        process_id: ProcessId,
        node_id: NodeId,
    },
    Process {
        process_id: ProcessId,
    },
}

impl AggregateKey {
    pub fn activity(process_id: &ProcessId, node_id: &NodeId) -> Self {
        AggregateKey::Activity {
            process_id: process_id.clone(),
            node_id: node_id.clone(),
        }
    }

    pub fn end_event(process_id: &ProcessId, node_id: &NodeId) -> Self {
        AggregateKey::EndEvent {
            process_id: process_id.clone(),
            node_id: node_id.clone(),
        }
    }

    pub fn process(process_id: &ProcessId) -> Self {
        AggregateKey::Process {
            process_id: process_id.clone(),
        }
    }

    pub fn process_id(&self) -> &ProcessId {
        match self {
            AggregateKey::Activity { process_id, .. }
            | AggregateKey::EndEvent { process_id, .. }
            | AggregateKey::Process { process_id } => process_id,
        }
    }
}

impl std::fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateKey::Activity {
                process_id,
                node_id,
            } => write!(f, "activity:{}/{}", process_id, node_id),
            AggregateKey::EndEvent {
                process_id,
                node_id,
            } => write!(f, "end:{}/{}", process_id, node_id),
            AggregateKey::Process { process_id } => write!(f, "process:{}", process_id),
        }
    }
}

// ── Running Statistics ───────────────────────────────────────────────

/// Running min / max / mean over a stream of observations
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub count: u64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one observation in
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.avg += (value - self.avg) / self.count as f64;
    }

    /// Combine two sets of stats; the mean is weighted by count
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let total = self.count + other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.avg = (self.avg * self.count as f64 + other.avg * other.count as f64) / total as f64;
        self.count = total;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

// ── Buckets ──────────────────────────────────────────────────────────

/// Statistics for one activity (or user task) of a process
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedActivity {
    pub process_id: ProcessId,
    pub node_id: NodeId,
    pub node_name: String,
    /// Execution time in milliseconds
    pub execution_time: RunningStats,
    /// Resource cost; present for user tasks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_cost: Option<RunningStats>,
}

/// Statistics for process instances finishing at one terminal node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEndEvent {
    pub process_id: ProcessId,
    pub node_id: NodeId,
    pub node_name: String,
    /// Start-to-end instance duration in milliseconds
    pub process_duration: RunningStats,
}

/// Instance counts for a whole process
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregatedProcess {
    pub process_id: ProcessId,
    pub total_instances: u64,
    /// Completed instances per path, in first-seen order
    pub path_instances: IndexMap<PathId, u64>,
}

impl AggregatedProcess {
    pub fn new(process_id: ProcessId) -> Self {
        Self {
            process_id,
            total_instances: 0,
            path_instances: IndexMap::new(),
        }
    }

    pub fn record_instance(&mut self, path_id: &PathId) {
        self.total_instances += 1;
        *self.path_instances.entry(path_id.clone()).or_insert(0) += 1;
    }

    pub fn instances_of(&self, path_id: &PathId) -> u64 {
        self.path_instances.get(path_id).copied().unwrap_or(0)
    }
}

/// A running statistics bucket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregatedSimulationEvent {
    Activity(AggregatedActivity),
    EndEvent(AggregatedEndEvent),
    Process(AggregatedProcess),
}

impl AggregatedSimulationEvent {
    pub fn key(&self) -> AggregateKey {
        match self {
            AggregatedSimulationEvent::Activity(a) => {
                AggregateKey::activity(&a.process_id, &a.node_id)
            }
            AggregatedSimulationEvent::EndEvent(e) => {
                AggregateKey::end_event(&e.process_id, &e.node_id)
            }
            AggregatedSimulationEvent::Process(p) => AggregateKey::process(&p.process_id),
        }
    }

    pub fn as_activity(&self) -> Option<&AggregatedActivity> {
        match self {
            AggregatedSimulationEvent::Activity(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_end_event(&self) -> Option<&AggregatedEndEvent> {
        match self {
            AggregatedSimulationEvent::EndEvent(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_process(&self) -> Option<&AggregatedProcess> {
        match self {
            AggregatedSimulationEvent::Process(p) => Some(p),
            _ => None,
        }
    }
}

// ── Summary ──────────────────────────────────────────────────────────

/// Second-level roll-up of every bucket belonging to one process
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub process_id: ProcessId,
    pub total_instances: u64,
    pub path_instances: IndexMap<PathId, u64>,
    /// Instance duration across all terminal nodes
    pub process_duration: RunningStats,
    /// Distinct activities executed
    pub activity_count: usize,
    /// Activity with the highest mean execution time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slowest_activity: Option<NodeId>,
}

impl ProcessSummary {
    pub fn new(process_id: ProcessId) -> Self {
        Self {
            process_id,
            total_instances: 0,
            path_instances: IndexMap::new(),
            process_duration: RunningStats::new(),
            activity_count: 0,
            slowest_activity: None,
        }
    }
}
