//! Raw simulation events
//!
//! Every node an instance visits produces one event. Times are virtual
//! clock milliseconds.

use crate::{NodeId, PathId, ProcessId};
use serde::{Deserialize, Serialize};

/// Timing of one node execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub process_id: ProcessId,
    /// Process instance id, unique within a run (starts at 1)
    pub instance_id: u64,
    pub path_id: PathId,
    pub node_name: String,
    pub node_id: NodeId,
    /// Execution time in milliseconds
    pub duration: i64,
    pub start_time: i64,
    pub end_time: i64,
}

/// A user task execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HumanTaskRecord {
    pub activity: ActivityRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_group: Option<String>,
    /// `cost_per_time_unit` times the duration in the node's time unit
    pub resource_cost: f64,
}

/// A terminal node reached
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndRecord {
    pub activity: ActivityRecord,
    pub process_start_time: i64,
}

impl EndRecord {
    /// Elapsed time from instance start to this terminal node
    pub fn process_duration(&self) -> i64 {
        self.activity.end_time - self.process_start_time
    }
}

/// Completion of a whole process instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceEndRecord {
    pub process_id: ProcessId,
    pub instance_id: u64,
    pub path_id: PathId,
    pub process_start_time: i64,
    pub end_time: i64,
}

/// A raw simulation event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationEvent {
    Activity(ActivityRecord),
    HumanTask(HumanTaskRecord),
    End(EndRecord),
    ProcessInstanceEnd(InstanceEndRecord),
}

impl SimulationEvent {
    /// The node execution this event records, if it is a node event
    pub fn activity(&self) -> Option<&ActivityRecord> {
        match self {
            SimulationEvent::Activity(a) => Some(a),
            SimulationEvent::HumanTask(h) => Some(&h.activity),
            SimulationEvent::End(e) => Some(&e.activity),
            SimulationEvent::ProcessInstanceEnd(_) => None,
        }
    }

    pub fn process_id(&self) -> &ProcessId {
        match self {
            SimulationEvent::Activity(a) => &a.process_id,
            SimulationEvent::HumanTask(h) => &h.activity.process_id,
            SimulationEvent::End(e) => &e.activity.process_id,
            SimulationEvent::ProcessInstanceEnd(p) => &p.process_id,
        }
    }

    pub fn instance_id(&self) -> u64 {
        match self {
            SimulationEvent::Activity(a) => a.instance_id,
            SimulationEvent::HumanTask(h) => h.activity.instance_id,
            SimulationEvent::End(e) => e.activity.instance_id,
            SimulationEvent::ProcessInstanceEnd(p) => p.instance_id,
        }
    }

    pub fn path_id(&self) -> &PathId {
        match self {
            SimulationEvent::Activity(a) => &a.path_id,
            SimulationEvent::HumanTask(h) => &h.activity.path_id,
            SimulationEvent::End(e) => &e.activity.path_id,
            SimulationEvent::ProcessInstanceEnd(p) => &p.path_id,
        }
    }

    /// Node the event happened at (`None` for instance completion)
    pub fn node_id(&self) -> Option<&NodeId> {
        self.activity().map(|a| &a.node_id)
    }

    pub fn end_time(&self) -> i64 {
        match self {
            SimulationEvent::ProcessInstanceEnd(p) => p.end_time,
            SimulationEvent::Activity(a) => a.end_time,
            SimulationEvent::HumanTask(h) => h.activity.end_time,
            SimulationEvent::End(e) => e.activity.end_time,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SimulationEvent::Activity(_) => "activity",
            SimulationEvent::HumanTask(_) => "human_task",
            SimulationEvent::End(_) => "end",
            SimulationEvent::ProcessInstanceEnd(_) => "process_instance_end",
        }
    }
}
