//! Error types for process simulation

use crate::{NodeId, PathId};

/// Errors that can occur while enumerating paths, simulating or aggregating
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Invalid process graph: {reason}")]
    InvalidGraph { reason: String },

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Duplicate node ID: {0}")]
    DuplicateNodeId(NodeId),

    #[error("Duplicate edge: {from} -> {to}")]
    DuplicateEdge { from: NodeId, to: NodeId },

    #[error("Cycle detected in process graph at node {node_id}")]
    CycleDetected { node_id: NodeId },

    #[error("Invalid duration: {duration}")]
    InvalidDuration { duration: i64 },

    #[error("Invalid simulation data for node {node_id}: {reason}")]
    Configuration { node_id: NodeId, reason: String },

    #[error("Instance {instance_index} of {path_id} failed at node {node_id}: {source}")]
    InstanceFailed {
        path_id: PathId,
        instance_index: u32,
        node_id: NodeId,
        source: Box<SimulationError>,
    },

    #[error("Simulation events already aggregated")]
    AlreadyAggregated,

    #[error("Process not found in definition: {0}")]
    ProcessNotFound(String),

    #[error("Process definition error: {0}")]
    Definition(String),

    #[error("Invalid simulation config: {0}")]
    InvalidConfig(String),
}

impl SimulationError {
    /// Shorthand for an [`SimulationError::InvalidGraph`] error
    pub fn invalid_graph(reason: impl Into<String>) -> Self {
        Self::InvalidGraph {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SimulationError::Configuration`] error
    pub fn configuration(node_id: &NodeId, reason: impl Into<String>) -> Self {
        Self::Configuration {
            node_id: node_id.clone(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(e: std::io::Error) -> Self {
        SimulationError::InvalidConfig(e.to_string())
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(e: serde_json::Error) -> Self {
        SimulationError::Definition(e.to_string())
    }
}

/// Result type alias for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;
