//! Simulation paths: enumerated routes through a process graph

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Content-derived path identifier (`Path-` + 16 hex chars, 64 bits of the digest)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(pub String);

impl PathId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the id from a node sequence and the decisions taken along it.
    ///
    /// Decisions are part of the digest because two routes through a
    /// parallel fork can visit the same nodes yet differ in what they chose.
    pub fn from_parts(nodes: &[NodeId], decisions: &[BranchDecision]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for node in nodes {
            hasher.update(node.as_str().as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&[0xff]);
        for decision in decisions {
            hasher.update(decision.node.as_str().as_bytes());
            hasher.update(&[0]);
            hasher.update(decision.target.as_str().as_bytes());
            hasher.update(&[0]);
        }
        let hex = hasher.finalize().to_hex();
        Self(format!("Path-{}", &hex.as_str()[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PathId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A branch taken at a decision node
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchDecision {
    pub node: NodeId,
    pub target: NodeId,
}

impl BranchDecision {
    pub fn new(node: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            node: node.into(),
            target: target.into(),
        }
    }
}

/// One route from the start node to a terminal node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    pub id: PathId,
    /// Visited nodes in walk order, start node first
    pub nodes: Vec<NodeId>,
    /// Branch decisions in the order they were taken
    pub decisions: Vec<BranchDecision>,
    /// Product of the chosen branch weights
    pub probability: f64,
    /// Last node of the path (end event, dead end or loop-back source)
    pub terminal: NodeId,
    /// The path stops at a loop-back edge rather than an end node
    pub ends_in_loop: bool,
}

impl SimulationPath {
    pub fn new(
        nodes: Vec<NodeId>,
        decisions: Vec<BranchDecision>,
        probability: f64,
        ends_in_loop: bool,
    ) -> Self {
        let id = PathId::from_parts(&nodes, &decisions);
        let terminal = nodes.last().cloned().unwrap_or_default();
        Self {
            id,
            nodes,
            decisions,
            probability,
            terminal,
            ends_in_loop,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }
}
