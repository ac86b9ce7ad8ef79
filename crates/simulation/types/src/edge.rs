//! Sequence flows between process nodes
//!
//! An edge may carry a branch probability. When the source node is a
//! decision point, the probabilities of its outgoing edges say how
//! simulated instances are split between the branches.

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// A sequence flow in the process graph
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimEdge {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Branch probability in `[0, 1]` when leaving a decision node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    /// Human-readable label for this flow
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl SimEdge {
    /// Create an unweighted edge
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            probability: None,
            label: String::new(),
        }
    }

    /// Create an edge carrying a branch probability
    pub fn weighted(source: impl Into<NodeId>, target: impl Into<NodeId>, probability: f64) -> Self {
        Self::new(source, target).with_probability(probability)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }
}
