//! Simulation data provider: per-node parameters and branch weights
//!
//! The provider is the only place the simulation reads node parameters
//! from. The default provider takes the data embedded in the process
//! graph, applies external overrides, and resolves every decision node's
//! branch weights once, up front.

use indexmap::IndexMap;
use simulation_types::{
    NodeId, NodeKind, NodeSimulationData, ProcessGraph, SimulationError, SimulationPath,
    SimulationResult,
};
use std::collections::HashMap;

/// Read-only access to simulation parameters
pub trait SimulationDataProvider: Send + Sync {
    /// Simulation data for a node, if it has any
    fn simulation_data_for_node(&self, node_id: &NodeId) -> Option<&NodeSimulationData>;

    /// Weight of the branch `node -> target` at a decision node
    fn branch_weight(&self, node_id: &NodeId, target: &NodeId) -> Option<f64>;

    /// Product of the branch weights of every decision on the path
    fn calculate_path_probability(&self, path: &SimulationPath) -> f64 {
        path.decisions
            .iter()
            .map(|d| self.branch_weight(&d.node, &d.target).unwrap_or(0.0))
            .product::<f64>()
            .clamp(0.0, 1.0)
    }
}

/// Provider backed by the data embedded in a process graph
#[derive(Clone, Debug)]
pub struct GraphSimulationDataProvider {
    /// Node data, after overrides
    data: HashMap<NodeId, NodeSimulationData>,
    /// Resolved weights by decision node, in successor order
    weights: HashMap<NodeId, IndexMap<NodeId, f64>>,
}

impl GraphSimulationDataProvider {
    /// Build a provider from the graph's embedded data
    pub fn new(graph: &ProcessGraph, tolerance: f64) -> SimulationResult<Self> {
        Self::with_overrides(graph, HashMap::new(), tolerance)
    }

    /// Build a provider where `overrides` replace the embedded data per node
    pub fn with_overrides(
        graph: &ProcessGraph,
        overrides: HashMap<NodeId, NodeSimulationData>,
        tolerance: f64,
    ) -> SimulationResult<Self> {
        let mut data: HashMap<NodeId, NodeSimulationData> = graph
            .nodes
            .iter()
            .filter_map(|n| n.simulation.clone().map(|d| (n.id.clone(), d)))
            .collect();
        for (node_id, node_data) in overrides {
            if graph.get_node(&node_id).is_none() {
                return Err(SimulationError::NodeNotFound(node_id));
            }
            data.insert(node_id, node_data);
        }

        let mut provider = Self {
            data,
            weights: HashMap::new(),
        };

        for node in &graph.nodes {
            if matches!(node.kind, NodeKind::ParallelGateway | NodeKind::End) {
                continue;
            }
            let successors = graph.successors(&node.id);
            if successors.len() < 2 {
                continue;
            }
            let weights = provider.resolve_weights(graph, &node.id, &successors, tolerance)?;
            tracing::trace!(node_id = %node.id, branches = weights.len(), "Branch weights resolved");
            provider.weights.insert(node.id.clone(), weights);
        }

        Ok(provider)
    }

    /// All resolved weights of a decision node
    pub fn branch_weights(&self, node_id: &NodeId) -> Option<&IndexMap<NodeId, f64>> {
        self.weights.get(node_id)
    }

    /// Number of decision nodes with resolved weights
    pub fn decision_count(&self) -> usize {
        self.weights.len()
    }

    fn resolve_weights(
        &self,
        graph: &ProcessGraph,
        node_id: &NodeId,
        successors: &[NodeId],
        tolerance: f64,
    ) -> SimulationResult<IndexMap<NodeId, f64>> {
        let own = self.data.get(node_id);

        if let Some(own) = own {
            if let Some(stray) = own
                .branch_weights
                .keys()
                .find(|target| !successors.contains(target))
            {
                return Err(SimulationError::invalid_graph(format!(
                    "Branch weight on {} names {}, which is not a successor",
                    node_id, stray
                )));
            }
        }

        // (target, explicit weight, is boundary branch)
        let mut branches: Vec<(NodeId, Option<f64>, bool)> = Vec::with_capacity(successors.len());
        for target in successors {
            let is_boundary = graph
                .get_node(target)
                .map(|n| n.kind == NodeKind::BoundaryEvent && n.attached_to.as_ref() == Some(node_id))
                .unwrap_or(false);
            let weight = if is_boundary {
                self.data.get(target).and_then(|d| d.probability)
            } else {
                own.and_then(|d| d.branch_weights.get(target).copied())
                    .or_else(|| graph.edge(node_id, target).and_then(|e| e.probability))
            };
            if let Some(w) = weight {
                if !w.is_finite() || w < 0.0 {
                    return Err(SimulationError::invalid_graph(format!(
                        "Branch {} -> {} has invalid weight {}",
                        node_id, target, w
                    )));
                }
            }
            branches.push((target.clone(), weight, is_boundary));
        }

        let given = branches.iter().filter(|(_, w, _)| w.is_some()).count();
        let mut resolved = IndexMap::with_capacity(branches.len());

        if given == 0 {
            let share = 1.0 / branches.len() as f64;
            for (target, _, _) in branches {
                resolved.insert(target, share);
            }
            return Ok(resolved);
        }

        if given == branches.len() {
            let sum: f64 = branches.iter().filter_map(|(_, w, _)| *w).sum();
            if (sum - 1.0).abs() > tolerance {
                return Err(SimulationError::invalid_graph(format!(
                    "Branch weights of {} sum to {}, expected 1",
                    node_id, sum
                )));
            }
            for (target, weight, _) in branches {
                resolved.insert(target, weight.unwrap_or(0.0));
            }
            return Ok(resolved);
        }

        // Only boundary weights given: the normal exits share what is left
        let only_boundary = branches
            .iter()
            .all(|(_, w, boundary)| w.is_some() == *boundary);
        if !only_boundary {
            return Err(SimulationError::invalid_graph(format!(
                "Decision node {} has weights on only some of its branches",
                node_id
            )));
        }
        let boundary_sum: f64 = branches.iter().filter_map(|(_, w, _)| *w).sum();
        if boundary_sum > 1.0 + tolerance {
            return Err(SimulationError::invalid_graph(format!(
                "Boundary weights of {} sum to {}, more than 1",
                node_id, boundary_sum
            )));
        }
        let normal = branches.len() - given;
        let share = (1.0 - boundary_sum).max(0.0) / normal as f64;
        for (target, weight, _) in branches {
            resolved.insert(target, weight.unwrap_or(share));
        }
        Ok(resolved)
    }
}

impl SimulationDataProvider for GraphSimulationDataProvider {
    fn simulation_data_for_node(&self, node_id: &NodeId) -> Option<&NodeSimulationData> {
        self.data.get(node_id)
    }

    fn branch_weight(&self, node_id: &NodeId, target: &NodeId) -> Option<f64> {
        self.weights
            .get(node_id)
            .and_then(|w| w.get(target))
            .copied()
    }
}
