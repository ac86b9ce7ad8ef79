//! Process graphs: the structure a simulation walks
//!
//! A ProcessGraph is a directed graph where:
//! - Nodes are activities, gateways and events
//! - Edges are sequence flows, optionally weighted with a branch probability
//!
//! Boundary events are not connected by an incoming edge; they are attached
//! to a host activity and act as an alternative way out of it.
//!
//! Graphs are immutable once validated. The simulation only reads them.

use crate::{NodeSimulationData, SimEdge, SimulationError, SimulationResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

// ── Identifiers ──────────────────────────────────────────────────────

/// Identifier of a process definition
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(pub String);

impl ProcessId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a node within a process graph
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ── Process Graph ────────────────────────────────────────────────────

/// A process model as a directed graph
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessGraph {
    /// Process identifier (e.g. `defaultPackage.review`)
    pub id: ProcessId,
    /// Human-readable name
    pub name: String,
    /// Package the process belongs to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub package: String,
    /// Definition version
    #[serde(default = "default_version")]
    pub version: u32,
    /// Nodes in declaration order
    pub nodes: Vec<SimNode>,
    /// Edges in declaration order; order drives traversal order
    #[serde(default)]
    pub edges: Vec<SimEdge>,
    /// Metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

fn default_version() -> u32 {
    1
}

impl ProcessGraph {
    /// Create an empty process graph
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProcessId::new(id),
            name: name.into(),
            package: String::new(),
            version: default_version(),
            nodes: Vec::new(),
            edges: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: SimNode) -> SimulationResult<()> {
        if self.nodes.iter().any(|n| n.id == node.id) {
            return Err(SimulationError::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Add an edge to the graph
    pub fn add_edge(&mut self, edge: SimEdge) -> SimulationResult<()> {
        if !self.nodes.iter().any(|n| n.id == edge.source) {
            return Err(SimulationError::NodeNotFound(edge.source));
        }
        if !self.nodes.iter().any(|n| n.id == edge.target) {
            return Err(SimulationError::NodeNotFound(edge.target));
        }
        if self.edge(&edge.source, &edge.target).is_some() {
            return Err(SimulationError::DuplicateEdge {
                from: edge.source,
                to: edge.target,
            });
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Get the start node
    pub fn start_node(&self) -> Option<&SimNode> {
        self.nodes.iter().find(|n| n.kind == NodeKind::Start)
    }

    /// Get the end nodes
    pub fn end_nodes(&self) -> Vec<&SimNode> {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::End)
            .collect()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&SimNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Get the edge between two nodes, if any
    pub fn edge(&self, source: &NodeId, target: &NodeId) -> Option<&SimEdge> {
        self.edges
            .iter()
            .find(|e| &e.source == source && &e.target == target)
    }

    /// Get outgoing edges from a node, in declaration order
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&SimEdge> {
        self.edges.iter().filter(|e| &e.source == node_id).collect()
    }

    /// Get incoming edges to a node
    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&SimEdge> {
        self.edges.iter().filter(|e| &e.target == node_id).collect()
    }

    /// Boundary events attached to a host node, in declaration order
    pub fn boundary_events(&self, host: &NodeId) -> Vec<&SimNode> {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::BoundaryEvent && n.attached_to.as_ref() == Some(host))
            .collect()
    }

    /// Every node a token can move to from `node_id`: outgoing edge targets
    /// in declaration order, followed by attached boundary events.
    pub fn successors(&self, node_id: &NodeId) -> Vec<NodeId> {
        let mut successors: Vec<NodeId> = self
            .outgoing_edges(node_id)
            .into_iter()
            .map(|e| e.target.clone())
            .collect();
        successors.extend(self.boundary_events(node_id).into_iter().map(|n| n.id.clone()));
        successors
    }

    /// Validate the graph for structural correctness
    pub fn validate(&self) -> SimulationResult<()> {
        if self.nodes.is_empty() {
            return Err(SimulationError::invalid_graph(
                "Process must have at least one node",
            ));
        }

        let start_count = self
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Start)
            .count();
        if start_count != 1 {
            return Err(SimulationError::invalid_graph(format!(
                "Process must have exactly one start node, found {}",
                start_count
            )));
        }

        if self.end_nodes().is_empty() {
            return Err(SimulationError::invalid_graph("Process has no end node"));
        }

        let mut seen_ids = HashSet::new();
        for node in &self.nodes {
            if !seen_ids.insert(&node.id) {
                return Err(SimulationError::DuplicateNodeId(node.id.clone()));
            }
        }

        for edge in &self.edges {
            if !seen_ids.contains(&edge.source) {
                return Err(SimulationError::NodeNotFound(edge.source.clone()));
            }
            let target = self
                .get_node(&edge.target)
                .ok_or_else(|| SimulationError::NodeNotFound(edge.target.clone()))?;
            if target.kind == NodeKind::Start {
                return Err(SimulationError::invalid_graph(format!(
                    "Edge {} -> {} targets the start node",
                    edge.source, edge.target
                )));
            }
            if target.kind == NodeKind::BoundaryEvent {
                return Err(SimulationError::invalid_graph(format!(
                    "Boundary event {} cannot have incoming edges",
                    edge.target
                )));
            }
        }

        for node in &self.nodes {
            match (&node.kind, &node.attached_to) {
                (NodeKind::BoundaryEvent, Some(host)) => {
                    let host_node = self
                        .get_node(host)
                        .ok_or_else(|| SimulationError::NodeNotFound(host.clone()))?;
                    if !host_node.is_activity() {
                        return Err(SimulationError::invalid_graph(format!(
                            "Boundary event {} is attached to non-activity {}",
                            node.id, host
                        )));
                    }
                }
                (NodeKind::BoundaryEvent, None) => {
                    return Err(SimulationError::invalid_graph(format!(
                        "Boundary event {} is not attached to an activity",
                        node.id
                    )));
                }
                (_, Some(_)) => {
                    return Err(SimulationError::invalid_graph(format!(
                        "Only boundary events can be attached, {} is {}",
                        node.id, node.kind
                    )));
                }
                (_, None) => {}
            }
        }

        if let Some(start) = self.start_node() {
            let reachable = self.reachable_from(&start.id);
            if let Some(island) = self.nodes.iter().find(|n| !reachable.contains(&n.id)) {
                return Err(SimulationError::invalid_graph(format!(
                    "Node {} is unreachable from the start node",
                    island.id
                )));
            }
        }

        Ok(())
    }

    /// Find all nodes reachable from a given node via BFS, in visit order
    pub fn reachable_from(&self, start: &NodeId) -> Vec<NodeId> {
        let mut visited = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(current) = queue.pop_front() {
            if seen.insert(current.clone()) {
                for next in self.successors(&current) {
                    if !seen.contains(&next) {
                        queue.push_back(next);
                    }
                }
                visited.push(current);
            }
        }

        visited
    }

    /// Total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of gateway nodes
    pub fn gateway_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_gateway()).count()
    }
}

// ── Process Node ─────────────────────────────────────────────────────

/// A node in the process graph
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimNode {
    /// Unique identifier within this process
    pub id: NodeId,
    /// Human-readable name
    pub name: String,
    /// Node kind
    pub kind: NodeKind,
    /// Host activity (boundary events only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<NodeId>,
    /// Group a user task is offered to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_group: Option<String>,
    /// Simulation parameters embedded in the definition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<NodeSimulationData>,
    /// Metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl SimNode {
    /// Create a new node
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(id),
            name: name.into(),
            kind,
            attached_to: None,
            assigned_group: None,
            simulation: None,
            metadata: HashMap::new(),
        }
    }

    /// Create a start event
    pub fn start(id: impl Into<String>) -> Self {
        Self::new(id, "Start", NodeKind::Start)
    }

    /// Create an end event
    pub fn end(id: impl Into<String>) -> Self {
        Self::new(id, "End", NodeKind::End)
    }

    /// Create an automated activity (script, service, ...)
    pub fn activity(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::Activity)
    }

    /// Create a user task
    pub fn user_task(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::UserTask)
    }

    /// Create an exclusive (XOR) gateway
    pub fn exclusive_gateway(id: impl Into<String>) -> Self {
        Self::new(id, "Gateway", NodeKind::ExclusiveGateway)
    }

    /// Create a parallel (AND) gateway
    pub fn parallel_gateway(id: impl Into<String>) -> Self {
        Self::new(id, "Gateway", NodeKind::ParallelGateway)
    }

    /// Create an intermediate catching event (timer, message, signal)
    pub fn catch_event(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::IntermediateCatchEvent)
    }

    /// Create an intermediate throwing event
    pub fn throw_event(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, NodeKind::IntermediateThrowEvent)
    }

    /// Create a boundary event attached to a host activity
    pub fn boundary_event(
        id: impl Into<String>,
        name: impl Into<String>,
        host: impl Into<NodeId>,
    ) -> Self {
        let mut node = Self::new(id, name, NodeKind::BoundaryEvent);
        node.attached_to = Some(host.into());
        node
    }

    pub fn with_simulation(mut self, data: NodeSimulationData) -> Self {
        self.simulation = Some(data);
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.assigned_group = Some(group.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if this node is a gateway
    pub fn is_gateway(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::ExclusiveGateway | NodeKind::ParallelGateway
        )
    }

    /// Check if this node performs work (boundary events can attach to it)
    pub fn is_activity(&self) -> bool {
        matches!(self.kind, NodeKind::Activity | NodeKind::UserTask)
    }
}

// ── Node Kind ────────────────────────────────────────────────────────

/// The kind of a process node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The entry point of the process
    Start,
    /// A terminal node; the instance completes when it is reached
    End,
    /// Automated work (script or service task)
    Activity,
    /// Work performed by a person
    UserTask,
    /// Exactly one outgoing branch is taken
    ExclusiveGateway,
    /// Fork: all outgoing branches are taken; join: waits for all
    ParallelGateway,
    /// Waits for a timer, message or signal
    IntermediateCatchEvent,
    /// Emits a message or signal
    IntermediateThrowEvent,
    /// Interrupts its host activity
    BoundaryEvent,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Start => "start event",
            NodeKind::End => "end event",
            NodeKind::Activity => "activity",
            NodeKind::UserTask => "user task",
            NodeKind::ExclusiveGateway => "exclusive gateway",
            NodeKind::ParallelGateway => "parallel gateway",
            NodeKind::IntermediateCatchEvent => "intermediate catch event",
            NodeKind::IntermediateThrowEvent => "intermediate throw event",
            NodeKind::BoundaryEvent => "boundary event",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_simple_process() -> ProcessGraph {
        let mut graph = ProcessGraph::new("defaultPackage.review", "review")
            .with_package("defaultPackage");

        graph.add_node(SimNode::start("start")).unwrap();
        graph
            .add_node(SimNode::user_task("review", "Review Document").with_group("reviewers"))
            .unwrap();
        graph.add_node(SimNode::end("end")).unwrap();

        graph.add_edge(SimEdge::new("start", "review")).unwrap();
        graph.add_edge(SimEdge::new("review", "end")).unwrap();

        graph
    }

    #[test]
    fn test_create_process_graph() {
        let graph = make_simple_process();

        assert_eq!(graph.name, "review");
        assert_eq!(graph.package, "defaultPackage");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.gateway_count(), 0);
        assert!(graph.start_node().is_some());
        assert_eq!(graph.end_nodes().len(), 1);
    }

    #[test]
    fn test_validate_valid_process() {
        assert!(make_simple_process().validate().is_ok());
    }

    #[test]
    fn test_validate_no_start_node() {
        let mut graph = ProcessGraph::new("p", "p");
        graph.add_node(SimNode::activity("a", "Do thing")).unwrap();
        graph.add_node(SimNode::end("end")).unwrap();

        let result = graph.validate();
        assert!(matches!(result, Err(SimulationError::InvalidGraph { .. })));
    }

    #[test]
    fn test_validate_no_end_node() {
        let mut graph = ProcessGraph::new("p", "p");
        graph.add_node(SimNode::start("start")).unwrap();
        graph.add_node(SimNode::activity("a", "Do thing")).unwrap();
        graph.add_edge(SimEdge::new("start", "a")).unwrap();

        assert!(graph.validate().is_err());
    }

    #[test]
    fn test_validate_unreachable_node() {
        let mut graph = ProcessGraph::new("p", "p");
        graph.add_node(SimNode::start("start")).unwrap();
        graph.add_node(SimNode::end("end")).unwrap();
        graph.add_node(SimNode::activity("island", "Island")).unwrap();
        graph.add_edge(SimEdge::new("start", "end")).unwrap();

        let err = graph.validate().unwrap_err();
        assert!(err.to_string().contains("island"));
    }

    #[test]
    fn test_validate_edge_into_start() {
        let mut graph = ProcessGraph::new("p", "p");
        graph.add_node(SimNode::start("start")).unwrap();
        graph.add_node(SimNode::activity("a", "A")).unwrap();
        graph.add_node(SimNode::end("end")).unwrap();
        graph.add_edge(SimEdge::new("start", "a")).unwrap();
        graph.add_edge(SimEdge::new("a", "start")).unwrap();
        graph.add_edge(SimEdge::new("a", "end")).unwrap();

        assert!(matches!(
            graph.validate(),
            Err(SimulationError::InvalidGraph { .. })
        ));
    }

    #[test]
    fn test_boundary_event_is_successor_of_host() {
        let mut graph = make_simple_process();
        graph
            .add_node(SimNode::boundary_event("timeout", "Timeout", "review"))
            .unwrap();
        graph.add_edge(SimEdge::new("timeout", "end")).unwrap();

        assert_eq!(
            graph.successors(&NodeId::new("review")),
            vec![NodeId::new("end"), NodeId::new("timeout")]
        );
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_boundary_event_requires_activity_host() {
        let mut graph = make_simple_process();
        graph
            .add_node(SimNode::boundary_event("timeout", "Timeout", "start"))
            .unwrap();
        graph.add_edge(SimEdge::new("timeout", "end")).unwrap();

        assert!(matches!(
            graph.validate(),
            Err(SimulationError::InvalidGraph { .. })
        ));
    }

    #[test]
    fn test_duplicate_node_id() {
        let mut graph = ProcessGraph::new("p", "p");
        graph.add_node(SimNode::start("start")).unwrap();
        let result = graph.add_node(SimNode::activity("start", "Duplicate"));
        assert!(matches!(result, Err(SimulationError::DuplicateNodeId(_))));
    }

    #[test]
    fn test_duplicate_edge() {
        let mut graph = make_simple_process();
        let result = graph.add_edge(SimEdge::new("start", "review"));
        assert!(matches!(result, Err(SimulationError::DuplicateEdge { .. })));
    }

    #[test]
    fn test_edge_to_nonexistent_node() {
        let mut graph = ProcessGraph::new("p", "p");
        graph.add_node(SimNode::start("start")).unwrap();

        let result = graph.add_edge(SimEdge::new("start", "nonexistent"));
        assert!(matches!(result, Err(SimulationError::NodeNotFound(_))));
    }

    #[test]
    fn test_outgoing_incoming_edges() {
        let graph = make_simple_process();

        let start_out = graph.outgoing_edges(&NodeId::new("start"));
        assert_eq!(start_out.len(), 1);
        assert_eq!(start_out[0].target, NodeId::new("review"));

        let end_in = graph.incoming_edges(&NodeId::new("end"));
        assert_eq!(end_in.len(), 1);
        assert_eq!(end_in[0].source, NodeId::new("review"));
    }

    #[test]
    fn test_reachable_from_is_breadth_first() {
        let graph = make_simple_process();
        let order = graph.reachable_from(&NodeId::new("start"));
        assert_eq!(
            order,
            vec![
                NodeId::new("start"),
                NodeId::new("review"),
                NodeId::new("end")
            ]
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let graph = make_simple_process();
        let json = serde_json::to_string(&graph).unwrap();
        assert!(json.contains("\"kind\":\"user_task\""));

        let parsed: ProcessGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, graph.id);
        assert_eq!(parsed.node_count(), 3);
        assert_eq!(
            parsed.get_node(&NodeId::new("review")).unwrap().assigned_group.as_deref(),
            Some("reviewers")
        );
    }
}
