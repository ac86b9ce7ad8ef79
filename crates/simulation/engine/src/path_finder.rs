//! Path finder: enumerates every distinct route through a process graph
//!
//! Traversal is depth-first from the start node, following successors in
//! declaration order:
//!
//! - A decision node (exclusive gateway, or any non-parallel node with
//!   more than one successor, boundary events included) fans out into one
//!   path per branch, each weighted by the provider's branch weight.
//! - A parallel fork takes every branch within the same path. Branches run
//!   up to their common join and are combined as a cartesian product, so
//!   decisions nested inside a branch still yield distinct paths.
//! - An edge back to a node already on the path closes a loop. The path
//!   ends there after one pass through the loop body. A loop with no
//!   decision on it can never be left and is reported as a cycle.

use crate::provider::{GraphSimulationDataProvider, SimulationDataProvider};
use simulation_types::{
    BranchDecision, NodeId, NodeKind, ProcessGraph, SimulationError, SimulationPath,
    SimulationResult,
};
use std::collections::HashSet;

/// Default guard on the length of a single path
pub const DEFAULT_MAX_PATH_NODES: usize = 10_000;

/// Enumerate the paths of a graph using the weights embedded in it
pub fn find_paths(graph: &ProcessGraph) -> SimulationResult<Vec<SimulationPath>> {
    let provider = GraphSimulationDataProvider::new(graph, 1e-6)?;
    PathFinder::new(graph, &provider).find_paths()
}

/// A partial route produced while exploring
#[derive(Clone, Debug)]
struct Segment {
    nodes: Vec<NodeId>,
    decisions: Vec<BranchDecision>,
    probability: f64,
    /// Ended by taking a loop-back edge
    loop_back: bool,
    /// Ended by reaching the requested stop node (a parallel join)
    at_stop: bool,
}

impl Segment {
    fn at_stop() -> Self {
        Self {
            nodes: Vec::new(),
            decisions: Vec::new(),
            probability: 1.0,
            loop_back: false,
            at_stop: true,
        }
    }

    fn empty() -> Self {
        Self {
            at_stop: false,
            ..Self::at_stop()
        }
    }

    /// `self` followed by `next`
    fn then(&self, next: &Segment) -> Segment {
        let mut nodes = self.nodes.clone();
        nodes.extend(next.nodes.iter().cloned());
        let mut decisions = self.decisions.clone();
        decisions.extend(next.decisions.iter().cloned());
        Segment {
            nodes,
            decisions,
            probability: self.probability * next.probability,
            loop_back: next.loop_back,
            at_stop: next.at_stop,
        }
    }
}

/// A route being walked: the node about to be visited, the route so far
/// (excluding that node) and every node already on the path
#[derive(Clone)]
struct Frame {
    at: NodeId,
    route: Segment,
    trail: Vec<NodeId>,
    on_trail: HashSet<NodeId>,
}

impl Frame {
    fn new(at: NodeId, trail: &[NodeId]) -> Self {
        Self {
            at,
            route: Segment::empty(),
            trail: trail.to_vec(),
            on_trail: trail.iter().cloned().collect(),
        }
    }

    /// Put `node` on the route and the trail
    fn visit(&mut self, node: NodeId) {
        self.on_trail.insert(node.clone());
        self.trail.push(node.clone());
        self.route.nodes.push(node);
    }

    /// Move on to `next` along the route
    fn advance(mut self, next: NodeId) -> Self {
        self.at = next;
        self
    }

    fn finish(self, loop_back: bool, at_stop: bool) -> Segment {
        Segment {
            loop_back,
            at_stop,
            ..self.route
        }
    }
}

/// Pending traversal work, popped in depth-first order
enum Work {
    Walk(Frame),
    Emit(Segment),
}

/// Outcome of visiting one node
enum Step {
    Advance(Frame),
    Done(Segment),
    Branch(Vec<Work>),
}

/// Enumerates simulation paths
pub struct PathFinder<'a> {
    graph: &'a ProcessGraph,
    provider: &'a dyn SimulationDataProvider,
    max_path_nodes: usize,
}

impl<'a> PathFinder<'a> {
    pub fn new(graph: &'a ProcessGraph, provider: &'a dyn SimulationDataProvider) -> Self {
        Self {
            graph,
            provider,
            max_path_nodes: DEFAULT_MAX_PATH_NODES,
        }
    }

    pub fn with_max_path_nodes(mut self, max: usize) -> Self {
        self.max_path_nodes = max;
        self
    }

    /// Enumerate every path from the start node, in traversal order
    pub fn find_paths(&self) -> SimulationResult<Vec<SimulationPath>> {
        self.graph.validate()?;
        let start = self
            .graph
            .start_node()
            .ok_or_else(|| SimulationError::invalid_graph("Process has no start node"))?;

        let segments = self.explore(&start.id, &[], None)?;
        let paths: Vec<SimulationPath> = segments
            .into_iter()
            .map(|s| SimulationPath::new(s.nodes, s.decisions, s.probability, s.loop_back))
            .collect();

        tracing::debug!(
            process_id = %self.graph.id,
            paths = paths.len(),
            "Paths enumerated"
        );
        for path in &paths {
            tracing::trace!(
                path_id = %path.id,
                nodes = path.len(),
                probability = path.probability,
                terminal = %path.terminal,
                ends_in_loop = path.ends_in_loop,
                "Path found"
            );
        }

        Ok(paths)
    }

    /// Whether a node splits instances between its branches
    fn is_decision(&self, node_id: &NodeId) -> bool {
        match self.graph.get_node(node_id) {
            Some(node) => {
                !matches!(node.kind, NodeKind::ParallelGateway | NodeKind::End)
                    && self.graph.successors(node_id).len() > 1
            }
            None => false,
        }
    }

    /// All routes starting at `from`, given the nodes already on the path.
    ///
    /// Runs off an explicit work stack, so path length is bounded by the
    /// guard and not by the thread stack. Only nested parallel forks
    /// re-enter, once per nesting level.
    fn explore(
        &self,
        from: &NodeId,
        trail: &[NodeId],
        stop: Option<&NodeId>,
    ) -> SimulationResult<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut stack = vec![Work::Walk(Frame::new(from.clone(), trail))];

        while let Some(work) = stack.pop() {
            let mut frame = match work {
                Work::Emit(segment) => {
                    segments.push(segment);
                    continue;
                }
                Work::Walk(frame) => frame,
            };

            // Follow single-successor chains in place; branch points
            // hand their continuations back to the stack.
            loop {
                match self.step(frame, stop)? {
                    Step::Advance(next) => frame = next,
                    Step::Done(segment) => {
                        segments.push(segment);
                        break;
                    }
                    Step::Branch(pending) => {
                        stack.extend(pending.into_iter().rev());
                        break;
                    }
                }
            }
        }

        Ok(segments)
    }

    /// Visit `frame.at` and decide where the route goes next
    fn step(&self, mut frame: Frame, stop: Option<&NodeId>) -> SimulationResult<Step> {
        let at = frame.at.clone();
        if stop == Some(&at) {
            return Ok(Step::Done(frame.finish(false, true)));
        }
        if frame.trail.len() >= self.max_path_nodes {
            return Err(SimulationError::CycleDetected { node_id: at });
        }

        let node = self
            .graph
            .get_node(&at)
            .ok_or_else(|| SimulationError::NodeNotFound(at.clone()))?;
        let successors = self.graph.successors(&at);
        frame.visit(at.clone());

        if node.kind == NodeKind::End || successors.is_empty() {
            return Ok(Step::Done(frame.finish(false, false)));
        }

        if node.kind == NodeKind::ParallelGateway && successors.len() > 1 {
            return self.fork(frame, &successors, stop).map(Step::Branch);
        }

        if successors.len() == 1 {
            let target = successors[0].clone();
            if self.is_loop_back(&frame, &target, stop) {
                self.close_loop(&at, &target, &frame.trail)?;
                return Ok(Step::Done(frame.finish(true, false)));
            }
            return Ok(Step::Advance(frame.advance(target)));
        }

        self.decide(frame, &successors, stop).map(Step::Branch)
    }

    fn is_loop_back(&self, frame: &Frame, target: &NodeId, stop: Option<&NodeId>) -> bool {
        stop != Some(target) && frame.on_trail.contains(target)
    }

    /// One route per branch of a decision node
    fn decide(
        &self,
        frame: Frame,
        successors: &[NodeId],
        stop: Option<&NodeId>,
    ) -> SimulationResult<Vec<Work>> {
        let from = frame.at.clone();
        let uniform = 1.0 / successors.len() as f64;
        let mut pending = Vec::with_capacity(successors.len());
        for target in successors {
            let weight = self.provider.branch_weight(&from, target).unwrap_or(uniform);
            let mut branch = frame.clone();
            branch.route.probability *= weight;
            branch
                .route
                .decisions
                .push(BranchDecision::new(from.clone(), target.clone()));

            if self.is_loop_back(&branch, target, stop) {
                self.close_loop(&from, target, &branch.trail)?;
                pending.push(Work::Emit(branch.finish(true, false)));
            } else {
                pending.push(Work::Walk(branch.advance(target.clone())));
            }
        }
        Ok(pending)
    }

    /// A loop-back from `from` to `target` is only leavable if some node on
    /// the cycle is a decision
    fn close_loop(&self, from: &NodeId, target: &NodeId, trail: &[NodeId]) -> SimulationResult<()> {
        let entry = trail.iter().position(|n| n == target).unwrap_or(0);
        if trail[entry..].iter().any(|n| self.is_decision(n)) {
            tracing::trace!(from = %from, to = %target, "Loop closed");
            Ok(())
        } else {
            Err(SimulationError::CycleDetected {
                node_id: from.clone(),
            })
        }
    }

    /// Take every branch of a parallel fork within the same route, then
    /// carry on from the join
    fn fork(
        &self,
        frame: Frame,
        branches: &[NodeId],
        stop: Option<&NodeId>,
    ) -> SimulationResult<Vec<Work>> {
        let join = self.find_join(&frame.at, branches);

        let mut combined = vec![Segment::at_stop()];
        for branch in branches {
            let routes = match &join {
                Some(join) if branch == join => vec![Segment::at_stop()],
                Some(join) => self.explore(branch, &frame.trail, Some(join))?,
                None => self.explore(branch, &frame.trail, stop)?,
            };
            let mut next = Vec::with_capacity(combined.len() * routes.len());
            for prefix in &combined {
                for route in &routes {
                    let mut joined = prefix.then(route);
                    joined.loop_back = prefix.loop_back || route.loop_back;
                    joined.at_stop = prefix.at_stop && route.at_stop;
                    next.push(joined);
                }
            }
            combined = next;
        }

        let pending = combined
            .into_iter()
            .map(|body| match &join {
                Some(join) if body.at_stop => {
                    let mut continued = frame.clone();
                    for node in &body.nodes {
                        continued.on_trail.insert(node.clone());
                        continued.trail.push(node.clone());
                    }
                    continued.route = continued.route.then(&Segment {
                        at_stop: false,
                        ..body
                    });
                    Work::Walk(continued.advance(join.clone()))
                }
                // Without a join every branch runs to its own end
                None => Work::Emit(frame.route.then(&body)),
                // A branch ended or looped before the join
                Some(_) => Work::Emit(frame.route.then(&Segment {
                    at_stop: false,
                    ..body
                })),
            })
            .collect();
        Ok(pending)
    }

    /// First parallel gateway (breadth-first from the first branch) that
    /// every branch can reach
    fn find_join(&self, fork: &NodeId, branches: &[NodeId]) -> Option<NodeId> {
        let first = branches.first()?;
        let others: Vec<HashSet<NodeId>> = branches[1..]
            .iter()
            .map(|b| self.graph.reachable_from(b).into_iter().collect())
            .collect();

        self.graph
            .reachable_from(first)
            .into_iter()
            .filter(|n| n != fork)
            .filter(|n| {
                self.graph
                    .get_node(n)
                    .map(|node| node.kind == NodeKind::ParallelGateway)
                    .unwrap_or(false)
            })
            .find(|n| others.iter().all(|reachable| reachable.contains(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation_types::{SimEdge, SimNode};

    fn ids(path: &SimulationPath) -> Vec<&str> {
        path.nodes.iter().map(|n| n.as_str()).collect()
    }

    fn make_graph(nodes: Vec<SimNode>, edges: &[(&str, &str, Option<f64>)]) -> ProcessGraph {
        let mut graph = ProcessGraph::new("p", "p");
        for node in nodes {
            graph.add_node(node).unwrap();
        }
        for (source, target, probability) in edges {
            let mut edge = SimEdge::new(*source, *target);
            edge.probability = *probability;
            graph.add_edge(edge).unwrap();
        }
        graph
    }

    #[test]
    fn test_linear_graph_single_path() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::activity("a", "A"),
                SimNode::end("end"),
            ],
            &[("start", "a", None), ("a", "end", None)],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(ids(&paths[0]), vec!["start", "a", "end"]);
        assert_eq!(paths[0].probability, 1.0);
        assert!(paths[0].decisions.is_empty());
    }

    #[test]
    fn test_exclusive_gateway_two_paths() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::exclusive_gateway("gw"),
                SimNode::activity("a", "A"),
                SimNode::activity("b", "B"),
                SimNode::end("end"),
            ],
            &[
                ("start", "gw", None),
                ("gw", "a", Some(0.3)),
                ("gw", "b", Some(0.7)),
                ("a", "end", None),
                ("b", "end", None),
            ],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths[0]), vec!["start", "gw", "a", "end"]);
        assert_eq!(ids(&paths[1]), vec!["start", "gw", "b", "end"]);
        assert!((paths[0].probability - 0.3).abs() < 1e-12);
        assert!((paths[1].probability - 0.7).abs() < 1e-12);
        assert_ne!(paths[0].id, paths[1].id);
    }

    #[test]
    fn test_nested_gateways_probabilities_sum_to_one() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::exclusive_gateway("gw1"),
                SimNode::exclusive_gateway("gw2"),
                SimNode::activity("a", "A"),
                SimNode::activity("b", "B"),
                SimNode::activity("c", "C"),
                SimNode::end("end"),
            ],
            &[
                ("start", "gw1", None),
                ("gw1", "a", Some(0.4)),
                ("gw1", "gw2", Some(0.6)),
                ("gw2", "b", Some(0.5)),
                ("gw2", "c", Some(0.5)),
                ("a", "end", None),
                ("b", "end", None),
                ("c", "end", None),
            ],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 3);
        let total: f64 = paths.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(paths[2].decisions.len(), 2);
    }

    #[test]
    fn test_parallel_fork_single_path() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::parallel_gateway("fork"),
                SimNode::activity("a", "A"),
                SimNode::activity("b", "B"),
                SimNode::parallel_gateway("join"),
                SimNode::end("end"),
            ],
            &[
                ("start", "fork", None),
                ("fork", "a", None),
                ("fork", "b", None),
                ("a", "join", None),
                ("b", "join", None),
                ("join", "end", None),
            ],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(
            ids(&paths[0]),
            vec!["start", "fork", "a", "b", "join", "end"]
        );
        assert_eq!(paths[0].probability, 1.0);
    }

    #[test]
    fn test_decision_inside_parallel_branch() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::parallel_gateway("fork"),
                SimNode::exclusive_gateway("gw"),
                SimNode::activity("a1", "A1"),
                SimNode::activity("a2", "A2"),
                SimNode::activity("b", "B"),
                SimNode::parallel_gateway("join"),
                SimNode::end("end"),
            ],
            &[
                ("start", "fork", None),
                ("fork", "gw", None),
                ("fork", "b", None),
                ("gw", "a1", Some(0.25)),
                ("gw", "a2", Some(0.75)),
                ("a1", "join", None),
                ("a2", "join", None),
                ("b", "join", None),
                ("join", "end", None),
            ],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            ids(&paths[0]),
            vec!["start", "fork", "gw", "a1", "b", "join", "end"]
        );
        assert_eq!(
            ids(&paths[1]),
            vec!["start", "fork", "gw", "a2", "b", "join", "end"]
        );
        assert!((paths[0].probability - 0.25).abs() < 1e-12);
        assert_ne!(paths[0].id, paths[1].id);
    }

    #[test]
    fn test_loop_with_exit_terminates() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::activity("work", "Work"),
                SimNode::exclusive_gateway("check"),
                SimNode::end("end"),
            ],
            &[
                ("start", "work", None),
                ("work", "check", None),
                ("check", "end", Some(0.8)),
                ("check", "work", Some(0.2)),
            ],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths[0]), vec!["start", "work", "check", "end"]);
        assert!(!paths[0].ends_in_loop);
        assert_eq!(ids(&paths[1]), vec!["start", "work", "check"]);
        assert!(paths[1].ends_in_loop);
        assert_eq!(paths[1].terminal, NodeId::new("check"));
        assert!((paths[1].probability - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_loop_back_from_plain_activity() {
        // check -> rework -> work closes the loop at rework
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::activity("work", "Work"),
                SimNode::exclusive_gateway("check"),
                SimNode::activity("rework", "Rework"),
                SimNode::end("end"),
            ],
            &[
                ("start", "work", None),
                ("work", "check", None),
                ("check", "end", None),
                ("check", "rework", None),
                ("rework", "work", None),
            ],
        );
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths[1]), vec!["start", "work", "check", "rework"]);
        assert_eq!(paths[1].terminal, NodeId::new("rework"));
        assert!(paths[1].ends_in_loop);
    }

    #[test]
    fn test_unconditional_cycle_detected() {
        let mut graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::activity("a", "A"),
                SimNode::activity("b", "B"),
                SimNode::end("end"),
            ],
            &[("start", "a", None), ("a", "b", None), ("b", "a", None)],
        );
        // keep `end` reachable so the graph validates
        graph.add_edge(SimEdge::new("start", "end")).unwrap();

        let result = find_paths(&graph);
        assert!(matches!(result, Err(SimulationError::CycleDetected { .. })));
    }

    #[test]
    fn test_path_length_guard() {
        let mut nodes = vec![SimNode::start("n0")];
        let mut edges = Vec::new();
        let names: Vec<String> = (0..20).map(|i| format!("n{}", i)).collect();
        for i in 1..19 {
            nodes.push(SimNode::activity(names[i].clone(), "step"));
        }
        nodes.push(SimNode::end("n19"));
        for i in 0..19 {
            edges.push((names[i].as_str(), names[i + 1].as_str(), None));
        }
        let graph = make_graph(nodes, &edges);
        let provider = GraphSimulationDataProvider::new(&graph, 1e-6).unwrap();

        let result = PathFinder::new(&graph, &provider)
            .with_max_path_nodes(5)
            .find_paths();
        assert!(matches!(result, Err(SimulationError::CycleDetected { .. })));

        let paths = PathFinder::new(&graph, &provider)
            .with_max_path_nodes(20)
            .find_paths()
            .unwrap();
        assert_eq!(paths[0].len(), 20);
    }

    fn make_linear(n: usize) -> ProcessGraph {
        let names: Vec<String> = (0..n).map(|i| format!("n{}", i)).collect();
        let mut nodes = vec![SimNode::start(names[0].clone())];
        for name in &names[1..n - 1] {
            nodes.push(SimNode::activity(name.clone(), "step"));
        }
        nodes.push(SimNode::end(names[n - 1].clone()));
        let edges: Vec<(&str, &str, Option<f64>)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str(), None))
            .collect();
        make_graph(nodes, &edges)
    }

    #[test]
    fn test_deep_linear_graph_single_path() {
        let graph = make_linear(5_000);
        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 5_000);
        assert_eq!(paths[0].probability, 1.0);
        assert_eq!(paths[0].terminal, NodeId::new("n4999"));
    }

    #[test]
    fn test_deep_graph_hits_configured_guard() {
        let graph = make_linear(5_000);
        let provider = GraphSimulationDataProvider::new(&graph, 1e-6).unwrap();
        let result = PathFinder::new(&graph, &provider)
            .with_max_path_nodes(4_000)
            .find_paths();
        assert!(matches!(
            result,
            Err(SimulationError::CycleDetected { node_id }) if node_id == NodeId::new("n4000")
        ));
    }

    #[test]
    fn test_long_branch_keeps_traversal_order() {
        let names: Vec<String> = (1..3_000).map(|i| format!("n{}", i)).collect();
        let mut nodes = vec![SimNode::start("n0"), SimNode::exclusive_gateway("gw")];
        for name in &names[..names.len() - 1] {
            nodes.push(SimNode::activity(name.clone(), "step"));
        }
        nodes.push(SimNode::end("n2999"));
        nodes.push(SimNode::end("short"));

        let mut edges = vec![("n0", "gw", None), ("gw", "n1", None)];
        edges.extend(
            names
                .windows(2)
                .map(|pair| (pair[0].as_str(), pair[1].as_str(), None)),
        );
        edges.push(("gw", "short", None));
        let graph = make_graph(nodes, &edges);

        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].len(), 3_001);
        assert_eq!(paths[0].terminal, NodeId::new("n2999"));
        assert_eq!(ids(&paths[1]), vec!["n0", "gw", "short"]);
        assert!((paths[0].probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_event_branches() {
        let mut graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::user_task("task", "Task"),
                SimNode::end("end"),
                SimNode::end("escalated"),
            ],
            &[("start", "task", None), ("task", "end", None)],
        );
        graph
            .add_node(SimNode::boundary_event("timer", "Timeout", "task"))
            .unwrap();
        graph.add_edge(SimEdge::new("timer", "escalated")).unwrap();

        let paths = find_paths(&graph).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths[0]), vec!["start", "task", "end"]);
        assert_eq!(ids(&paths[1]), vec!["start", "task", "timer", "escalated"]);
    }

    #[test]
    fn test_partial_weights_rejected() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::exclusive_gateway("gw"),
                SimNode::end("a"),
                SimNode::end("b"),
            ],
            &[("start", "gw", None), ("gw", "a", Some(0.4)), ("gw", "b", None)],
        );
        assert!(matches!(
            find_paths(&graph),
            Err(SimulationError::InvalidGraph { .. })
        ));
    }

    #[test]
    fn test_traversal_is_deterministic() {
        let graph = make_graph(
            vec![
                SimNode::start("start"),
                SimNode::exclusive_gateway("gw"),
                SimNode::end("a"),
                SimNode::end("b"),
                SimNode::end("c"),
            ],
            &[
                ("start", "gw", None),
                ("gw", "a", None),
                ("gw", "b", None),
                ("gw", "c", None),
            ],
        );
        let first = find_paths(&graph).unwrap();
        let second = find_paths(&graph).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|p| (p.probability - 1.0 / 3.0).abs() < 1e-12));
    }
}
