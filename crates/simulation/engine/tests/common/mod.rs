//! Shared process graphs and setup for the integration tests.

#![allow(dead_code)]

use simulation_engine::SimulationConfig;
use simulation_types::*;
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Seeded configuration with the clock starting at zero.
pub fn make_config() -> SimulationConfig {
    SimulationConfig::new().with_seed(42).with_epoch_ms(0)
}

// ---------------------------------------------------------------------------
// Graphs
// ---------------------------------------------------------------------------

/// start -> end
pub fn make_trivial_process() -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.trivial", "trivial").with_package("defaultPackage");
    graph.add_node(SimNode::start("start")).unwrap();
    graph.add_node(SimNode::end("end")).unwrap();
    graph.add_edge(SimEdge::new("start", "end")).unwrap();
    graph
}

/// start -> gw -(p)-> a -> end, gw -(1-p)-> b -> end
pub fn make_gateway_process(p: f64) -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.gateway", "gateway");
    graph.add_node(SimNode::start("start")).unwrap();
    graph.add_node(SimNode::exclusive_gateway("gw")).unwrap();
    graph
        .add_node(SimNode::activity("a", "Approve").with_simulation(NodeSimulationData::fixed(1_000)))
        .unwrap();
    graph
        .add_node(SimNode::activity("b", "Reject").with_simulation(NodeSimulationData::fixed(2_000)))
        .unwrap();
    graph.add_node(SimNode::end("end")).unwrap();
    graph.add_edge(SimEdge::new("start", "gw")).unwrap();
    graph.add_edge(SimEdge::weighted("gw", "a", p)).unwrap();
    graph.add_edge(SimEdge::weighted("gw", "b", 1.0 - p)).unwrap();
    graph.add_edge(SimEdge::new("a", "end")).unwrap();
    graph.add_edge(SimEdge::new("b", "end")).unwrap();
    graph
}

/// start -> review (user task, 2 h at 50 per hour) -> end
pub fn make_user_task_process() -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.review", "review");
    graph.add_node(SimNode::start("start")).unwrap();
    graph
        .add_node(
            SimNode::user_task("review", "Review Document")
                .with_group("reviewers")
                .with_simulation(
                    NodeSimulationData::fixed(2)
                        .with_time_unit(TimeUnit::Hours)
                        .with_cost_per_time_unit(50.0),
                ),
        )
        .unwrap();
    graph.add_node(SimNode::end("end")).unwrap();
    graph.add_edge(SimEdge::new("start", "review")).unwrap();
    graph.add_edge(SimEdge::new("review", "end")).unwrap();
    graph
}

/// A user task with a timer boundary event taken 25% of the time
pub fn make_boundary_process() -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.escalation", "escalation");
    graph.add_node(SimNode::start("start")).unwrap();
    graph
        .add_node(SimNode::user_task("approve", "Approve").with_simulation(NodeSimulationData::fixed(60)))
        .unwrap();
    graph
        .add_node(
            SimNode::boundary_event("timeout", "Timeout", "approve")
                .with_simulation(NodeSimulationData::fixed(0).with_probability(0.25)),
        )
        .unwrap();
    graph
        .add_node(SimNode::activity("escalate", "Escalate").with_simulation(NodeSimulationData::fixed(10)))
        .unwrap();
    graph.add_node(SimNode::end("done")).unwrap();
    graph.add_node(SimNode::end("escalated")).unwrap();
    graph.add_edge(SimEdge::new("start", "approve")).unwrap();
    graph.add_edge(SimEdge::new("approve", "done")).unwrap();
    graph.add_edge(SimEdge::new("timeout", "escalate")).unwrap();
    graph.add_edge(SimEdge::new("escalate", "escalated")).unwrap();
    graph
}

/// start -> work -> check -(0.9)-> end, check -(0.1)-> work
pub fn make_loop_process() -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.rework", "rework");
    graph.add_node(SimNode::start("start")).unwrap();
    graph
        .add_node(SimNode::activity("work", "Work").with_simulation(NodeSimulationData::fixed(5)))
        .unwrap();
    graph.add_node(SimNode::exclusive_gateway("check")).unwrap();
    graph.add_node(SimNode::end("end")).unwrap();
    graph.add_edge(SimEdge::new("start", "work")).unwrap();
    graph.add_edge(SimEdge::new("work", "check")).unwrap();
    graph.add_edge(SimEdge::weighted("check", "end", 0.9)).unwrap();
    graph.add_edge(SimEdge::weighted("check", "work", 0.1)).unwrap();
    graph
}

/// start -> fork -> (a | b) -> join -> end
pub fn make_parallel_process() -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.parallel", "parallel");
    graph.add_node(SimNode::start("start")).unwrap();
    graph.add_node(SimNode::parallel_gateway("fork")).unwrap();
    graph
        .add_node(SimNode::activity("a", "Ship").with_simulation(NodeSimulationData::fixed(30)))
        .unwrap();
    graph
        .add_node(SimNode::activity("b", "Invoice").with_simulation(NodeSimulationData::fixed(20)))
        .unwrap();
    graph.add_node(SimNode::parallel_gateway("join")).unwrap();
    graph.add_node(SimNode::end("end")).unwrap();
    graph.add_edge(SimEdge::new("start", "fork")).unwrap();
    graph.add_edge(SimEdge::new("fork", "a")).unwrap();
    graph.add_edge(SimEdge::new("fork", "b")).unwrap();
    graph.add_edge(SimEdge::new("a", "join")).unwrap();
    graph.add_edge(SimEdge::new("b", "join")).unwrap();
    graph.add_edge(SimEdge::new("join", "end")).unwrap();
    graph
}

/// Linear process whose middle activity has an invalid uniform range
pub fn make_misconfigured_process() -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.broken", "broken");
    graph.add_node(SimNode::start("start")).unwrap();
    graph
        .add_node(SimNode::activity("ok", "Fine").with_simulation(NodeSimulationData::fixed(10)))
        .unwrap();
    graph
        .add_node(SimNode::activity("bad", "Broken").with_simulation(NodeSimulationData::uniform(5, 50)))
        .unwrap();
    graph.add_node(SimNode::end("end")).unwrap();
    graph.add_edge(SimEdge::new("start", "ok")).unwrap();
    graph.add_edge(SimEdge::new("ok", "bad")).unwrap();
    graph.add_edge(SimEdge::new("bad", "end")).unwrap();
    graph
}

/// n0 -> n1 -> ... -> n{len-1}, every activity taking 1 ms
pub fn make_linear_process(len: usize) -> ProcessGraph {
    let mut graph = ProcessGraph::new("defaultPackage.pipeline", "pipeline");
    graph.add_node(SimNode::start("n0")).unwrap();
    for i in 1..len - 1 {
        graph
            .add_node(SimNode::activity(format!("n{}", i), "step").with_simulation(NodeSimulationData::fixed(1)))
            .unwrap();
    }
    graph.add_node(SimNode::end(format!("n{}", len - 1))).unwrap();
    for i in 0..len - 1 {
        graph
            .add_edge(SimEdge::new(format!("n{}", i), format!("n{}", i + 1)))
            .unwrap();
    }
    graph
}
