//! Process Simulation Engine
//!
//! Estimates how a business process behaves at run time without running
//! it. Every route through the process graph is enumerated, a requested
//! number of instances is spread over those routes by branch probability,
//! and each instance walks its route on a virtual clock while every node
//! "executes" for a sampled duration.
//!
//! # Architecture
//!
//! The [`SimulationRunner`] composes specialized components:
//!
//! - [`ProcessDefinitionLoader`]: Turns a definition source into graphs
//! - [`SimulationDataProvider`]: Per-node parameters and branch weights
//! - [`PathFinder`]: Enumerates paths with their probabilities
//! - [`TimeGeneratorFactory`]: Builds duration samplers from node data
//! - [`SimulationContext`]: Virtual clock, max end time and seeded RNG
//! - [`SimulationRepository`]: Raw event log, aggregates and summaries
//!
//! # Example
//!
//! ```rust
//! use simulation_engine::{SimulationConfig, SimulationRequest, SimulationRunner};
//! use simulation_types::*;
//!
//! let mut graph = ProcessGraph::new("defaultPackage.review", "review");
//! graph.add_node(SimNode::start("start")).unwrap();
//! graph
//!     .add_node(SimNode::user_task("review", "Review").with_simulation(NodeSimulationData::fixed(30)))
//!     .unwrap();
//! graph.add_node(SimNode::end("end")).unwrap();
//! graph.add_edge(SimEdge::new("start", "review")).unwrap();
//! graph.add_edge(SimEdge::new("review", "end")).unwrap();
//!
//! let runner = SimulationRunner::new(SimulationConfig::new().with_seed(7).with_epoch_ms(0));
//! let request = SimulationRequest::new("defaultPackage.review", 5, 1_000);
//! let mut repository = runner.run_graph(&graph, &request).unwrap();
//!
//! repository.aggregate().unwrap();
//! let summary = &repository.summarize()[&graph.id];
//! assert_eq!(summary.total_instances, 5);
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod context;
pub mod loader;
pub mod path_finder;
pub mod provider;
pub mod repository;
pub mod runner;
pub mod sampler;

// Re-export main types
pub use clock::SimulationClock;
pub use config::SimulationConfig;
pub use context::{SampledDuration, SimulationContext};
pub use loader::{JsonDefinitionLoader, ProcessDefinitionLoader};
pub use path_finder::{find_paths, PathFinder};
pub use provider::{GraphSimulationDataProvider, SimulationDataProvider};
pub use repository::{AggregationMode, GlobalValue, SimulationRepository, StoredEvent, SUMMARY_GLOBAL};
pub use runner::{distribute_instances, run_simulation, SimulationRequest, SimulationRunner};
pub use sampler::{
    ConstantTimeGenerator, DistributionTimeGeneratorFactory, RandomTimeGenerator, TimeGenerator,
    TimeGeneratorFactory,
};
