//! Process Simulation Domain Types
//!
//! A process model is simulated, not executed: every structurally distinct
//! route through the graph is enumerated, simulated instances are spread
//! over those routes, and each visited node "executes" for a sampled
//! duration on a virtual clock.
//!
//! # Key Concepts
//!
//! - **ProcessGraph**: Nodes (activities, gateways, events) and weighted
//!   sequence-flow edges. Immutable once validated.
//! - **NodeSimulationData**: Per-node duration distribution, time unit,
//!   branch weights and resource cost.
//! - **SimulationPath**: One route from the start node to a terminal node,
//!   with the probability of the branch decisions it took.
//! - **SimulationEvent**: A raw timing record emitted while an instance
//!   walks its path.
//! - **AggregatedSimulationEvent**: A running statistics bucket keyed by
//!   activity, terminal node or process.
//! - **SimulationInfo**: The summary of one simulation run.

#![deny(unsafe_code)]

mod aggregate;
mod data;
mod edge;
mod errors;
mod event;
mod graph;
mod info;
mod path;

pub use aggregate::*;
pub use data::*;
pub use edge::*;
pub use errors::*;
pub use event::*;
pub use graph::*;
pub use info::*;
pub use path::*;
