//! Process definition loading
//!
//! Foreign formats plug in behind [`ProcessDefinitionLoader`]. The
//! built-in loader reads the serialized [`ProcessGraph`] model as JSON,
//! either a single graph or an array of graphs.

use serde::Deserialize;
use simulation_types::{ProcessGraph, SimulationError, SimulationResult};

/// Turns a definition source into process graphs
pub trait ProcessDefinitionLoader: Send + Sync {
    /// Every process defined in `source`
    fn load(&self, source: &str) -> SimulationResult<Vec<ProcessGraph>>;

    /// The process with id `process_id`
    fn load_process(&self, source: &str, process_id: &str) -> SimulationResult<ProcessGraph> {
        self.load(source)?
            .into_iter()
            .find(|graph| graph.id.as_str() == process_id)
            .ok_or_else(|| SimulationError::ProcessNotFound(process_id.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Many(Vec<ProcessGraph>),
    One(Box<ProcessGraph>),
}

/// Loads graphs serialized with `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDefinitionLoader;

impl JsonDefinitionLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessDefinitionLoader for JsonDefinitionLoader {
    fn load(&self, source: &str) -> SimulationResult<Vec<ProcessGraph>> {
        let graphs = match serde_json::from_str::<JsonDocument>(source)? {
            JsonDocument::Many(graphs) => graphs,
            JsonDocument::One(graph) => vec![*graph],
        };
        if graphs.is_empty() {
            return Err(SimulationError::Definition(
                "definition contains no process".into(),
            ));
        }
        tracing::debug!(processes = graphs.len(), "Process definitions loaded");
        Ok(graphs)
    }
}
