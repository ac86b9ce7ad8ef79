//! Simulation repository: the raw event log and its aggregates
//!
//! Events are appended in the order they are produced. Aggregation is
//! either incremental (each event is folded as it arrives) or batch
//! (one pass when [`SimulationRepository::aggregate`] is called). Both
//! produce the same buckets for the same event order.

use crate::aggregator::{self, Buckets};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use simulation_types::{
    AggregateKey, AggregatedSimulationEvent, InstanceFailure, ProcessId, ProcessSummary,
    SimulationError, SimulationEvent, SimulationInfo, SimulationResult,
};

/// Name of the per-process summary global
pub const SUMMARY_GLOBAL: &str = "summary";

/// When raw events are folded into buckets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// On demand, via `aggregate()`
    Batch,
    /// As each event is added
    Incremental,
}

impl std::fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationMode::Batch => write!(f, "batch"),
            AggregationMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// A raw event plus the bucket it was folded into (incremental mode only)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event: SimulationEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregateKey>,
}

/// Named cross-bucket results
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobalValue {
    Summary {
        processes: IndexMap<ProcessId, ProcessSummary>,
    },
}

/// Event store for one simulation run
#[derive(Clone, Debug)]
pub struct SimulationRepository {
    mode: AggregationMode,
    events: Vec<StoredEvent>,
    buckets: Buckets,
    /// Set once a batch pass has run
    aggregated: bool,
    globals: IndexMap<String, GlobalValue>,
    info: Option<SimulationInfo>,
    failures: Vec<InstanceFailure>,
}

impl SimulationRepository {
    pub fn new(mode: AggregationMode) -> Self {
        Self {
            mode,
            events: Vec::new(),
            buckets: Buckets::new(),
            aggregated: false,
            globals: IndexMap::new(),
            info: None,
            failures: Vec::new(),
        }
    }

    /// Repository that folds every event as it arrives
    pub fn incremental() -> Self {
        Self::new(AggregationMode::Incremental)
    }

    /// Repository that aggregates on demand
    pub fn batch() -> Self {
        Self::new(AggregationMode::Batch)
    }

    pub fn with_simulation_info(mut self, info: SimulationInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Append an event; in incremental mode fold it right away and
    /// return the bucket it went to
    pub fn add_event(&mut self, event: SimulationEvent) -> Option<AggregateKey> {
        tracing::trace!(
            event = event.kind_name(),
            instance_id = event.instance_id(),
            node_id = ?event.node_id(),
            end_time = event.end_time(),
            "Simulation event added"
        );
        let aggregate = match self.mode {
            AggregationMode::Incremental => Some(aggregator::fold(&mut self.buckets, &event)),
            AggregationMode::Batch => None,
        };
        self.events.push(StoredEvent {
            event,
            aggregate: aggregate.clone(),
        });
        aggregate
    }

    pub fn events(&self) -> &[StoredEvent] {
        &self.events
    }

    /// Raw events in arrival order
    pub fn raw_events(&self) -> impl Iterator<Item = &SimulationEvent> {
        self.events.iter().map(|stored| &stored.event)
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    // ── Aggregation ──────────────────────────────────────────────────

    /// Fold every stored event in one pass. Fails if buckets already
    /// exist (incremental mode, or a previous pass).
    pub fn aggregate(&mut self) -> SimulationResult<usize> {
        if self.aggregated || self.mode == AggregationMode::Incremental {
            return Err(SimulationError::AlreadyAggregated);
        }
        self.buckets = aggregator::fold_all(self.raw_events());
        self.aggregated = true;
        tracing::debug!(
            events = self.events.len(),
            buckets = self.buckets.len(),
            "Simulation events aggregated"
        );
        Ok(self.buckets.len())
    }

    /// Drop every bucket and fold all events again from scratch
    pub fn reaggregate(&mut self) -> usize {
        self.buckets = aggregator::fold_all(self.raw_events());
        if self.mode == AggregationMode::Batch {
            self.aggregated = true;
        }
        self.globals.shift_remove(SUMMARY_GLOBAL);
        tracing::debug!(
            events = self.events.len(),
            buckets = self.buckets.len(),
            "Simulation events re-aggregated"
        );
        self.buckets.len()
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregated || !self.buckets.is_empty()
    }

    /// Buckets in creation order
    pub fn aggregated_events(&self) -> impl Iterator<Item = &AggregatedSimulationEvent> {
        self.buckets.values()
    }

    pub fn aggregated_event(&self, key: &AggregateKey) -> Option<&AggregatedSimulationEvent> {
        self.buckets.get(key)
    }

    pub fn aggregated_event_count(&self) -> usize {
        self.buckets.len()
    }

    // ── Globals ──────────────────────────────────────────────────────

    /// Roll the buckets up per process and store the result under
    /// [`SUMMARY_GLOBAL`]
    pub fn summarize(&mut self) -> &IndexMap<ProcessId, ProcessSummary> {
        let processes = aggregator::summarize(&self.buckets);
        tracing::debug!(processes = processes.len(), "Simulation summary computed");
        let slot = self
            .globals
            .entry(SUMMARY_GLOBAL.to_string())
            .or_insert_with(|| GlobalValue::Summary {
                processes: IndexMap::new(),
            });
        *slot = GlobalValue::Summary { processes };
        let GlobalValue::Summary { processes } = slot;
        processes
    }

    pub fn global(&self, name: &str) -> Option<&GlobalValue> {
        self.globals.get(name)
    }

    /// The stored summary of one process, if `summarize()` has run
    pub fn process_summary(&self, process_id: &ProcessId) -> Option<&ProcessSummary> {
        match self.globals.get(SUMMARY_GLOBAL) {
            Some(GlobalValue::Summary { processes }) => processes.get(process_id),
            None => None,
        }
    }

    // ── Run Information ──────────────────────────────────────────────

    pub fn simulation_info(&self) -> Option<&SimulationInfo> {
        self.info.as_ref()
    }

    pub fn rule_set(&self) -> Option<&str> {
        self.info.as_ref().and_then(|i| i.rule_set.as_deref())
    }

    /// Record the run's observed end time
    pub fn finish(&mut self, end_time: i64) {
        if let Some(info) = self.info.as_mut() {
            info.end_time = info.end_time.max(end_time);
        }
    }

    pub fn record_failure(&mut self, failure: InstanceFailure) {
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[InstanceFailure] {
        &self.failures
    }
}

impl Default for SimulationRepository {
    fn default() -> Self {
        Self::batch()
    }
}
