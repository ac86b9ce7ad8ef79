//! Simulation runner: the entry point of the engine
//!
//! A run:
//! 1. Loads and validates the process graph
//! 2. Enumerates its paths
//! 3. Spreads the requested instances over the paths (truncating)
//! 4. Walks every instance node by node on the virtual clock
//! 5. Returns the repository holding the events and run information
//!
//! Instances never branch at run time: each one is forced down the path
//! it was allocated to, so no conditions are evaluated.

use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::loader::{JsonDefinitionLoader, ProcessDefinitionLoader};
use crate::path_finder::PathFinder;
use crate::provider::{GraphSimulationDataProvider, SimulationDataProvider};
use crate::repository::{AggregationMode, SimulationRepository};
use crate::sampler::{DistributionTimeGeneratorFactory, TimeGeneratorFactory};
use simulation_types::*;
use std::collections::HashMap;

/// Parameters of one simulation run
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationRequest {
    pub process_id: String,
    pub number_of_instances: u32,
    /// Milliseconds between consecutive starts on the same path
    pub step_interval_ms: i64,
    /// Aggregate each event as it is produced instead of on demand
    pub run_rules_on_every_event: bool,
    /// Recorded in the run information, never interpreted
    pub aggregation_rule_set: Option<String>,
}

impl SimulationRequest {
    pub fn new(process_id: impl Into<String>, number_of_instances: u32, step_interval_ms: i64) -> Self {
        Self {
            process_id: process_id.into(),
            number_of_instances,
            step_interval_ms,
            run_rules_on_every_event: false,
            aggregation_rule_set: None,
        }
    }

    pub fn with_incremental_aggregation(mut self, incremental: bool) -> Self {
        self.run_rules_on_every_event = incremental;
        self
    }

    pub fn with_rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.aggregation_rule_set = Some(rule_set.into());
        self
    }

    pub fn aggregation_mode(&self) -> AggregationMode {
        if self.run_rules_on_every_event {
            AggregationMode::Incremental
        } else {
            AggregationMode::Batch
        }
    }
}

/// One scheduled instance walk
#[derive(Clone, Copy, Debug)]
struct ScheduledInstance {
    path_index: usize,
    instance_index: u32,
    start: i64,
}

/// A walk that stopped at a node
#[derive(Debug)]
struct WalkError {
    node_id: NodeId,
    source: SimulationError,
}

impl WalkError {
    fn at(node_id: &NodeId) -> impl FnOnce(SimulationError) -> WalkError + '_ {
        move |source| WalkError {
            node_id: node_id.clone(),
            source,
        }
    }
}

/// Runs process simulations
pub struct SimulationRunner {
    config: SimulationConfig,
    loader: Box<dyn ProcessDefinitionLoader>,
    factory: Box<dyn TimeGeneratorFactory>,
    overrides: HashMap<NodeId, NodeSimulationData>,
}

impl SimulationRunner {
    /// Runner with the JSON loader and the distribution sampler
    pub fn new(config: SimulationConfig) -> Self {
        let factory = DistributionTimeGeneratorFactory::new()
            .with_clamp_negative(config.clamp_negative_durations);
        Self {
            config,
            loader: Box::new(JsonDefinitionLoader::new()),
            factory: Box::new(factory),
            overrides: HashMap::new(),
        }
    }

    pub fn with_loader(mut self, loader: impl ProcessDefinitionLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_time_generator_factory(mut self, factory: impl TimeGeneratorFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Replace the embedded simulation data of one node
    pub fn with_node_data(mut self, node_id: impl Into<NodeId>, data: NodeSimulationData) -> Self {
        self.overrides.insert(node_id.into(), data);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Load `process_id` from `definition_source` and simulate it
    pub fn run_simulation(
        &self,
        process_id: &str,
        definition_source: &str,
        number_of_instances: u32,
        step_interval_ms: i64,
        run_rules_on_every_event: bool,
        aggregation_rule_set: Option<&str>,
    ) -> SimulationResult<SimulationRepository> {
        let mut request = SimulationRequest::new(process_id, number_of_instances, step_interval_ms)
            .with_incremental_aggregation(run_rules_on_every_event);
        request.aggregation_rule_set = aggregation_rule_set.map(str::to_string);

        let graph = self.loader.load_process(definition_source, process_id)?;
        self.run_graph(&graph, &request)
    }

    /// Simulate an already loaded graph
    pub fn run_graph(
        &self,
        graph: &ProcessGraph,
        request: &SimulationRequest,
    ) -> SimulationResult<SimulationRepository> {
        self.config.validate()?;
        if graph.id.as_str() != request.process_id {
            return Err(SimulationError::ProcessNotFound(request.process_id.clone()));
        }
        if request.step_interval_ms < 0 {
            return Err(SimulationError::InvalidDuration {
                duration: request.step_interval_ms,
            });
        }
        graph.validate()?;

        let provider = GraphSimulationDataProvider::with_overrides(
            graph,
            self.overrides.clone(),
            self.config.probability_tolerance,
        )?;
        let paths = PathFinder::new(graph, &provider)
            .with_max_path_nodes(self.config.max_path_nodes)
            .find_paths()?;

        let probabilities: Vec<f64> = paths
            .iter()
            .map(|p| provider.calculate_path_probability(p))
            .collect();
        let allocation = distribute_instances(request.number_of_instances, &probabilities);
        for ((path, probability), instances) in paths.iter().zip(&probabilities).zip(&allocation) {
            tracing::debug!(
                path_id = %path.id,
                probability = *probability,
                instances = *instances,
                "Instances allocated to path"
            );
        }

        let epoch = self
            .config
            .epoch_ms
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        let schedule = schedule_instances(&allocation, epoch, request.step_interval_ms)?;

        let info = SimulationInfo::new(
            graph.id.clone(),
            graph.name.clone(),
            request.number_of_instances,
            request.step_interval_ms,
        )
        .with_rule_set(request.aggregation_rule_set.clone())
        .with_start_time(epoch);
        let mut repository = SimulationRepository::new(request.aggregation_mode()).with_simulation_info(info);

        tracing::info!(
            process_id = %graph.id,
            instances = request.number_of_instances,
            scheduled = schedule.len(),
            paths = paths.len(),
            interval_ms = request.step_interval_ms,
            rule_set = ?request.aggregation_rule_set,
            mode = %repository.mode(),
            "Simulation started"
        );

        let mut context = SimulationContext::new(epoch, &provider, self.factory.as_ref(), self.config.seed);

        for (offset, scheduled) in schedule.iter().enumerate() {
            let instance_id = offset as u64 + 1;
            let path = &paths[scheduled.path_index];
            context.advance_to(scheduled.start);

            if let Err(failure) = walk(graph, path, instance_id, &mut context, &mut repository) {
                if self.config.strict {
                    return Err(SimulationError::InstanceFailed {
                        path_id: path.id.clone(),
                        instance_index: scheduled.instance_index,
                        node_id: failure.node_id,
                        source: Box::new(failure.source),
                    });
                }
                tracing::warn!(
                    path_id = %path.id,
                    instance_index = scheduled.instance_index,
                    instance_id,
                    node_id = %failure.node_id,
                    error = %failure.source,
                    "Simulated instance failed"
                );
                repository.record_failure(InstanceFailure {
                    path_id: path.id.clone(),
                    instance_index: scheduled.instance_index,
                    instance_id,
                    node_id: failure.node_id,
                    message: failure.source.to_string(),
                });
            }
        }

        repository.finish(context.max_end_time());

        tracing::info!(
            process_id = %graph.id,
            events = repository.event_count(),
            buckets = repository.aggregated_event_count(),
            failures = repository.failures().len(),
            start_time = epoch,
            end_time = context.max_end_time(),
            "Simulation completed"
        );

        Ok(repository)
    }
}

impl Default for SimulationRunner {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

/// Simulate `process_id` with the default configuration
pub fn run_simulation(
    process_id: &str,
    definition_source: &str,
    number_of_instances: u32,
    step_interval_ms: i64,
    run_rules_on_every_event: bool,
    aggregation_rule_set: Option<&str>,
) -> SimulationResult<SimulationRepository> {
    SimulationRunner::default().run_simulation(
        process_id,
        definition_source,
        number_of_instances,
        step_interval_ms,
        run_rules_on_every_event,
        aggregation_rule_set,
    )
}

/// Instances per path: `floor(n * probability)`. The remainder lost to
/// truncation is not redistributed.
pub fn distribute_instances(number_of_instances: u32, probabilities: &[f64]) -> Vec<u32> {
    let mut remaining = number_of_instances;
    probabilities
        .iter()
        .map(|p| {
            let share = (number_of_instances as f64 * p.clamp(0.0, 1.0)).floor() as u32;
            let share = share.min(remaining);
            remaining -= share;
            share
        })
        .collect()
}

/// Start times for every allocated instance, in visiting order
fn schedule_instances(
    allocation: &[u32],
    epoch: i64,
    step_interval_ms: i64,
) -> SimulationResult<Vec<ScheduledInstance>> {
    let mut schedule = Vec::with_capacity(allocation.iter().map(|&n| n as usize).sum());
    for (path_index, &instances) in allocation.iter().enumerate() {
        for instance_index in 0..instances {
            let offset = step_interval_ms
                .checked_mul(instance_index as i64)
                .and_then(|o| epoch.checked_add(o))
                .ok_or(SimulationError::InvalidDuration {
                    duration: step_interval_ms,
                })?;
            schedule.push(ScheduledInstance {
                path_index,
                instance_index,
                start: offset,
            });
        }
    }
    // stable: ties keep path order, then instance order
    schedule.sort_by_key(|s| s.start);
    Ok(schedule)
}

/// Walk one instance down its path, emitting an event per node
fn walk(
    graph: &ProcessGraph,
    path: &SimulationPath,
    instance_id: u64,
    context: &mut SimulationContext<'_>,
    repository: &mut SimulationRepository,
) -> Result<(), WalkError> {
    let process_start = context.current_time();

    for node_id in &path.nodes {
        let node = graph
            .get_node(node_id)
            .ok_or_else(|| SimulationError::NodeNotFound(node_id.clone()))
            .map_err(WalkError::at(node_id))?;

        let sample = context.sample_duration(node).map_err(WalkError::at(node_id))?;
        let start = context.current_time();
        let end = context
            .advance_time(sample.duration, sample.unit)
            .map_err(WalkError::at(node_id))?;
        context.set_max_end_time(end);

        let record = ActivityRecord {
            process_id: graph.id.clone(),
            instance_id,
            path_id: path.id.clone(),
            node_name: node.name.clone(),
            node_id: node.id.clone(),
            duration: end - start,
            start_time: start,
            end_time: end,
        };
        let event = match node.kind {
            NodeKind::UserTask => {
                let resource_cost = context
                    .data_provider()
                    .simulation_data_for_node(node_id)
                    .and_then(|d| d.resource_cost(sample.duration))
                    .unwrap_or(0.0);
                SimulationEvent::HumanTask(HumanTaskRecord {
                    activity: record,
                    assigned_group: node.assigned_group.clone(),
                    resource_cost,
                })
            }
            NodeKind::End => SimulationEvent::End(EndRecord {
                activity: record,
                process_start_time: process_start,
            }),
            _ => SimulationEvent::Activity(record),
        };
        repository.add_event(event);
    }

    repository.add_event(SimulationEvent::ProcessInstanceEnd(InstanceEndRecord {
        process_id: graph.id.clone(),
        instance_id,
        path_id: path.id.clone(),
        process_start_time: process_start,
        end_time: context.current_time(),
    }));
    Ok(())
}
