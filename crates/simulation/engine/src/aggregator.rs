//! Folding raw events into statistics buckets

use indexmap::IndexMap;
use simulation_types::{
    AggregateKey, AggregatedActivity, AggregatedEndEvent, AggregatedProcess,
    AggregatedSimulationEvent, ProcessId, ProcessSummary, RunningStats, SimulationEvent,
};
use std::collections::HashMap;

/// Buckets in creation order
pub type Buckets = IndexMap<AggregateKey, AggregatedSimulationEvent>;

/// Fold one event into its bucket, creating the bucket on first use.
/// Returns the key of the bucket that was updated.
pub fn fold(buckets: &mut Buckets, event: &SimulationEvent) -> AggregateKey {
    let key = match event {
        SimulationEvent::Activity(record) => {
            let key = AggregateKey::activity(&record.process_id, &record.node_id);
            let bucket = buckets.entry(key.clone()).or_insert_with(|| {
                AggregatedSimulationEvent::Activity(AggregatedActivity {
                    process_id: record.process_id.clone(),
                    node_id: record.node_id.clone(),
                    node_name: record.node_name.clone(),
                    execution_time: RunningStats::new(),
                    resource_cost: None,
                })
            });
            if let AggregatedSimulationEvent::Activity(activity) = bucket {
                activity.execution_time.record(record.duration as f64);
            }
            key
        }
        SimulationEvent::HumanTask(task) => {
            let record = &task.activity;
            let key = AggregateKey::activity(&record.process_id, &record.node_id);
            let bucket = buckets.entry(key.clone()).or_insert_with(|| {
                AggregatedSimulationEvent::Activity(AggregatedActivity {
                    process_id: record.process_id.clone(),
                    node_id: record.node_id.clone(),
                    node_name: record.node_name.clone(),
                    execution_time: RunningStats::new(),
                    resource_cost: Some(RunningStats::new()),
                })
            });
            if let AggregatedSimulationEvent::Activity(activity) = bucket {
                activity.execution_time.record(record.duration as f64);
                activity
                    .resource_cost
                    .get_or_insert_with(RunningStats::new)
                    .record(task.resource_cost);
            }
            key
        }
        SimulationEvent::End(end) => {
            let record = &end.activity;
            let key = AggregateKey::end_event(&record.process_id, &record.node_id);
            let bucket = buckets.entry(key.clone()).or_insert_with(|| {
                AggregatedSimulationEvent::EndEvent(AggregatedEndEvent {
                    process_id: record.process_id.clone(),
                    node_id: record.node_id.clone(),
                    node_name: record.node_name.clone(),
                    process_duration: RunningStats::new(),
                })
            });
            if let AggregatedSimulationEvent::EndEvent(end_event) = bucket {
                end_event.process_duration.record(end.process_duration() as f64);
            }
            key
        }
        SimulationEvent::ProcessInstanceEnd(done) => {
            let key = AggregateKey::process(&done.process_id);
            let bucket = buckets.entry(key.clone()).or_insert_with(|| {
                AggregatedSimulationEvent::Process(AggregatedProcess::new(done.process_id.clone()))
            });
            if let AggregatedSimulationEvent::Process(process) = bucket {
                process.record_instance(&done.path_id);
            }
            key
        }
    };

    tracing::trace!(bucket = %key, event = event.kind_name(), "Event aggregated");
    key
}

/// Fold a whole event stream, in order
pub fn fold_all<'e>(events: impl IntoIterator<Item = &'e SimulationEvent>) -> Buckets {
    let mut buckets = Buckets::new();
    for event in events {
        fold(&mut buckets, event);
    }
    buckets
}

/// Roll every bucket up into one summary per process, in bucket order
pub fn summarize(buckets: &Buckets) -> IndexMap<ProcessId, ProcessSummary> {
    let mut summaries: IndexMap<ProcessId, ProcessSummary> = IndexMap::new();
    let mut slowest: HashMap<ProcessId, f64> = HashMap::new();

    for (key, bucket) in buckets {
        let process_id = key.process_id();
        let summary = summaries
            .entry(process_id.clone())
            .or_insert_with(|| ProcessSummary::new(process_id.clone()));

        match bucket {
            AggregatedSimulationEvent::Activity(activity) => {
                summary.activity_count += 1;
                let avg = activity.execution_time.avg;
                let best = slowest.entry(process_id.clone()).or_insert(f64::NEG_INFINITY);
                if avg > *best {
                    *best = avg;
                    summary.slowest_activity = Some(activity.node_id.clone());
                }
            }
            AggregatedSimulationEvent::EndEvent(end_event) => {
                summary.process_duration.merge(&end_event.process_duration);
            }
            AggregatedSimulationEvent::Process(process) => {
                summary.total_instances = process.total_instances;
                summary.path_instances = process.path_instances.clone();
            }
        }
    }

    summaries
}
