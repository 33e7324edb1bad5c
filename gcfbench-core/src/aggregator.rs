//! Thread-safe results aggregation using DashMap.
//!
//! Holds the ordered set of function instances for one benchmark run.
//! `add` serializes concurrent writers through the map's entry API and
//! rejects duplicate indices fail-fast; reads are snapshots sorted by
//! index, safe once all writers have completed.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

use crate::error::ValidationError;
use crate::instance::{FunctionInstance, InstanceEntry, LifecycleState};

/// Collects function instance records across a benchmark run.
#[derive(Debug, Default)]
pub struct ResultsAggregator {
    instances: DashMap<u32, FunctionInstance>,
}

impl ResultsAggregator {
    /// Create a new empty aggregator.
    pub fn new() -> Self {
        Self {
            instances: DashMap::new(),
        }
    }

    /// Add an instance to the run.
    /// Returns ValidationError::DuplicateIndex if the index was already added.
    pub fn add(&self, instance: FunctionInstance) -> Result<(), ValidationError> {
        match self.instances.entry(instance.index()) {
            Entry::Occupied(_) => Err(ValidationError::DuplicateIndex {
                index: instance.index(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(instance);
                Ok(())
            }
        }
    }

    /// Snapshot of all instances, ordered by index.
    ///
    /// Each call produces a fresh, restartable sequence reflecting the
    /// aggregator's current contents.
    pub fn all(&self) -> Vec<FunctionInstance> {
        let mut snapshot: Vec<FunctionInstance> =
            self.instances.iter().map(|r| r.value().clone()).collect();
        snapshot.sort_by_key(FunctionInstance::index);
        snapshot
    }

    /// Artifact entries for all instances, ordered by index.
    pub fn entries(&self) -> Vec<InstanceEntry> {
        self.all().iter().map(FunctionInstance::to_entry).collect()
    }

    /// Get the number of collected instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the aggregator is empty.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Aggregate counts over the current contents.
    /// Recomputed on every call, never cached.
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in self.instances.iter() {
            let instance = entry.value();
            summary.total += 1;
            if instance.deployed() {
                summary.deployed += 1;
            }
            if instance.test_result().is_some() {
                summary.tested += 1;
            }
            if instance.state() == LifecycleState::DeployFailed {
                summary.failed += 1;
            }
        }
        summary
    }
}

/// Aggregate counts for one benchmark run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of instances collected.
    pub total: usize,
    /// Instances whose deployment succeeded.
    pub deployed: usize,
    /// Instances with a recorded test result.
    pub tested: usize,
    /// Instances whose deployment failed.
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::DeploymentResult;
    use crate::types::BaseName;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn named(index: u32) -> FunctionInstance {
        let mut instance = FunctionInstance::new(index);
        instance.set_names(&BaseName::new("bench").unwrap()).unwrap();
        instance
    }

    fn deployed(index: u32) -> FunctionInstance {
        let mut instance = named(index);
        instance
            .record_deployment(
                DeploymentResult::Success {
                    url: format!("https://f{index}.example"),
                    used_region: None,
                    duration: None,
                    deploy_time: None,
                },
                HashMap::new(),
            )
            .unwrap();
        instance
    }

    #[test]
    fn test_add_and_order() {
        let aggregator = ResultsAggregator::new();
        aggregator.add(named(2)).unwrap();
        aggregator.add(named(0)).unwrap();
        aggregator.add(named(1)).unwrap();

        let indices: Vec<u32> = aggregator.all().iter().map(|i| i.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let aggregator = ResultsAggregator::new();
        aggregator.add(named(1)).unwrap();

        let err = aggregator.add(named(1)).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateIndex { index: 1 }));
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_all_is_restartable() {
        let aggregator = ResultsAggregator::new();
        aggregator.add(named(0)).unwrap();
        aggregator.add(named(1)).unwrap();

        let first: Vec<u32> = aggregator.all().iter().map(|i| i.index()).collect();
        let second: Vec<u32> = aggregator.all().iter().map(|i| i.index()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_counts() {
        let aggregator = ResultsAggregator::new();
        aggregator.add(deployed(0)).unwrap();

        let mut tested = deployed(1);
        tested.record_test(HashMap::new()).unwrap();
        aggregator.add(tested).unwrap();

        let mut failed = named(2);
        failed
            .record_deployment(DeploymentResult::failure("boom"), HashMap::new())
            .unwrap();
        aggregator.add(failed).unwrap();

        let summary = aggregator.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.deployed, 2);
        assert_eq!(summary.tested, 1);
        assert_eq!(summary.failed, 1);

        // Recomputed on demand
        aggregator.add(named(3)).unwrap();
        assert_eq!(aggregator.summary().total, 4);
    }

    #[test]
    fn test_concurrent_add() {
        use std::thread;

        let aggregator = Arc::new(ResultsAggregator::new());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let agg = Arc::clone(&aggregator);
                thread::spawn(move || {
                    agg.add(named(i)).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(aggregator.len(), 10);
        assert_eq!(aggregator.summary().total, 10);
    }
}
