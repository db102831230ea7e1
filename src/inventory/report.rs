use serde::Serialize;
use std::collections::BTreeMap;

use super::types::{Resource, ResourceKind};
use crate::pool::ScanResult;

/// A listing job that reported a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginError {
    pub origin: String,
    pub message: String,
}

/// Resource counts aggregated per origin and resource kind
#[derive(Debug, Default, Serialize)]
pub struct Inventory {
    /// origin -> resource kind -> count
    pub counts: BTreeMap<String, BTreeMap<ResourceKind, usize>>,
    /// Failed listing jobs, in arrival order
    pub errors: Vec<OriginError>,
    /// Total results consumed, successes and errors alike
    pub results: usize,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a drained result stream
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ScanResult<Resource>>,
    {
        let mut inventory = Self::new();
        for result in results {
            inventory.record(result);
        }
        inventory
    }

    /// Fold one result into the inventory.
    ///
    /// Error results are kept apart with their message; they never count as
    /// an origin that simply had nothing to list.
    pub fn record(&mut self, result: ScanResult<Resource>) {
        self.results += 1;

        match result {
            ScanResult::Resources { origin, resources } => {
                let counts = self.counts.entry(origin).or_default();
                for resource in &resources {
                    *counts.entry(resource.kind()).or_insert(0) += 1;
                }
            }
            ScanResult::Error { origin, message } => {
                tracing::warn!(origin = %origin, "scan failed: {}", message);
                self.errors.push(OriginError { origin, message });
            }
        }
    }

    pub fn count(&self, origin: &str, kind: ResourceKind) -> usize {
        self.counts
            .get(origin)
            .and_then(|kinds| kinds.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    /// Total resources across every origin and kind
    pub fn total(&self) -> usize {
        self.counts.values().flat_map(|kinds| kinds.values()).sum()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Emit one structured event per origin and resource kind
    pub fn log_counts(&self) {
        for (origin, kinds) in &self.counts {
            for (kind, count) in kinds {
                tracing::info!(origin = %origin, resource = %kind, count, "resource count");
            }
        }
    }
}
