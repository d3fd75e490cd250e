//! Per-service and per-destination statistics emitted alongside the
//! posterior state (§4.9).

use super::ids::{Gas, ServiceId};
use std::collections::BTreeMap;

/// A single service's accumulation statistics for one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccumulationServiceStats {
    /// Total gas this service consumed across every batch it accumulated in.
    pub gas_used: Gas,
    /// The number of `WorkResult` entries addressed to this service among the
    /// accumulated reports, counted as occurrences rather than distinct
    /// reports (a report with two results for the same service counts twice).
    pub accumulated_count: u32,
}

impl AccumulationServiceStats {
    /// Folds in one more result: adds `gas_used` and increments the count.
    pub fn record(&mut self, gas_used: Gas) {
        self.gas_used = self.gas_used.saturating_add(gas_used);
        self.accumulated_count += 1;
    }
}

/// A single destination's on-transfer statistics for one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// The number of deferred transfers this destination received.
    pub transfer_count: u32,
    /// The gas consumed by the destination's combined `on_transfer` invocation.
    pub gas_used: Gas,
}

/// The full statistics bundle produced for one block (§4.9, §8).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAccumulationStats {
    /// Per-service accumulation statistics, keyed by service id.
    pub service_stats: BTreeMap<ServiceId, AccumulationServiceStats>,
    /// Per-destination transfer statistics, keyed by destination service id.
    pub transfer_stats: BTreeMap<ServiceId, TransferStats>,
}

impl BlockAccumulationStats {
    /// An empty statistics bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `gas_used` for one accumulated result addressed to `service_id`.
    pub fn record_accumulation(&mut self, service_id: ServiceId, gas_used: Gas) {
        self.service_stats
            .entry(service_id)
            .or_default()
            .record(gas_used);
    }

    /// Records one destination's combined on-transfer invocation.
    pub fn record_transfer(&mut self, destination: ServiceId, transfer_count: u32, gas_used: Gas) {
        let entry = self.transfer_stats.entry(destination).or_default();
        entry.transfer_count += transfer_count;
        entry.gas_used = entry.gas_used.saturating_add(gas_used);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulated_count_counts_occurrences_not_distinct_reports() {
        let mut stats = BlockAccumulationStats::new();
        stats.record_accumulation(ServiceId(1), 100);
        stats.record_accumulation(ServiceId(1), 50);
        stats.record_accumulation(ServiceId(2), 10);

        let s1 = stats.service_stats.get(&ServiceId(1)).unwrap();
        assert_eq!(s1.accumulated_count, 2);
        assert_eq!(s1.gas_used, 150);
        assert_eq!(stats.service_stats.get(&ServiceId(2)).unwrap().accumulated_count, 1);
    }

    #[test]
    fn transfer_stats_accumulate_across_multiple_dispatches() {
        let mut stats = BlockAccumulationStats::new();
        stats.record_transfer(ServiceId(9), 2, 40);
        stats.record_transfer(ServiceId(9), 1, 10);

        let t = stats.transfer_stats.get(&ServiceId(9)).unwrap();
        assert_eq!(t.transfer_count, 3);
        assert_eq!(t.gas_used, 50);
    }
}
