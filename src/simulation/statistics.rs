//! Fleet statistics collection
//!
//! Counters are shared by every device task and updated without locks.
//! Snapshots and the final report are plain serializable values.

use crate::types::DeviceName;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live publish counters shared by all devices of a fleet
#[derive(Debug)]
pub struct FleetStatistics {
    started_at: Instant,
    ticks: AtomicU64,
    published: AtomicU64,
    failed: AtomicU64,
}

impl Default for FleetStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetStatistics {
    /// Create zeroed counters starting now
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            ticks: AtomicU64::new(0),
            published: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Record a tick whose message the sink accepted
    pub fn record_published(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a tick whose message the sink refused
    pub fn record_failed(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Total ticks across the fleet
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Messages accepted by the sink
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Messages the sink refused
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self, devices: usize) -> StatisticsSnapshot {
        StatisticsSnapshot {
            devices,
            ticks: self.ticks(),
            published: self.published(),
            failed: self.failed(),
            elapsed: self.started_at.elapsed(),
        }
    }
}

/// Serializable view of the fleet counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    /// Devices in the fleet
    pub devices: usize,
    /// Ticks across all devices
    pub ticks: u64,
    /// Messages accepted by the sink
    pub published: u64,
    /// Messages the sink refused
    pub failed: u64,
    /// Time since the fleet started
    pub elapsed: Duration,
}

impl StatisticsSnapshot {
    /// Accepted messages per second since the fleet started
    pub fn publish_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.published as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of ticks whose message was refused, in percent
    pub fn failure_percentage(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            (self.failed as f64 / self.ticks as f64) * 100.0
        }
    }

    /// One-line summary for progress output
    pub fn compact_summary(&self) -> String {
        format!(
            "devices: {} | ticks: {} | published: {} | failed: {} ({:.1}%) | rate: {:.0}/s",
            self.devices,
            self.ticks,
            self.published,
            self.failed,
            self.failure_percentage(),
            self.publish_rate()
        )
    }
}

/// Outcome of one device's run loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceReport {
    /// Device the report belongs to
    pub name: DeviceName,
    /// Ticks the device completed
    pub ticks: u64,
    /// Ticks whose publish failed
    pub failed: u64,
}

/// Final report of a fleet after shutdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetReport {
    /// Per-device outcomes, in spawn order
    pub devices: Vec<DeviceReport>,
    /// Devices whose task ended abnormally
    pub aborted_devices: usize,
    /// Counter totals at shutdown
    pub totals: StatisticsSnapshot,
}

impl FleetReport {
    /// Smallest tick count among devices, zero for an empty report
    pub fn min_ticks(&self) -> u64 {
        self.devices.iter().map(|d| d.ticks).min().unwrap_or(0)
    }

    /// Largest tick count among devices, zero for an empty report
    pub fn max_ticks(&self) -> u64 {
        self.devices.iter().map(|d| d.ticks).max().unwrap_or(0)
    }

    /// Human readable summary
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str("Fleet Report\n");
        out.push_str("============\n");
        out.push_str(&format!("Devices: {}\n", self.devices.len()));
        if self.aborted_devices > 0 {
            out.push_str(&format!("Aborted devices: {}\n", self.aborted_devices));
        }
        out.push_str(&format!("Runtime: {:.2} seconds\n", self.totals.elapsed.as_secs_f64()));
        out.push_str(&format!("Total ticks: {}\n", self.totals.ticks));
        out.push_str(&format!("Published: {}\n", self.totals.published));
        out.push_str(&format!(
            "Failed: {} ({:.1}%)\n",
            self.totals.failed,
            self.totals.failure_percentage()
        ));
        out.push_str(&format!("Ticks per device: {} - {}\n", self.min_ticks(), self.max_ticks()));
        out.push_str(&format!("Publish rate: {:.1} messages/s\n", self.totals.publish_rate()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_start_at_zero() {
        let stats = FleetStatistics::new();
        assert_eq!(stats.ticks(), 0);
        assert_eq!(stats.published(), 0);
        assert_eq!(stats.failed(), 0);
    }

    #[test]
    fn test_statistics_counting() {
        let stats = FleetStatistics::new();
        stats.record_published();
        stats.record_published();
        stats.record_failed();

        let snapshot = stats.snapshot(2);
        assert_eq!(snapshot.devices, 2);
        assert_eq!(snapshot.ticks, 3);
        assert_eq!(snapshot.published, 2);
        assert_eq!(snapshot.failed, 1);
        assert!((snapshot.failure_percentage() - 33.33).abs() < 0.01);
    }

    #[test]
    fn test_snapshot_rates_with_zero_values() {
        let snapshot = StatisticsSnapshot {
            devices: 0,
            ticks: 0,
            published: 0,
            failed: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(snapshot.publish_rate(), 0.0);
        assert_eq!(snapshot.failure_percentage(), 0.0);
        assert!(snapshot.compact_summary().contains("ticks: 0"));
    }

    #[test]
    fn test_report_tick_range_and_summary() {
        let report = FleetReport {
            devices: vec![
                DeviceReport { name: DeviceName::new("a"), ticks: 4, failed: 0 },
                DeviceReport { name: DeviceName::new("b"), ticks: 5, failed: 1 },
            ],
            aborted_devices: 0,
            totals: StatisticsSnapshot {
                devices: 2,
                ticks: 9,
                published: 8,
                failed: 1,
                elapsed: Duration::from_secs(5),
            },
        };

        assert_eq!(report.min_ticks(), 4);
        assert_eq!(report.max_ticks(), 5);
        let summary = report.summary();
        assert!(summary.contains("Devices: 2"));
        assert!(summary.contains("Ticks per device: 4 - 5"));
        assert!(!summary.contains("Aborted"));
    }
}
