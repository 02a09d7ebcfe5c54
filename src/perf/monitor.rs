//! Timing metrics accumulation

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy)]
struct MetricStats {
    count: u64,
    total: Duration,
    min: Duration,
    max: Duration,
}

impl MetricStats {
    fn new(sample: Duration) -> Self {
        Self {
            count: 1,
            total: sample,
            min: sample,
            max: sample,
        }
    }

    fn add(&mut self, sample: Duration) {
        self.count += 1;
        self.total += sample;
        self.min = self.min.min(sample);
        self.max = self.max.max(sample);
    }
}

/// Aggregated view of one metric, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub count: u64,
    pub total_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
}

impl From<&MetricStats> for MetricSummary {
    fn from(stats: &MetricStats) -> Self {
        let total_ms = stats.total.as_secs_f64() * 1000.0;
        Self {
            count: stats.count,
            total_ms,
            min_ms: stats.min.as_secs_f64() * 1000.0,
            max_ms: stats.max.as_secs_f64() * 1000.0,
            mean_ms: total_ms / stats.count as f64,
        }
    }
}

/// Thread-safe accumulator of named duration samples
#[derive(Debug, Default)]
pub struct PerformanceMonitor {
    metrics: Mutex<HashMap<String, MetricStats>>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample to a metric
    pub fn record(&self, name: &str, elapsed: Duration) {
        let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
        match metrics.get_mut(name) {
            Some(stats) => stats.add(elapsed),
            None => {
                metrics.insert(name.to_string(), MetricStats::new(elapsed));
            }
        }
    }

    /// Await a future and record how long it took
    pub async fn time<F, T>(&self, name: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let start = Instant::now();
        let output = fut.await;
        self.record(name, start.elapsed());
        output
    }

    pub fn summary(&self, name: &str) -> Option<MetricSummary> {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(MetricSummary::from)
    }

    /// All metrics, sorted by name
    pub fn snapshot(&self) -> BTreeMap<String, MetricSummary> {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, stats)| (name.clone(), MetricSummary::from(stats)))
            .collect()
    }

    pub fn reset(&self) {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_aggregates() {
        let monitor = PerformanceMonitor::new();
        monitor.record("probe", Duration::from_millis(10));
        monitor.record("probe", Duration::from_millis(30));

        let summary = monitor.summary("probe").unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_ms, 40.0);
        assert_eq!(summary.min_ms, 10.0);
        assert_eq!(summary.max_ms, 30.0);
        assert_eq!(summary.mean_ms, 20.0);
    }

    #[test]
    fn test_unknown_metric() {
        let monitor = PerformanceMonitor::new();
        assert!(monitor.summary("nothing").is_none());
    }

    #[tokio::test]
    async fn test_time_records_sample() {
        let monitor = PerformanceMonitor::new();
        let value = monitor
            .time("sleep", async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                42
            })
            .await;

        assert_eq!(value, 42);
        let summary = monitor.summary("sleep").unwrap();
        assert_eq!(summary.count, 1);
        assert!(summary.total_ms >= 5.0);
    }

    #[test]
    fn test_snapshot_sorted_and_reset() {
        let monitor = PerformanceMonitor::new();
        monitor.record("b", Duration::from_millis(1));
        monitor.record("a", Duration::from_millis(1));

        let names: Vec<String> = monitor.snapshot().into_keys().collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

        monitor.reset();
        assert!(monitor.snapshot().is_empty());
    }
}
