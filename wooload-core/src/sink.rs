//! Metric sink and in-process aggregation

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Where flow steps record their samples
///
/// Implementations must accept samples from many virtual users at once.
pub trait MetricSink: Send + Sync {
    /// Record one boolean sample for a rate metric
    fn add_rate(&self, name: &str, value: bool);

    /// Record one numeric sample for a trend metric
    fn add_trend(&self, name: &str, value: f64);

    fn add_counter(&self, name: &str, delta: u64);

    fn record_check(&self, name: &str, passed: bool);
}

#[derive(Debug, Default)]
struct Samples {
    rates: BTreeMap<String, (u64, u64)>,
    trends: BTreeMap<String, Vec<f64>>,
    counters: BTreeMap<String, u64>,
    checks: BTreeMap<String, (u64, u64)>,
}

/// Thread-safe, append-only metric store
///
/// Every trend sample is kept in memory for the whole run and only summarised
/// when [`MetricRegistry::snapshot`] is called.
#[derive(Debug, Default, Clone)]
pub struct MetricRegistry {
    samples: Arc<Mutex<Samples>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate everything recorded so far
    pub fn snapshot(&self) -> MetricsSnapshot {
        let samples = self.samples.lock();
        MetricsSnapshot {
            rates: samples
                .rates
                .iter()
                .map(|(name, &(passes, total))| (name.clone(), RateSummary { passes, total }))
                .collect(),
            trends: samples
                .trends
                .iter()
                .map(|(name, values)| (name.clone(), TrendSummary::from_samples(values)))
                .collect(),
            counters: samples.counters.clone(),
            checks: samples
                .checks
                .iter()
                .map(|(name, &(passes, fails))| (name.clone(), CheckSummary { passes, fails }))
                .collect(),
        }
    }
}

impl MetricSink for MetricRegistry {
    fn add_rate(&self, name: &str, value: bool) {
        let mut samples = self.samples.lock();
        let entry = samples.rates.entry(name.to_string()).or_default();
        entry.0 += u64::from(value);
        entry.1 += 1;
    }

    fn add_trend(&self, name: &str, value: f64) {
        self.samples
            .lock()
            .trends
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn add_counter(&self, name: &str, delta: u64) {
        *self
            .samples
            .lock()
            .counters
            .entry(name.to_string())
            .or_default() += delta;
    }

    fn record_check(&self, name: &str, passed: bool) {
        let mut samples = self.samples.lock();
        let entry = samples.checks.entry(name.to_string()).or_default();
        if passed {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }
}

/// Point-in-time view of every metric, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub rates: BTreeMap<String, RateSummary>,
    pub trends: BTreeMap<String, TrendSummary>,
    pub counters: BTreeMap<String, u64>,
    pub checks: BTreeMap<String, CheckSummary>,
}

impl MetricsSnapshot {
    pub fn rate(&self, name: &str) -> Option<&RateSummary> {
        self.rates.get(name)
    }

    pub fn trend(&self, name: &str) -> Option<&TrendSummary> {
        self.trends.get(name)
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn check(&self, name: &str) -> Option<&CheckSummary> {
        self.checks.get(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateSummary {
    pub passes: u64,
    pub total: u64,
}

impl RateSummary {
    /// Fraction of true samples, 0 when nothing was recorded
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passes as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub passes: u64,
    pub fails: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrendSummary {
    pub count: u64,
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
}

impl TrendSummary {
    fn from_samples(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let len = sorted.len();
        let percentile = |p: usize| sorted[(len * p / 100).min(len - 1)];

        Self {
            count: len as u64,
            avg: sorted.iter().sum::<f64>() / len as f64,
            min: sorted[0],
            med: percentile(50),
            max: sorted[len - 1],
            p90: percentile(90),
            p95: percentile(95),
        }
    }
}
