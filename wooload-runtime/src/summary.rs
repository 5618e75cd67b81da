//! Run report and its text rendering

use crate::error::{FailureKind, RunError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;
use wooload_config::ScenarioConfig;
use wooload_core::metrics::TIME_TRENDS;
use wooload_core::{MetricsSnapshot, TrendSummary};

/// Descriptive run metadata carried through from the scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub name: String,
    pub note: String,
    pub project_id: Option<String>,
}

impl From<&ScenarioConfig> for RunMetadata {
    fn from(scenario: &ScenarioConfig) -> Self {
        Self {
            name: scenario.name.clone(),
            note: scenario.note.clone(),
            project_id: scenario.project_id.clone(),
        }
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub metadata: RunMetadata,
    pub executor: String,
    pub site: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
    pub max_vus: u64,
    pub iterations: u64,
    pub interrupted_iterations: u64,
    pub failures: BTreeMap<FailureKind, u64>,
    pub metrics: MetricsSnapshot,
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl RunReport {
    pub fn failed_iterations(&self) -> u64 {
        self.failures.values().sum()
    }

    /// All checks passed and no iteration failed
    pub fn is_clean(&self) -> bool {
        self.failed_iterations() == 0 && self.metrics.checks.values().all(|check| check.fails == 0)
    }

    pub fn to_json(&self) -> Result<String, RunError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

const NAME_WIDTH: usize = 28;

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  scenario: {} ({}, max {} VUs)", self.metadata.name, self.executor, self.max_vus)?;
        writeln!(f, "      site: {}", self.site)?;
        writeln!(f, "       run: {}", self.run_id)?;
        if let Some(project_id) = &self.metadata.project_id {
            writeln!(f, "   project: {}", project_id)?;
        }
        writeln!(f, "  duration: {:.1}s", self.duration.as_secs_f64())?;
        writeln!(f)?;

        for (name, check) in &self.metrics.checks {
            let mark = if check.fails == 0 { '✓' } else { '✗' };
            let total = check.passes + check.fails;
            writeln!(
                f,
                "  {} {}\n    {}% - ✓ {} / ✗ {}",
                mark,
                name,
                percent(check.passes, total),
                check.passes,
                check.fails
            )?;
        }
        if !self.metrics.checks.is_empty() {
            writeln!(f)?;
        }

        for (name, rate) in &self.metrics.rates {
            writeln!(
                f,
                "  {}: {:.2}% ✓ {} ✗ {}",
                dotted(name),
                rate.rate() * 100.0,
                rate.passes,
                rate.total - rate.passes
            )?;
        }

        for (name, trend) in &self.metrics.trends {
            let unit = if TIME_TRENDS.contains(&name.as_str()) { "ms" } else { "" };
            writeln!(f, "  {}: {}", dotted(name), format_trend(trend, unit))?;
        }

        for (name, value) in &self.metrics.counters {
            writeln!(f, "  {}: {}", dotted(name), value)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "  {}: {} complete, {} failed, {} interrupted",
            dotted("iterations"),
            self.iterations,
            self.failed_iterations(),
            self.interrupted_iterations
        )?;
        for (kind, count) in &self.failures {
            writeln!(f, "    {}: {}", kind, count)?;
        }
        Ok(())
    }
}

fn dotted(name: &str) -> String {
    format!("{:.<width$}", name, width = NAME_WIDTH)
}

fn percent(part: u64, total: u64) -> u64 {
    if total == 0 {
        0
    } else {
        part * 100 / total
    }
}

fn format_trend(trend: &TrendSummary, unit: &str) -> String {
    format!(
        "avg={avg:.2}{u} min={min:.2}{u} med={med:.2}{u} max={max:.2}{u} p(90)={p90:.2}{u} p(95)={p95:.2}{u} count={count}",
        avg = trend.avg,
        min = trend.min,
        med = trend.med,
        max = trend.max,
        p90 = trend.p90,
        p95 = trend.p95,
        count = trend.count,
        u = unit
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wooload_core::{MetricRegistry, MetricSink};

    fn report() -> RunReport {
        let registry = MetricRegistry::new();
        registry.record_check("status is 2xx", true);
        registry.record_check("status is 2xx", true);
        registry.record_check("page is not login", false);
        registry.add_rate("errors", false);
        registry.add_rate("errors", true);
        registry.add_trend("ms_cache", 2.5);
        registry.add_trend("cache_hits", 120.0);
        registry.add_counter("iterations", 2);

        let mut failures = BTreeMap::new();
        failures.insert(FailureKind::SessionLost, 1);

        let scenario = ScenarioConfig {
            project_id: Some("3481195".to_string()),
            ..Default::default()
        };

        RunReport {
            run_id: Uuid::new_v4(),
            metadata: RunMetadata::from(&scenario),
            executor: "ramping-vus".to_string(),
            site: "https://shop.example.com/".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            duration: Duration::from_millis(61_500),
            max_vus: 100,
            iterations: 2,
            interrupted_iterations: 0,
            failures,
            metrics: registry.snapshot(),
        }
    }

    #[test]
    fn test_text_summary() {
        let text = report().to_string();
        assert!(text.contains("scenario: WooCommerce account flow (ramping-vus, max 100 VUs)"));
        assert!(text.contains("project: 3481195"));
        assert!(text.contains("duration: 61.5s"));
        assert!(text.contains("✓ status is 2xx"));
        assert!(text.contains("✗ page is not login"));
        assert!(text.contains("errors......................: 50.00% ✓ 1 ✗ 1"));
        assert!(text.contains("avg=2.50ms"));
        assert!(text.contains("cache_hits..................: avg=120.00 "));
        assert!(text.contains("session_lost: 1"));
    }

    #[test]
    fn test_json_report() {
        let report = report();
        assert_eq!(report.failed_iterations(), 1);
        assert!(!report.is_clean());

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["metadata"]["name"], "WooCommerce account flow");
        assert_eq!(json["metadata"]["project_id"], "3481195");
        assert_eq!(json["duration"], 61.5);
        assert_eq!(json["failures"]["session_lost"], 1);
        assert_eq!(json["metrics"]["checks"]["status is 2xx"]["passes"], 2);
        assert_eq!(json["metrics"]["rates"]["errors"]["total"], 2);
    }
}
