//! Scenario execution: starting, retiring and stopping virtual users

use crate::error::RunError;
use crate::flow::AccountFlow;
use crate::summary::{RunMetadata, RunReport};
use crate::vu::{VirtualUser, VuStats};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wooload_config::{ExecutorConfig, ScenarioConfig};
use wooload_core::{MetricRegistry, MetricSink};
use wooload_http::SessionFactory;

const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// Active virtual users the executor wants `elapsed` into the run
///
/// Ramping stages interpolate linearly from the previous target (or
/// `start_vus`) to their own target. Past the last stage the final target
/// holds.
pub fn target_vus(executor: &ExecutorConfig, elapsed: Duration) -> u64 {
    match executor {
        ExecutorConfig::ConstantVus { vus, .. } => *vus,
        ExecutorConfig::RampingVus {
            start_vus, stages, ..
        } => {
            let mut from = *start_vus;
            let mut remaining = elapsed;
            for stage in stages {
                if remaining < stage.duration {
                    let progress = remaining.as_secs_f64() / stage.duration.as_secs_f64();
                    let delta = stage.target as f64 - from as f64;
                    return (from as f64 + delta * progress).round().max(0.0) as u64;
                }
                remaining -= stage.duration;
                from = stage.target;
            }
            from
        }
    }
}

/// Deadlines past this are treated as "never"
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + grace`, clamped so huge grace periods cannot overflow the clock
fn deadline_after(grace: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(grace.min(FAR_FUTURE)).unwrap_or(now)
}

struct RunningVu {
    stop: CancellationToken,
    hard_stop: CancellationToken,
    handle: JoinHandle<VuStats>,
}

struct RetiredVu {
    hard_stop: CancellationToken,
    handle: JoinHandle<VuStats>,
    deadline: Instant,
}

/// Runs a scenario against a site and produces the run report
pub struct ScenarioRunner {
    scenario: ScenarioConfig,
    flow: Arc<AccountFlow>,
    sessions: Arc<dyn SessionFactory>,
    registry: MetricRegistry,
    tick: Duration,
}

impl ScenarioRunner {
    pub fn new(scenario: ScenarioConfig, flow: AccountFlow, sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            scenario,
            flow: Arc::new(flow),
            sessions,
            registry: MetricRegistry::new(),
            tick: DEFAULT_TICK,
        }
    }

    /// How often the VU target is re-evaluated
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Execute the scenario until its schedule ends or `shutdown` fires
    pub async fn run(&self, shutdown: CancellationToken) -> Result<RunReport, RunError> {
        let executor = &self.scenario.executor;
        let total = executor.total_duration();
        let graceful_ramp_down = match executor {
            ExecutorConfig::RampingVus {
                graceful_ramp_down, ..
            } => *graceful_ramp_down,
            ExecutorConfig::ConstantVus { .. } => self.scenario.graceful_stop,
        };

        info!(
            "Starting scenario '{}' against {} ({}, up to {} VUs over {:?})",
            self.scenario.name,
            self.flow.site(),
            executor.kind(),
            executor.max_vus(),
            total
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let sink: Arc<dyn MetricSink> = Arc::new(self.registry.clone());
        let hard_stop = CancellationToken::new();

        let mut running: Vec<RunningVu> = Vec::new();
        let mut retired: Vec<RetiredVu> = Vec::new();
        let mut next_id = 1;
        let mut max_vus = 0;
        let mut ticker = tokio::time::interval(self.tick);

        loop {
            let elapsed = start.elapsed();
            if elapsed >= total || shutdown.is_cancelled() {
                break;
            }

            let target = target_vus(executor, elapsed) as usize;
            while running.len() < target {
                let vu_stop = CancellationToken::new();
                let vu_hard_stop = hard_stop.child_token();
                let vu = VirtualUser::new(
                    next_id,
                    Arc::clone(&self.flow),
                    Arc::clone(&self.sessions),
                    Arc::clone(&sink),
                );
                let handle = tokio::spawn(vu.run(vu_stop.clone(), vu_hard_stop.clone()));
                running.push(RunningVu {
                    stop: vu_stop,
                    hard_stop: vu_hard_stop,
                    handle,
                });
                next_id += 1;
            }
            while running.len() > target {
                if let Some(vu) = running.pop() {
                    vu.stop.cancel();
                    retired.push(RetiredVu {
                        hard_stop: vu.hard_stop,
                        handle: vu.handle,
                        deadline: deadline_after(graceful_ramp_down),
                    });
                }
            }
            max_vus = max_vus.max(running.len() as u64);

            let now = Instant::now();
            for vu in retired.iter().filter(|vu| vu.deadline <= now) {
                if !vu.hard_stop.is_cancelled() && !vu.handle.is_finished() {
                    debug!("Ramp-down grace expired, interrupting retired VU");
                    vu.hard_stop.cancel();
                }
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.cancelled() => {
                    warn!("Shutdown requested, stopping virtual users");
                }
            }
        }

        info!(
            "Scenario schedule finished, waiting up to {:?} for {} running iterations",
            self.scenario.graceful_stop,
            running.len()
        );
        for vu in &running {
            vu.stop.cancel();
        }

        let deadline = deadline_after(self.scenario.graceful_stop);
        let handles = running
            .into_iter()
            .map(|vu| vu.handle)
            .chain(retired.into_iter().map(|vu| vu.handle));

        let mut totals = VuStats::default();
        for mut handle in handles {
            let joined = match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    if !hard_stop.is_cancelled() {
                        warn!("Graceful stop expired, interrupting remaining iterations");
                        hard_stop.cancel();
                    }
                    handle.await
                }
            };
            match joined {
                Ok(stats) => totals.merge(&stats),
                Err(e) => error!("Virtual user task failed: {}", e),
            }
        }

        let report = RunReport {
            run_id: uuid::Uuid::new_v4(),
            metadata: RunMetadata::from(&self.scenario),
            executor: executor.kind().to_string(),
            site: self.flow.site().to_string(),
            started_at,
            finished_at: Utc::now(),
            duration: start.elapsed(),
            max_vus,
            iterations: totals.iterations,
            interrupted_iterations: totals.interrupted,
            failures: totals.failures,
            metrics: self.registry.snapshot(),
        };

        info!(
            "Scenario '{}' complete: {} iterations, {} failed, {} interrupted",
            report.metadata.name,
            report.iterations,
            report.failed_iterations(),
            report.interrupted_iterations
        );
        Ok(report)
    }
}
