//! Virtual user loop

use crate::error::FailureKind;
use crate::flow::AccountFlow;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use wooload_core::metrics::{ITERATIONS, ITERATION_FAILURES};
use wooload_core::MetricSink;
use wooload_http::SessionFactory;

/// Per-VU iteration accounting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VuStats {
    /// Iterations that ran to completion or failed on their own
    pub iterations: u64,
    pub failures: BTreeMap<FailureKind, u64>,
    /// Iterations cut off by a hard stop
    pub interrupted: u64,
}

impl VuStats {
    pub fn failed(&self) -> u64 {
        self.failures.values().sum()
    }

    pub fn merge(&mut self, other: &VuStats) {
        self.iterations += other.iterations;
        self.interrupted += other.interrupted;
        for (kind, count) in &other.failures {
            *self.failures.entry(*kind).or_default() += count;
        }
    }
}

/// One simulated customer, looping the flow on a fresh session each time
pub struct VirtualUser {
    id: u64,
    flow: Arc<AccountFlow>,
    sessions: Arc<dyn SessionFactory>,
    sink: Arc<dyn MetricSink>,
}

impl VirtualUser {
    pub fn new(
        id: u64,
        flow: Arc<AccountFlow>,
        sessions: Arc<dyn SessionFactory>,
        sink: Arc<dyn MetricSink>,
    ) -> Self {
        Self {
            id,
            flow,
            sessions,
            sink,
        }
    }

    /// Loop iterations until `stop` fires
    ///
    /// `stop` is only checked between iterations. `hard_stop` abandons the
    /// iteration in flight.
    pub async fn run(self, stop: CancellationToken, hard_stop: CancellationToken) -> VuStats {
        let mut stats = VuStats::default();
        debug!("VU {} started", self.id);

        while !stop.is_cancelled() && !hard_stop.is_cancelled() {
            let session = match self.sessions.create_session() {
                Ok(session) => session,
                Err(e) => {
                    error!("VU {} could not create a session: {}", self.id, e);
                    self.record_failure(&mut stats, FailureKind::Transport);
                    break;
                }
            };

            let outcome = tokio::select! {
                biased;
                _ = hard_stop.cancelled() => None,
                result = self.flow.run_iteration(session.as_ref(), self.sink.as_ref()) => Some(result),
            };

            match outcome {
                None => {
                    debug!("VU {} interrupted mid-iteration", self.id);
                    stats.interrupted += 1;
                    break;
                }
                Some(Ok(())) => {
                    stats.iterations += 1;
                    self.sink.add_counter(ITERATIONS, 1);
                }
                Some(Err(e)) => {
                    warn!(vu = self.id, kind = %e.kind(), "Iteration failed: {}", e);
                    self.record_failure(&mut stats, e.kind());
                }
            }

            // Give the scheduler a turn when an iteration completed without awaiting
            tokio::task::yield_now().await;
        }

        debug!(
            "VU {} stopped after {} iterations ({} failed)",
            self.id,
            stats.iterations,
            stats.failed()
        );
        stats
    }

    fn record_failure(&self, stats: &mut VuStats, kind: FailureKind) {
        stats.iterations += 1;
        *stats.failures.entry(kind).or_default() += 1;
        self.sink.add_counter(ITERATIONS, 1);
        self.sink.add_counter(ITERATION_FAILURES, 1);
    }
}
