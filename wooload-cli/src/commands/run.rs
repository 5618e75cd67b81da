//! `run` and `check`

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wooload_config::{ExecutorConfig, PauseConfig, WooloadConfig};
use wooload_core::metrics::{CACHE_HIT_RATIO, RESPONSE_CACHED};
use wooload_core::MetricRegistry;
use wooload_http::{HttpConfig, SessionFactory, SiteSessionFactory};
use wooload_runtime::{AccountFlow, ScenarioRunner};

/// Replace the configured executor with a constant one
pub fn constant_executor(config: &mut WooloadConfig, vus: u64, duration: Duration) {
    config.scenario.executor = ExecutorConfig::ConstantVus { vus, duration };
}

/// Run the full scenario, stopping gracefully on Ctrl-C
pub async fn run_scenario(config: WooloadConfig, json: bool) -> Result<()> {
    let flow = AccountFlow::from_config(&config.site, &config.scenario)
        .context("Cannot start the scenario")?;
    let sessions: Arc<dyn SessionFactory> =
        Arc::new(SiteSessionFactory::new(HttpConfig::from(config.http.clone())));
    let runner = ScenarioRunner::new(config.scenario.clone(), flow, sessions);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl-C, stopping the scenario");
            signal_token.cancel();
        }
    });

    let report = runner.run(shutdown).await?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

/// Run one iteration on a fresh session and print what it recorded
pub async fn run_check(config: WooloadConfig, json: bool) -> Result<()> {
    let flow = AccountFlow::from_config(&config.site, &config.scenario)
        .context("Cannot run the check")?
        .with_pause(PauseConfig { min: 0, max: 0 });
    let sessions = SiteSessionFactory::new(HttpConfig::from(config.http));
    let session = sessions
        .create_session()
        .context("Failed to create HTTP session")?;
    let registry = MetricRegistry::new();

    info!("Running a single iteration against {}", flow.site());
    let outcome = flow.run_iteration(session.as_ref(), &registry).await;
    let snapshot = registry.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for (name, check) in &snapshot.checks {
            let mark = if check.fails == 0 { "✅" } else { "❌" };
            println!("{} {}", mark, name);
        }
        if let Some(cached) = snapshot.rate(RESPONSE_CACHED) {
            println!(
                "📦 {} of {} responses served from page cache",
                cached.passes, cached.total
            );
        }
        if let Some(hits) = snapshot.trend(CACHE_HIT_RATIO) {
            println!("🔎 object cache hit ratio: {:.1}% average", hits.avg);
        }
    }

    outcome.context("Account flow failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_executor_override() {
        let mut config = WooloadConfig::default();
        constant_executor(&mut config, 5, Duration::from_secs(30));
        assert_eq!(config.scenario.executor.max_vus(), 5);
        assert_eq!(config.scenario.executor.total_duration(), Duration::from_secs(30));
        assert_eq!(config.scenario.executor.kind(), "constant-vus");
    }

    #[tokio::test]
    async fn test_run_without_site_url_fails_before_any_request() {
        let err = run_scenario(WooloadConfig::default(), false).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Site URL is not set"));

        let err = run_check(WooloadConfig::default(), true).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Site URL is not set"));
    }
}
