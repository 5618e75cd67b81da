//! Scenario configuration: how many virtual users, for how long, and their pacing

use crate::error::ConfigResult;
use crate::validation::{validate_ordered, validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scenario configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Scenario name shown in the run summary
    #[serde(default = "default_name")]
    pub name: String,

    /// Free-form description carried into run metadata
    #[serde(default = "default_note")]
    pub note: String,

    /// Project identifier carried into run metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Virtual user executor
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Time in-flight iterations get to finish once the scenario ends
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_graceful_stop"
    )]
    pub graceful_stop: Duration,

    /// Think time between flow steps
    #[serde(default)]
    pub pause: PauseConfig,
}

/// Virtual user executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExecutorConfig {
    /// Linearly ramp the number of virtual users through a list of stages
    RampingVus {
        #[serde(default = "default_start_vus")]
        start_vus: u64,

        stages: Vec<StageConfig>,

        /// Time a retired user gets to finish its iteration while ramping down
        #[serde(
            with = "crate::domains::utils::serde_duration",
            default = "default_graceful_stop"
        )]
        graceful_ramp_down: Duration,
    },

    /// A fixed number of virtual users for a fixed duration
    ConstantVus {
        vus: u64,

        #[serde(with = "crate::domains::utils::serde_duration")]
        duration: Duration,
    },
}

/// One ramp segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub duration: Duration,

    /// Virtual users active at the end of the stage
    pub target: u64,
}

/// Think-time bounds in seconds, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseConfig {
    #[serde(default = "default_pause_min")]
    pub min: u64,

    #[serde(default = "default_pause_max")]
    pub max: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            note: default_note(),
            project_id: None,
            executor: ExecutorConfig::default(),
            graceful_stop: default_graceful_stop(),
            pause: PauseConfig::default(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig::RampingVus {
            start_vus: default_start_vus(),
            stages: vec![StageConfig {
                duration: Duration::from_secs(60),
                target: 100,
            }],
            graceful_ramp_down: default_graceful_stop(),
        }
    }
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            min: default_pause_min(),
            max: default_pause_max(),
        }
    }
}

impl ExecutorConfig {
    /// Total scheduled duration, excluding graceful stop periods
    pub fn total_duration(&self) -> Duration {
        match self {
            ExecutorConfig::RampingVus { stages, .. } => stages.iter().map(|s| s.duration).sum(),
            ExecutorConfig::ConstantVus { duration, .. } => *duration,
        }
    }

    /// Highest number of virtual users the executor will ever run at once
    pub fn max_vus(&self) -> u64 {
        match self {
            ExecutorConfig::RampingVus {
                start_vus, stages, ..
            } => stages.iter().map(|s| s.target).fold(*start_vus, u64::max),
            ExecutorConfig::ConstantVus { vus, .. } => *vus,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExecutorConfig::RampingVus { .. } => "ramping-vus",
            ExecutorConfig::ConstantVus { .. } => "constant-vus",
        }
    }
}

impl Validatable for ScenarioConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.name, "name", self.domain_name())?;
        self.executor.validate()?;
        self.pause.validate()?;

        if self.graceful_stop.is_zero() {
            log::warn!("scenario.graceful_stop is 0; in-flight iterations will be interrupted at the deadline");
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scenario"
    }
}

impl Validatable for ExecutorConfig {
    fn validate(&self) -> ConfigResult<()> {
        match self {
            ExecutorConfig::RampingVus { stages, .. } => {
                if stages.is_empty() {
                    return Err(self.validation_error("ramping-vus requires at least one stage"));
                }
                if self.total_duration().is_zero() {
                    return Err(self.validation_error("ramping-vus stages have zero total duration"));
                }
                if self.max_vus() == 0 {
                    return Err(self.validation_error("ramping-vus never starts a virtual user"));
                }
            }
            ExecutorConfig::ConstantVus { vus, duration } => {
                validate_positive(*vus, "vus", self.domain_name())?;
                validate_positive(duration.as_millis(), "duration", self.domain_name())?;
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scenario.executor"
    }
}

impl Validatable for PauseConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_ordered(self.min, self.max, "pause", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "scenario.pause"
    }
}

fn default_name() -> String {
    "WooCommerce account flow".to_string()
}

fn default_note() -> String {
    "Loads the homepage, signs in, views at orders and then their account details.".to_string()
}

fn default_start_vus() -> u64 {
    1
}

fn default_graceful_stop() -> Duration {
    Duration::from_secs(10)
}

fn default_pause_min() -> u64 {
    3
}

fn default_pause_max() -> u64 {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_defaults() {
        let scenario = ScenarioConfig::default();
        assert_eq!(scenario.executor.kind(), "ramping-vus");
        assert_eq!(scenario.executor.total_duration(), Duration::from_secs(60));
        assert_eq!(scenario.executor.max_vus(), 100);
        assert_eq!(scenario.graceful_stop, Duration::from_secs(10));
        assert_eq!(scenario.pause, PauseConfig { min: 3, max: 8 });
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_executor_from_yaml() {
        let yaml = r#"
type: ramping-vus
start_vus: 2
stages:
  - duration: 30
    target: 10
  - duration: 60
    target: 0
"#;
        let executor: ExecutorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(executor.total_duration(), Duration::from_secs(90));
        assert_eq!(executor.max_vus(), 10);

        let yaml = "type: constant-vus\nvus: 5\nduration: 20\n";
        let executor: ExecutorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            executor,
            ExecutorConfig::ConstantVus {
                vus: 5,
                duration: Duration::from_secs(20)
            }
        );
    }

    #[test]
    fn test_executor_validation() {
        let empty = ExecutorConfig::RampingVus {
            start_vus: 1,
            stages: vec![],
            graceful_ramp_down: Duration::from_secs(1),
        };
        assert!(empty.validate().is_err());

        let idle = ExecutorConfig::RampingVus {
            start_vus: 0,
            stages: vec![StageConfig {
                duration: Duration::from_secs(10),
                target: 0,
            }],
            graceful_ramp_down: Duration::from_secs(1),
        };
        assert!(idle.validate().is_err());

        let constant = ExecutorConfig::ConstantVus {
            vus: 0,
            duration: Duration::from_secs(10),
        };
        assert!(constant.validate().is_err());
    }

    #[test]
    fn test_pause_validation() {
        assert!(PauseConfig { min: 0, max: 0 }.validate().is_ok());
        assert!(PauseConfig { min: 8, max: 3 }.validate().is_err());
    }
}
