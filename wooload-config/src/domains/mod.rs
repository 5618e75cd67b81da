//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod scenario;
pub mod site;
pub mod utils;

use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main wooload configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WooloadConfig {
    /// Site under test
    #[serde(default)]
    pub site: site::SiteConfig,

    /// Virtual user scenario
    #[serde(default)]
    pub scenario: scenario::ScenarioConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl WooloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.site.validate()?;
        self.scenario.validate()?;
        self.http.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> ConfigResult<String> {
        let mut config = WooloadConfig::default();
        config.site.url = Some("https://shop.example.com".to_string());
        serde_yaml::to_string(&config).map_err(ConfigError::from)
    }
}
