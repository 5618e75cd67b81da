//! Configuration loading and environment variable handling

use crate::domains::logging::{LogFormat, LogLevel};
use crate::domains::utils::{parse_duration, parse_flag};
use crate::domains::WooloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Unprefixed variables understood for compatibility with existing run scripts
const LEGACY_SITE_URL: &str = "SITE_URL";
const LEGACY_BYPASS_CACHE: &str = "BYPASS_CACHE";
const LEGACY_PROJECT_ID: &str = "PROJECT_ID";

/// Configuration loader with environment variable support
///
/// Sources are applied in order: file (or defaults), legacy unprefixed
/// variables, then `{PREFIX}_*` variables. Later sources win.
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "WOOLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<WooloadConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: WooloadConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<WooloadConfig> {
        let mut config = WooloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<WooloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut WooloadConfig) -> ConfigResult<()> {
        self.apply_legacy_overrides(config);
        self.apply_site_overrides(&mut config.site)?;
        self.apply_scenario_overrides(&mut config.scenario)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_legacy_overrides(&self, config: &mut WooloadConfig) {
        if let Ok(url) = std::env::var(LEGACY_SITE_URL) {
            config.site.url = Some(url);
        }

        if let Ok(flag) = std::env::var(LEGACY_BYPASS_CACHE) {
            config.site.bypass_cache = parse_flag(&flag);
        }

        if let Ok(project_id) = std::env::var(LEGACY_PROJECT_ID) {
            if !project_id.is_empty() {
                config.scenario.project_id = Some(project_id);
            }
        }
    }

    /// Apply site config overrides
    fn apply_site_overrides(
        &self,
        config: &mut crate::domains::site::SiteConfig,
    ) -> ConfigResult<()> {
        if let Ok(url) = self.get_env_var("SITE_URL") {
            config.url = Some(url);
        }

        if let Ok(flag) = self.get_env_var("BYPASS_CACHE") {
            config.bypass_cache = parse_flag(&flag);
        }

        if let Ok(password) = self.get_env_var("PASSWORD") {
            config.credentials.password = password;
        }

        Ok(())
    }

    /// Apply scenario config overrides
    fn apply_scenario_overrides(
        &self,
        config: &mut crate::domains::scenario::ScenarioConfig,
    ) -> ConfigResult<()> {
        if let Ok(project_id) = self.get_env_var("PROJECT_ID") {
            config.project_id = Some(project_id);
        }
        if let Some(min) = self.parse_env_var("PAUSE_MIN", str::parse::<u64>)? {
            config.pause.min = min;
        }
        if let Some(max) = self.parse_env_var("PAUSE_MAX", str::parse::<u64>)? {
            config.pause.max = max;
        }
        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Some(timeout) = self.parse_env_var("HTTP_TIMEOUT", parse_duration)? {
            config.timeout = timeout;
        }
        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(verify_ssl) = self.parse_env_var("HTTP_VERIFY_SSL", str::parse::<bool>)? {
            config.verify_ssl = verify_ssl;
        }
        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Some(level) = self.parse_env_var("LOG_LEVEL", LogLevel::from_str)? {
            config.level = level;
        }
        if let Some(format) = self.parse_env_var("LOG_FORMAT", LogFormat::from_str)? {
            config.format = format;
        }
        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(self.env_name(name))
    }

    /// Parse a prefixed variable if it is set
    fn parse_env_var<T, E>(
        &self,
        name: &str,
        parse: impl Fn(&str) -> Result<T, E>,
    ) -> ConfigResult<Option<T>>
    where
        E: std::fmt::Display,
    {
        let Ok(raw) = self.get_env_var(name) else {
            return Ok(None);
        };
        parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::EnvError {
                name: self.env_name(name),
                value: raw.clone(),
                reason: e.to_string(),
            })
    }

    fn env_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
