//! Logging configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Directives appended when `quiet_transport` is on
///
/// At debug level the HTTP stack logs every connection a VU opens, which
/// drowns out the flow's own spans.
pub const QUIET_TRANSPORT_DIRECTIVES: &str = "hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,

    pub format: LogFormat,

    /// Extra filter directives, e.g. `wooload_runtime=debug`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<String>,

    /// Keep the HTTP client crates at `warn` whatever `level` says
    #[serde(default = "crate::domains::utils::default_true")]
    pub quiet_transport: bool,

    /// Include file and line in each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            directives: None,
            quiet_transport: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directives beyond the base level, if any
    pub fn effective_directives(&self) -> Option<String> {
        let user = self
            .directives
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        match (self.quiet_transport, user) {
            (true, Some(user)) => Some(format!("{},{}", QUIET_TRANSPORT_DIRECTIVES, user)),
            (true, None) => Some(QUIET_TRANSPORT_DIRECTIVES.to_string()),
            (false, user) => user.map(str::to_string),
        }
    }
}

impl Validatable for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        match &self.directives {
            Some(directives) => {
                validate_required_string(directives, "directives", self.domain_name())
            }
            None => Ok(()),
        }
    }

    fn domain_name(&self) -> &'static str {
        "logging"
    }
}

/// Verbosity, from quietest to noisiest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(LogLevel::Warn);
        }
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| format!("expected one of error, warn, info, debug, trace; got '{}'", s))
    }
}

/// Output layout of the fmt subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Compact,
    Pretty,
    /// One JSON object per event, for shipping run logs
    Json,
}

impl LogFormat {
    const ALL: [LogFormat; 4] = [
        LogFormat::Text,
        LogFormat::Compact,
        LogFormat::Pretty,
        LogFormat::Json,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LogFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| format!("expected one of text, compact, pretty, json; got '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::Trace > LogLevel::Info);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::Compact.to_string(), "compact");
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_effective_directives() {
        let mut config = LoggingConfig::default();
        assert_eq!(
            config.effective_directives().as_deref(),
            Some(QUIET_TRANSPORT_DIRECTIVES)
        );

        config.directives = Some("wooload_runtime=trace".to_string());
        assert_eq!(
            config.effective_directives().unwrap(),
            format!("{},wooload_runtime=trace", QUIET_TRANSPORT_DIRECTIVES)
        );

        config.quiet_transport = false;
        assert_eq!(
            config.effective_directives().as_deref(),
            Some("wooload_runtime=trace")
        );

        config.directives = None;
        assert_eq!(config.effective_directives(), None);
    }

    #[test]
    fn test_blank_directives_are_rejected() {
        let config = LoggingConfig {
            directives: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_alias() {
        let config: LoggingConfig = serde_yaml::from_str("level: warning\nformat: json\n").unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.quiet_transport);
    }
}
