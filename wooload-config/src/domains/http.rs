//! HTTP client settings shared by every virtual user session

use crate::domains::utils::{default_true, serde_duration};
use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on redirects a single page load may follow
const MAX_REDIRECT_LIMIT: u32 = 20;

/// HTTP client configuration
///
/// Every VU builds its own client from these values, so pool settings are
/// per session rather than global.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout, body included
    #[serde(with = "serde_duration")]
    pub timeout: Duration,

    #[serde(with = "serde_duration")]
    pub connect_timeout: Duration,

    /// Redirects followed per request (the login POST redirects once)
    pub max_redirects: u32,

    pub user_agent: String,

    /// Set to false for staging sites with self-signed certificates
    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    /// Idle keep-alive connections a session holds per host
    pub max_idle_per_host: usize,

    #[serde(with = "serde_duration")]
    pub idle_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            max_redirects: 10,
            user_agent: concat!("wooload/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_ssl: true,
            max_idle_per_host: 1,
            idle_timeout: Duration::from_secs(30),
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.timeout.as_secs(), "timeout", self.domain_name())?;
        validate_positive(
            self.connect_timeout.as_secs(),
            "connect_timeout",
            self.domain_name(),
        )?;
        if self.connect_timeout > self.timeout {
            return Err(self.validation_error(format!(
                "connect_timeout ({}s) exceeds timeout ({}s)",
                self.connect_timeout.as_secs(),
                self.timeout.as_secs()
            )));
        }
        if self.max_redirects > MAX_REDIRECT_LIMIT {
            return Err(self.validation_error(format!(
                "max_redirects must be at most {}, got {}",
                MAX_REDIRECT_LIMIT, self.max_redirects
            )));
        }
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HttpConfig::default();
        assert!(config.user_agent.starts_with("wooload/"));
        assert_eq!(config.max_idle_per_host, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connect_timeout_cannot_exceed_timeout() {
        let config = HttpConfig {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("connect_timeout (10s) exceeds timeout (5s)"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let zero_timeout = HttpConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let redirect_loop = HttpConfig {
            max_redirects: 50,
            ..Default::default()
        };
        assert!(redirect_loop.validate().is_err());

        let blank_agent = HttpConfig {
            user_agent: "  ".to_string(),
            ..Default::default()
        };
        assert!(blank_agent.validate().is_err());
    }

    #[test]
    fn test_yaml_seconds() {
        let config: HttpConfig =
            serde_yaml::from_str("timeout: 20\nconnect_timeout: 3\nverify_ssl: false\n").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(!config.verify_ssl);
        assert_eq!(config.max_redirects, 10);
    }
}
