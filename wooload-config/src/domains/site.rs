//! Target site configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_http_url, validate_ordered, validate_positive, validate_required_string, Validatable,
};
use serde::{Deserialize, Serialize};

/// The site under test
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the WooCommerce site. Required to run, optional to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Send page-cache bypass cookies with every request
    #[serde(default = "crate::domains::utils::default_false")]
    pub bypass_cache: bool,

    /// Fixture accounts used by the login step
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Synthetic customer accounts: `{username_prefix}{n}` for n in the range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    #[serde(default = "default_username_prefix")]
    pub username_prefix: String,

    #[serde(default = "default_first_user")]
    pub first_user: u64,

    #[serde(default = "default_last_user")]
    pub last_user: u64,

    #[serde(default = "default_password")]
    pub password: String,

    /// Value of the `rememberme` field
    #[serde(default = "default_remember")]
    pub remember: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            username_prefix: default_username_prefix(),
            first_user: default_first_user(),
            last_user: default_last_user(),
            password: default_password(),
            remember: default_remember(),
        }
    }
}

impl Validatable for SiteConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(ref url) = self.url {
            validate_http_url(url, "url", self.domain_name())?;
        }
        self.credentials.validate()?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "site"
    }
}

impl Validatable for CredentialsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.username_prefix, "username_prefix", self.domain_name())?;
        validate_required_string(&self.password, "password", self.domain_name())?;
        validate_positive(self.first_user, "first_user", self.domain_name())?;
        validate_ordered(self.first_user, self.last_user, "user range", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "site.credentials"
    }
}

fn default_username_prefix() -> String {
    "test".to_string()
}

fn default_first_user() -> u64 {
    1
}

fn default_last_user() -> u64 {
    100
}

fn default_password() -> String {
    "3405691582".to_string()
}

fn default_remember() -> String {
    "forever".to_string()
}
