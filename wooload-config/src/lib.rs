//! Domain-driven configuration management for wooload
//!
//! Configuration is split by functional domain (site, scenario, http, logging),
//! loaded from YAML with environment variable overrides, and validated per domain.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    scenario::{ExecutorConfig, PauseConfig, ScenarioConfig, StageConfig},
    site::{CredentialsConfig, SiteConfig},
    WooloadConfig,
};

// Re-export utilities
pub use domains::utils::{parse_duration, serde_duration};
