//! Configuration error types

use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// An override variable was set but could not be parsed
    #[error("Invalid value '{value}' for {name}: {reason}")]
    EnvError {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid {domain} configuration: {message}")]
    DomainError { domain: String, message: String },
}
