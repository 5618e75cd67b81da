use anyhow::Result;
use tracing_subscriber::EnvFilter;
use wooload_config::{LogFormat, LoggingConfig};

/// Build the filter for a base level plus optional extra directives
///
/// Falls back to `RUST_LOG`, then to `info`, when the directives do not parse.
pub fn build_env_filter(level: &str, directives: Option<&str>) -> EnvFilter {
    let filter_str = match directives {
        Some(extra) if !extra.trim().is_empty() => format!("{},{}", level, extra.trim()),
        _ => level.to_string(),
    };

    EnvFilter::try_new(&filter_str)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging from configuration
pub fn init_logging_from_config(config: &LoggingConfig) -> Result<()> {
    let directives = config.effective_directives();
    let env_filter = build_env_filter(config.level.as_str(), directives.as_deref());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    // try_init so a second initialisation (tests, embedding) is harmless
    let result = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

/// Initialize simple tracing for basic console output
pub fn init_simple_tracing(log_level: &str) -> Result<()> {
    let env_filter = build_env_filter(log_level, None);

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wooload_config::LogLevel;

    #[test]
    fn test_build_env_filter_with_directives() {
        let filter = build_env_filter("warn", Some("wooload_runtime=debug"));
        let rendered = filter.to_string();
        assert!(rendered.contains("warn"));
        assert!(rendered.contains("wooload_runtime=debug"));
    }

    #[test]
    fn test_build_env_filter_ignores_blank_directives() {
        let filter = build_env_filter("info", Some("   "));
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_double_initialisation_is_harmless() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            ..Default::default()
        };
        assert!(init_logging_from_config(&config).is_ok());
        assert!(init_simple_tracing("info").is_ok());
    }
}
