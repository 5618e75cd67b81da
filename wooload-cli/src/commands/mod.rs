//! Command handlers

pub mod config;
pub mod run;

use crate::cli::SiteArgs;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use wooload_config::{ConfigLoader, WooloadConfig};

/// Load configuration from file or use defaults
pub fn load_config(config_path: Option<&PathBuf>) -> Result<WooloadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Command-line flags win over file and environment
pub fn apply_site_args(config: &mut WooloadConfig, args: &SiteArgs) {
    if let Some(url) = &args.site_url {
        config.site.url = Some(url.clone());
    }
    if args.bypass_cache {
        config.site.bypass_cache = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_args_override_config() {
        let mut config = WooloadConfig::default();
        config.site.url = Some("https://old.example.com".to_string());

        apply_site_args(
            &mut config,
            &SiteArgs {
                site_url: Some("https://shop.example.com".to_string()),
                bypass_cache: true,
                json: false,
            },
        );
        assert_eq!(config.site.url.as_deref(), Some("https://shop.example.com"));
        assert!(config.site.bypass_cache);

        // An unset flag never turns bypass off
        apply_site_args(&mut config, &SiteArgs::default());
        assert!(config.site.bypass_cache);
        assert_eq!(config.site.url.as_deref(), Some("https://shop.example.com"));
    }
}
