//! `config validate | generate | show`

use super::load_config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use wooload_config::WooloadConfig;

/// Handle configuration validation
pub fn handle_config_validate(config_file: &PathBuf) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!(
            "Configuration file not found: {:?}",
            config_file
        ));
    }

    match load_config(Some(config_file)) {
        Ok(config) => {
            println!("✅ Configuration file is valid");
            println!("   {}", describe(&config));
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

/// One-line description of what a run with this configuration would do
pub fn describe(config: &WooloadConfig) -> String {
    let executor = &config.scenario.executor;
    format!(
        "{} against {}: {}, up to {} VUs over {}s, think time {}-{}s{}",
        config.scenario.name,
        config.site.url.as_deref().unwrap_or("<no site url>"),
        executor.kind(),
        executor.max_vus(),
        executor.total_duration().as_secs(),
        config.scenario.pause.min,
        config.scenario.pause.max,
        if config.site.bypass_cache { ", bypassing page cache" } else { "" }
    )
}

/// Handle configuration generation
pub fn handle_config_generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating sample configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let content = WooloadConfig::generate_sample().context("Failed to render sample configuration")?;
    fs::write(output, content).context("Failed to write configuration file")?;

    println!("✅ Sample configuration generated at: {:?}", output);
    println!("📝 Set site.url to the shop you want to load");
    println!(
        "🔧 Validate with: wooload config validate --config-file {:?}",
        output
    );

    Ok(())
}

/// Handle configuration display
pub fn handle_config_show(config: &WooloadConfig, format: &str) -> Result<()> {
    match format.to_lowercase().as_str() {
        "yaml" | "yml" => {
            let yaml_output = serde_yaml::to_string(config).context("Failed to serialize to YAML")?;
            println!("{}", yaml_output);
        }
        "json" => {
            let json_output =
                serde_json::to_string_pretty(config).context("Failed to serialize to JSON")?;
            println!("{}", json_output);
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown output format: {}. Valid formats: yaml, json",
                format
            ));
        }
    }

    Ok(())
}
