use anyhow::{Context, Result};
use clap::Parser;
use std::str::FromStr;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{handle_config_generate, handle_config_show, handle_config_validate};
use commands::run::{constant_executor, run_check, run_scenario};
use commands::{apply_site_args, load_config};
use wooload_config::LogLevel;
use wooload_logging::{init_logging_from_config, init_simple_tracing};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config subcommands only need plain console output
    if let Some(Commands::Config { config_cmd }) = &cli.command {
        init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
        return match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
            ConfigCommands::Show { format } => {
                let config = load_config(cli.config.as_ref())?;
                handle_config_show(&config, format)
            }
        };
    }

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(level) = &cli.log_level {
        config.logging.level = LogLevel::from_str(level)
            .map_err(|_| anyhow::anyhow!("Invalid log level: {}", level))?;
    }
    init_logging_from_config(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Some(Commands::Run {
            site,
            vus,
            duration,
        }) => {
            apply_site_args(&mut config, &site);
            if let (Some(vus), Some(duration)) = (vus, duration) {
                constant_executor(&mut config, vus, duration);
                config
                    .validate_all()
                    .context("Invalid --vus/--duration override")?;
            }
            run_scenario(config, site.json).await
        }
        Some(Commands::Check { site }) => {
            apply_site_args(&mut config, &site);
            run_check(config, site.json).await
        }
        Some(Commands::Config { .. }) => Ok(()),
        None => {
            // If no subcommand is provided, print help
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
