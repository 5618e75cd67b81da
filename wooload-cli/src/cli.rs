//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use wooload_config::parse_duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Overrides shared by the commands that talk to a site
#[derive(clap::Args, Debug, Default)]
pub struct SiteArgs {
    /// Base URL of the WooCommerce site (overrides SITE_URL)
    #[arg(long, value_name = "URL")]
    pub site_url: Option<String>,

    /// Send page-cache bypass cookies with every request
    #[arg(long)]
    pub bypass_cache: bool,

    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the load test scenario
    Run {
        #[command(flatten)]
        site: SiteArgs,

        /// Run a fixed number of virtual users instead of the configured executor
        #[arg(long, value_name = "N", requires = "duration")]
        vus: Option<u64>,

        /// How long to run --vus for, e.g. `90`, `30s` or `5m`
        #[arg(long, value_name = "DURATION", requires = "vus", value_parser = parse_duration)]
        duration: Option<Duration>,
    },

    /// Run a single iteration of the account flow and report its checks
    Check {
        #[command(flatten)]
        site: SiteArgs,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "wooload",
            "--log-level",
            "debug",
            "run",
            "--site-url",
            "https://shop.example.com",
            "--bypass-cache",
            "--vus",
            "5",
            "--duration",
            "2m",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Commands::Run { site, vus, duration }) => {
                assert_eq!(site.site_url.as_deref(), Some("https://shop.example.com"));
                assert!(site.bypass_cache);
                assert!(!site.json);
                assert_eq!(vus, Some(5));
                assert_eq!(duration, Some(Duration::from_secs(120)));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_vus_requires_duration() {
        assert!(Cli::try_parse_from(["wooload", "run", "--vus", "5"]).is_err());
    }
}
