//! Config command for managing CLI configuration

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::output::{to_json, OutputFormat};
use crate::Cli;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show config file path
    Path,
    /// Show the effective configuration
    Show,
    /// Get a config value
    Get {
        /// Config key name, e.g. encoder.url_prefix
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key name
        key: String,
        /// New value (empty clears optional values)
        value: String,
    },
    /// Initialize default config file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs, cli: &Cli) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Path => {
            println!("{}", cli.config_path().display());
        }
        ConfigCommands::Show => {
            let config = cli.load_config()?;
            match cli.output_format() {
                OutputFormat::Json => println!("{}", to_json(&config)?),
                OutputFormat::Text => print!("{}", config.to_toml()?),
            }
        }
        ConfigCommands::Get { key } => {
            let config = cli.load_config()?;
            match config.get(key) {
                Some(value) => println!("{}", value),
                None => anyhow::bail!(
                    "Unknown config key: {} (available: {})",
                    key,
                    Config::keys().join(", ")
                ),
            }
        }
        ConfigCommands::Set { key, value } => {
            let path = cli.config_path();
            let mut config = Config::load(&path)?;
            config.set(key, value)?;
            config.save(&path)?;
            tracing::info!("Updated {} in {}", key, path.display());
            if !cli.quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigCommands::Init { force } => {
            let path = cli.config_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            if !cli.quiet {
                println!("Created config file at {}", path.display());
            }
        }
    }
    Ok(())
}
