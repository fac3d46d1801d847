//! Linkage CLI - Command line interface for the JSON:API document codec

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod blog;
mod codecs;
mod commands;
mod config;
mod output;

use commands::{completions, config as config_cmd, encode, negotiate};
use config::{config_file_path, Config};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "linkage")]
#[command(author, version, about = "Encode object graphs as JSON:API documents")]
pub struct Cli {
    /// Config file (default: <config dir>/linkage/config.toml)
    #[arg(short, long, env = "LINKAGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format: text, json
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Get the config file path
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }

    pub fn load_config(&self) -> anyhow::Result<Config> {
        Config::load(&self.config_path())
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode blog data as a JSON:API document
    Encode(encode::EncodeArgs),
    /// Negotiate Accept / Content-Type against the configured media types
    Negotiate(negotiate::NegotiateArgs),
    /// Manage configuration
    Config(config_cmd::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting linkage CLI");

    match &cli.command {
        Commands::Encode(args) => encode::run(args, &cli)?,
        Commands::Negotiate(args) => negotiate::run(args, &cli)?,
        Commands::Config(args) => config_cmd::run(args, &cli)?,
        Commands::Completions(args) => completions::run(args)?,
    }

    Ok(())
}
