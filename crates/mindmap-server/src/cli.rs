//! CLI command definitions and argument parsing.

use crate::config::{ConfigError, ServerConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tamil mind-map keyword extraction service.
#[derive(Debug, Parser)]
#[command(name = "mindmap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true, env = "MINDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend API key
    #[arg(long, global = true, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Extract an outline from a file or stdin and print it as JSON
    Extract(ExtractArgs),
}

/// Arguments for the serve command.
#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Address to bind, overrides the config file
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overrides the config file
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// File containing the Tamil text; reads stdin when omitted
    pub file: Option<PathBuf>,

    /// Print single-line JSON instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply command-line overrides
    pub fn load_config(&self) -> Result<ServerConfig, ConfigError> {
        let config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        let mut config = config.with_api_key(self.api_key.clone());

        if let Command::Serve(args) = &self.command {
            if let Some(host) = &args.host {
                config.bind_address = host.clone();
            }
            if let Some(port) = args.port {
                config.bind_port = port;
            }
        }

        Ok(config)
    }
}
