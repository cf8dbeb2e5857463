//! CLI module for Tollgate
//!
//! Command-line interface definitions and handlers for the Tollgate
//! AI console server.
//!
//! # Commands
//!
//! - `serve` - Start the Tollgate server
//! - `config` - Configuration utilities (init)
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! tollgate serve
//!
//! # Write a starter config file
//! tollgate config init -o tollgate.toml
//! ```

pub mod config;
pub mod serve;

pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tollgate - Credit-metered AI API console
#[derive(Parser, Debug)]
#[command(
    name = "tollgate",
    version,
    about = "Credit-metered generative AI API console"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Tollgate server
    Serve(ServeArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "tollgate.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "TOLLGATE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "TOLLGATE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TOLLGATE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "tollgate.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["tollgate", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("tollgate.toml"));
                assert!(args.port.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["tollgate", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["tollgate", "serve", "-c", "custom.toml"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.config, PathBuf::from("custom.toml")),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli = Cli::try_parse_from(["tollgate", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => assert!(args.force),
            _ => panic!("Expected Config Init command"),
        }
    }
}
