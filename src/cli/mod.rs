//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bird species identification web service.
#[derive(Debug, Parser)]
#[command(name = "chirpd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run. Without one the server is started.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Common options for serving.
    #[command(flatten)]
    pub serve: ServeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Options for running the server.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Path to the configuration file.
    #[arg(short, long, env = "CHIRPD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides config).
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
