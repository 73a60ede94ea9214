//! chirpd - bird species identification web service.
//!
//! Accepts uploaded audio clips over HTTP, extracts MFCC features, runs a
//! pre-trained ONNX classifier, and renders the predicted species with a
//! confidence score and illustrative image.

#![warn(missing_docs)]

pub mod assets;
pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod features;
pub mod inference;
pub mod server;
pub mod store;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ServeArgs};
use config::{Config, config_file_path, load_config_file, load_default_config, save_default_config};
use inference::SpeciesClassifier;
use std::sync::Arc;
use tracing::info;

pub use error::{Error, Result};

/// Main entry point for chirpd.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.serve.verbose, cli.serve.quiet);

    if let Some(command) = cli.command {
        return handle_command(command);
    }

    serve(&cli.serve)
}

/// Load configuration, build the classifier, and run the server.
fn serve(args: &ServeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => load_default_config()?,
    };

    // CLI overrides
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config::validate_config(&config)?;

    info!("Loading model: {}", config.model.path.display());
    let classifier = SpeciesClassifier::load(
        &config.model.path,
        &config.model.labels,
        config.inference.min_confidence,
    )?;

    let runtime = tokio::runtime::Runtime::new().map_err(|e| Error::Internal {
        message: format!("failed to create async runtime: {e}"),
    })?;

    runtime.block_on(server::serve(&config, Arc::new(classifier)))
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
    }
}

fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nEdit it to point at your model, label map, and image directory.");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed by default; -v raises it together with ours.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    fmt().with_env_filter(filter).init();
}
