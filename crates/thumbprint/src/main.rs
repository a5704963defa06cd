//! Thumbprint CLI - thumbnails and perceptual hashes for media files.
//!
//! # Usage
//!
//! ```bash
//! # Classify files by extension (or by content with --sniff)
//! thumbprint classify photo.JPG clip.mkv
//!
//! # Hash several files in parallel
//! thumbprint hash *.jpg --parallel 8 --format jsonl
//!
//! # Write a 128px thumbnail
//! thumbprint thumb clip.mp4 -o clip.jpg --max-dimension 128
//!
//! # View configuration
//! thumbprint config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Thumbprint - thumbnails and perceptual hashes for media files.
#[derive(Parser, Debug)]
#[command(name = "thumbprint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "THUMBPRINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the media class of each file
    Classify(cli::classify::ClassifyArgs),

    /// Print the perceptual hash of each file
    Hash(cli::hash::HashArgs),

    /// Write a JPEG thumbnail of a file
    Thumb(cli::thumb::ThumbArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e.into()),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `thumbprint config path`."
            );
            thumbprint_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Thumbprint v{}", thumbprint_core::VERSION);

    match cli.command {
        Commands::Classify(args) => cli::classify::execute(args).await,
        Commands::Hash(args) => cli::hash::execute(args, config).await,
        Commands::Thumb(args) => cli::thumb::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
