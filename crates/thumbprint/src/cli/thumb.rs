//! The `thumbprint thumb` command.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use thumbprint_core::{Config, MediaProcessor};

/// Arguments for the `thumb` command.
#[derive(Args, Debug)]
pub struct ThumbArgs {
    /// Media file to thumbnail
    pub input: PathBuf,

    /// Where to write the JPEG thumbnail
    #[arg(short, long)]
    pub output: PathBuf,

    /// Longest edge in pixels (0 uses the configured default)
    #[arg(long, default_value = "0")]
    pub max_dimension: u32,

    /// Let the external transcoder scale and encode the frame
    #[arg(long)]
    pub external: bool,

    /// Bounding box for --external (0 uses the configured default)
    #[arg(long, default_value = "0", requires = "external")]
    pub scale: u32,
}

/// Execute the thumb command.
pub async fn execute(args: ThumbArgs, config: Config) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let processor = MediaProcessor::new(&config)?;

    let output = args.output.clone();
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        if args.external {
            processor.write_thumbnail(&bytes, &args.output, args.scale)?;
        } else {
            let thumb = processor.make_thumbnail(&bytes, args.max_dimension)?;
            std::fs::write(&args.output, thumb)
                .with_context(|| format!("Failed to write {}", args.output.display()))?;
        }
        Ok(())
    })
    .await??;

    tracing::info!("Thumbnail written to {}", output.display());
    Ok(())
}
