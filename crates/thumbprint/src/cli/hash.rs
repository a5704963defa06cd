//! The `thumbprint hash` command.
//!
//! Files are hashed concurrently, one blocking task per file, bounded by a
//! semaphore. Output order follows the order of the arguments.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use thumbprint_core::{Config, HashedPath, MediaProcessor, OutputWriter};

use super::types::OutputFormat;

/// Arguments for the `hash` command.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Files to hash
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Hash resolution (edge of the square grid; overrides config)
    #[arg(short, long)]
    pub resolution: Option<u32>,

    /// Number of files hashed at once
    #[arg(short, long, default_value = "4")]
    pub parallel: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

/// Execute the hash command.
pub async fn execute(args: HashArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(resolution) = args.resolution {
        config.hash.resolution = resolution;
    }
    let processor = Arc::new(MediaProcessor::new(&config)?);
    if !processor.transcoder_available() {
        tracing::debug!(
            "{} not found; only natively decodable images can be hashed",
            config.transcoder.program
        );
    }

    let semaphore = Arc::new(Semaphore::new(args.parallel.max(1)));
    let mut handles = Vec::with_capacity(args.files.len());

    for path in args.files {
        let permit = semaphore.clone().acquire_owned().await?;
        let processor = processor.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let result = processor.hash_file(&path);
            drop(permit);
            (path, result)
        }));
    }

    let mut writer = OutputWriter::new(std::io::stdout(), args.format.into());
    let mut failed = 0usize;

    for handle in handles {
        match handle.await {
            Ok((path, Ok(hash))) => writer.write(&HashedPath {
                file_path: path,
                perceptual_hash: hash.to_hex(),
            })?,
            Ok((path, Err(e))) => {
                tracing::error!("{}: {}", path.display(), e);
                failed += 1;
            }
            Err(e) => {
                tracing::error!("Hash task panicked: {e}");
                failed += 1;
            }
        }
    }

    let written = writer.items_written();
    writer.finish()?;
    tracing::debug!("Hashed {} file(s), {} failed", written, failed);

    if failed > 0 {
        anyhow::bail!("{failed} file(s) could not be hashed");
    }
    Ok(())
}
