//! The `thumbprint classify` command.

use clap::Args;
use std::path::PathBuf;
use thumbprint_core::pipeline::normalize::sniff_class;
use thumbprint_core::{classify_path, ClassifiedPath, OutputWriter};

use super::types::OutputFormat;

/// Arguments for the `classify` command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Files to classify
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Classify by file content instead of extension
    #[arg(long)]
    pub sniff: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub format: OutputFormat,
}

/// Execute the classify command.
pub async fn execute(args: ClassifyArgs) -> anyhow::Result<()> {
    let mut writer = OutputWriter::new(std::io::stdout(), args.format.into());

    for path in args.files {
        let class = if args.sniff {
            let bytes = tokio::fs::read(&path).await?;
            let (extension, class) = sniff_class(&bytes);
            tracing::debug!("{}: sniffed {:?}", path.display(), extension);
            class
        } else {
            classify_path(&path)
        };
        writer.write(&ClassifiedPath {
            file_path: path,
            class,
        })?;
    }

    writer.finish()?;
    Ok(())
}
