//! Record output as plain text, a JSON array, or JSON Lines.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::{ClassifiedPath, HashedPath, MediaRecord};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line per record
    Plain,
    /// A single JSON array, written on `finish`
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Some(Self::Plain),
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// A serializable record with a one-line plain-text form.
pub trait Record: Serialize {
    fn plain_line(&self) -> String;
}

impl Record for MediaRecord {
    fn plain_line(&self) -> String {
        format!(
            "{}  {}x{}  {}  {}",
            self.perceptual_hash,
            self.width,
            self.height,
            self.content_class,
            self.file_path.display()
        )
    }
}

impl Record for ClassifiedPath {
    fn plain_line(&self) -> String {
        format!("{:<15} {}", self.class.as_str(), self.file_path.display())
    }
}

impl Record for HashedPath {
    fn plain_line(&self) -> String {
        format!("{}  {}", self.perceptual_hash, self.file_path.display())
    }
}

/// Writes records in the chosen format.
///
/// JSON output is buffered until [`finish`](Self::finish) so the array is
/// always well-formed; the other formats stream.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pending: Vec<serde_json::Value>,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            format,
            pending: Vec::new(),
            items_written: 0,
        }
    }

    /// Write a single record.
    pub fn write<T: Record>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(self.writer, "{}", item.plain_line())?,
            OutputFormat::Json => {
                let value = serde_json::to_value(item).map_err(io::Error::other)?;
                self.pending.push(value);
            }
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Get the number of records written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Emit any buffered output, flush, and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, &self.pending)
                .map_err(io::Error::other)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}
