//! CSV writing module for processed frames
//!
//! Writes DataFrames as comma-separated text with a header row, creating
//! the parent directory when needed.

use crate::error::{EtlError, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;

/// CSV writer for a single output path
#[derive(Debug, Clone)]
pub struct CsvFileWriter {
    output_path: PathBuf,
    separator: u8,
}

impl CsvFileWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            separator: b',',
        }
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the frame, replacing any existing file. Returns rows written.
    pub async fn write(&self, df: DataFrame) -> Result<usize> {
        let writer = self.clone();
        task::spawn_blocking(move || {
            let mut df = df;
            writer.write_blocking(&mut df)
        })
        .await?
    }

    /// Blocking variant of [`CsvFileWriter::write`]
    pub fn write_blocking(&self, df: &mut DataFrame) -> Result<usize> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = std::fs::File::create(&self.output_path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(self.separator)
            .finish(df)
            .map_err(|e| EtlError::ProcessingFailed {
                path: self.output_path.clone(),
                reason: format!("Failed to write CSV: {}", e),
            })?;

        debug!(
            "Wrote {} rows to {}",
            df.height(),
            self.output_path.display()
        );
        Ok(df.height())
    }
}
