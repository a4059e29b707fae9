//! Parquet loading for ride files
//!
//! Reads whole files into memory on the blocking pool and checks
//! required columns up front.

use crate::error::{EtlError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::debug;

/// Read a Parquet file into a DataFrame
pub async fn read_parquet(path: &Path) -> Result<DataFrame> {
    let path = path.to_path_buf();
    task::spawn_blocking(move || read_parquet_blocking(&path)).await?
}

/// Blocking variant of [`read_parquet`]
pub fn read_parquet_blocking(path: &Path) -> Result<DataFrame> {
    let file = std::fs::File::open(path)?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| EtlError::ProcessingFailed {
            path: path.to_path_buf(),
            reason: format!("Failed to read parquet: {}", e),
        })?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Fail with the first of `columns` absent from `df`
pub fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<()> {
    let schema = df.schema();
    match columns.iter().find(|name| !schema.contains(name)) {
        Some(missing) => Err(EtlError::MissingColumn {
            path: PathBuf::from(path),
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}
