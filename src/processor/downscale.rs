//! Downscale module for ride files
//!
//! Converts Parquet files to CSV in place. Files carrying the sample prefix
//! are reduced to a uniform random sample without replacement; every other
//! Parquet file is converted whole.

use super::discovery::{FileDiscovery, file_name};
use super::reader::read_parquet;
use super::writer::CsvFileWriter;
use super::{file_progress_bar, print_frame_report};

use crate::config::DownscaleConfig;
use crate::constants::columns::INDEX;
use crate::constants::{PARQUET_LOOSE_SUFFIX, PARQUET_SUFFIX};
use crate::error::Result;
use crate::models::ProcessingStats;

use colored::*;
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info};

/// What to do with a file found in the data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownscaleAction {
    /// Keep a random fraction of rows, tagged with their source positions
    Sample,
    /// Keep every row
    Convert,
}

impl DownscaleAction {
    /// Classify a file name; `None` means the file is left alone
    pub fn classify(file_name: &str, sample_prefix: &str) -> Option<Self> {
        if file_name.starts_with(sample_prefix) && file_name.ends_with(PARQUET_SUFFIX) {
            Some(DownscaleAction::Sample)
        } else if file_name.ends_with(PARQUET_LOOSE_SUFFIX) {
            Some(DownscaleAction::Convert)
        } else {
            None
        }
    }
}

/// Take a uniform random sample of `fraction` of the rows without replacement.
///
/// The result keeps a leading index column with each row's position in `df`.
/// Row count is `fraction * height` rounded half to even.
pub fn sample_rows(df: &DataFrame, fraction: f64, seed: Option<u64>) -> Result<DataFrame> {
    let indexed = df.with_row_index(INDEX.into(), None)?;
    Ok(indexed.sample_n_literal(sample_size(df.height(), fraction), false, true, seed)?)
}

/// Rows kept when sampling `fraction` of `height` rows
pub fn sample_size(height: usize, fraction: f64) -> usize {
    let n = (fraction * height as f64).round_ties_even() as usize;
    n.min(height)
}

/// Downscale job over every Parquet file in a data directory
#[derive(Debug)]
pub struct Downscaler {
    config: DownscaleConfig,
    discovery: FileDiscovery,
}

impl Downscaler {
    pub fn new(config: DownscaleConfig) -> Self {
        let discovery =
            FileDiscovery::new(config.data_dir.clone()).with_suffix(PARQUET_LOOSE_SUFFIX);
        Self { config, discovery }
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        println!("{}", "Starting downscale".bright_green().bold());
        println!(
            "  {} {}",
            "Data directory:".bright_cyan(),
            self.config.data_dir.display()
        );
        println!(
            "  {} {} (files starting with '{}')",
            "Sample fraction:".bright_cyan(),
            self.config.fraction,
            self.config.sample_prefix
        );

        let files = self.discovery.discover().await?;
        info!("Found {} parquet files", files.len());

        let progress = file_progress_bar(files.len(), self.config.show_progress);
        let mut stats = ProcessingStats::default();

        for path in &files {
            let Some(name) = file_name(path) else {
                continue;
            };
            let Some(action) = DownscaleAction::classify(name, &self.config.sample_prefix) else {
                debug!("Skipping {}", name);
                progress.inc(1);
                continue;
            };

            progress.set_message(format!("Converting: {}", name));
            let df = read_parquet(path).await?;
            let input_rows = df.height();

            let output = match action {
                DownscaleAction::Sample => {
                    progress.suspend(|| print_frame_report("Input data", name, &df));
                    let fraction = self.config.fraction;
                    let seed = self.config.seed;
                    task::spawn_blocking(move || sample_rows(&df, fraction, seed)).await??
                }
                DownscaleAction::Convert => df,
            };

            let output_path = self.config.output_path_for(name);
            let output_rows = CsvFileWriter::new(output_path.clone())
                .write(output)
                .await?;

            if action == DownscaleAction::Sample {
                progress.suspend(|| {
                    println!(
                        "  {} {}",
                        "Output data size:".bright_cyan(),
                        output_rows.to_string().bright_white().bold()
                    )
                });
            }
            debug!(
                "{:?} {} -> {} ({} -> {} rows)",
                action,
                name,
                output_path.display(),
                input_rows,
                output_rows
            );

            stats.files_processed += 1;
            stats.input_rows += input_rows;
            stats.output_rows += output_rows;
            stats.output_paths.push(output_path);
            progress.inc(1);
        }
        progress.finish_and_clear();

        stats.processing_time_ms = start_time.elapsed().as_millis();
        println!("\n{}", "Downscale Summary".bright_green().bold());
        println!(
            "  {} {}",
            "Files converted:".bright_cyan(),
            stats.files_processed.to_string().bright_white()
        );
        println!(
            "  {} {} -> {}",
            "Rows:".bright_cyan(),
            stats.input_rows.to_string().bright_white(),
            stats.output_rows.to_string().bright_white().bold()
        );

        Ok(stats)
    }

    /// Data directory being downscaled
    pub fn data_dir(&self) -> &Path {
        self.discovery.data_dir()
    }
}
