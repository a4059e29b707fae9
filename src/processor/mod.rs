//! Ride file processing jobs.
//!
//! Discovery, Parquet reading and CSV writing are shared by the two
//! file-based jobs: aggregation into hourly station-pair summaries and
//! downscaling to CSV.

pub mod aggregate;
pub mod discovery;
pub mod downscale;
pub mod reader;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use self::aggregate::{RideAggregator, aggregate_rides};
pub use self::downscale::{DownscaleAction, Downscaler, sample_rows, sample_size};

use crate::constants::PREVIEW_ROWS;
use crate::models::FrameSummary;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;

/// Progress bar over a list of files, hidden when `visible` is false
pub(crate) fn file_progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Print a file's preview, length and approximate size
pub(crate) fn print_frame_report(title: &str, file_name: &str, df: &DataFrame) {
    let summary = FrameSummary::of(df);
    println!("\n{}", "######".bright_black());
    println!("{}", title.bright_yellow());
    println!("{}", file_name.bright_white().bold());
    println!("{}", df.head(Some(PREVIEW_ROWS)));
    println!("  {} {} rows", "Data length:".bright_cyan(), summary.rows);
    println!("  {} {} mb", "Data size:".bright_cyan(), summary.estimated_mb);
}
