//! Pipeline tests for the processor module
//!
//! Exercise the aggregation and downscale jobs end to end against
//! temporary data directories holding real Parquet files.

pub mod error_handling;

use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Write a frame as Parquet into `dir`, returning its path
pub fn write_parquet(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();
    path
}

/// Read a written CSV back for assertions
pub fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}

/// A month of synthetic rides: `n` rides cycling through stations, hours and tiers
pub fn synthetic_rides(n: usize, month: u32) -> DataFrame {
    let ride_ids: Vec<String> = (0..n).map(|i| format!("ride-{month}-{i}")).collect();
    let started_at: Vec<String> = (0..n)
        .map(|i| {
            format!(
                "2024-{:02}-{:02} {:02}:{:02}:00",
                month,
                1 + (i % 3),
                7 + (i % 4),
                (i * 7) % 60
            )
        })
        .collect();
    let start: Vec<i64> = (0..n).map(|i| (i % 5) as i64 + 100).collect();
    let end: Vec<i64> = (0..n).map(|i| (i % 2) as i64 + 200).collect();
    let membership: Vec<i64> = (0..n).map(|i| (i % 2) as i64).collect();
    let rideable: Vec<i64> = (0..n).map(|i| (i % 3) as i64).collect();
    let duration: Vec<f64> = (0..n).map(|i| 60.0 + (i * 37 % 900) as f64).collect();

    df!(
        "ride_id" => ride_ids,
        "started_at" => started_at,
        "start_station_id" => start,
        "end_station_id" => end,
        "membership_id" => membership,
        "rideable_id" => rideable,
        "trip_duration" => duration
    )
    .unwrap()
}
