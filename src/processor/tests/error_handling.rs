//! Error handling tests for the file jobs

use super::write_parquet;
use crate::config::{AggregateConfig, DownscaleConfig};
use crate::error::EtlError;
use crate::processor::{Downscaler, RideAggregator};
use polars::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_data_directory() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nonexistent");

    let config = AggregateConfig::default()
        .with_data_dir(&missing)
        .without_progress();
    match RideAggregator::new(config).process().await {
        Err(EtlError::DataDirNotFound { path }) => assert_eq!(path, missing),
        other => panic!("Expected DataDirNotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_required_column() {
    let temp_dir = TempDir::new().unwrap();
    let mut df = df!(
        "ride_id" => ["a"],
        "started_at" => ["2024-06-01 08:00:00"],
        "start_station_id" => [1i64],
        "end_station_id" => [2i64],
        "membership_id" => [0i64],
        "rideable_id" => [0i64]
    )
    .unwrap();
    write_parquet(temp_dir.path(), "202406-broken.parquet", &mut df);

    let config = AggregateConfig::default()
        .with_data_dir(temp_dir.path())
        .without_progress();
    match RideAggregator::new(config).process().await {
        Err(EtlError::MissingColumn { column, .. }) => assert_eq!(column, "trip_duration"),
        other => panic!("Expected MissingColumn error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_fraction_touches_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let mut df = df!("ride_id" => ["a", "b"]).unwrap();
    write_parquet(temp_dir.path(), "2024-rides.parquet", &mut df);

    let config = DownscaleConfig::default()
        .with_data_dir(temp_dir.path())
        .with_fraction(2.0)
        .without_progress();
    let result = Downscaler::new(config).process().await;

    assert!(matches!(result, Err(EtlError::InvalidFraction { .. })));
    assert!(!temp_dir.path().join("2024-rides.csv").exists());
}

#[tokio::test]
async fn test_corrupt_parquet_aborts_downscale() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("2024-bad.parquet"), "garbage").unwrap();

    let config = DownscaleConfig::default()
        .with_data_dir(temp_dir.path())
        .without_progress();
    let result = Downscaler::new(config).process().await;

    assert!(matches!(result, Err(EtlError::ProcessingFailed { .. })));
}
