//! Ridership ETL Library
//!
//! Offline data preparation for bike-share ridership analysis.
//!
//! This library provides tools for:
//! - Aggregating monthly Parquet ride files into hourly station-pair summaries
//!   with ride counts and median trip durations
//! - Converting Parquet files to CSV, downsampling selected files to a random
//!   fraction of their rows
//! - Polling NOAA's Climate Data Online API for weather readings near a ZIP code

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod processor;
pub mod weather;

// Re-export commonly used types
pub use config::{AggregateConfig, DownscaleConfig, WeatherConfig};
pub use error::{EtlError, Result};
pub use models::{ProcessingStats, RideKey, RideSummary};
pub use processor::{Downscaler, RideAggregator, aggregate_rides, sample_rows};
pub use weather::{NcdcClient, WeatherReport};
