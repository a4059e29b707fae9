//! Core data structures for ridership processing.
//!
//! Defines the aggregated ride summary record, frame size summaries and
//! processing statistics used throughout the library.

use crate::constants::columns::{
    DAY, END_STATION_ID, HOUR, MEDIAN_TRIP_DUR, MEMBERSHIP_ID, MONTH, RIDE_COUNT, RIDEABLE_ID,
    START_STATION_ID,
};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Grouping key of an aggregated ride summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideKey {
    pub start_station_id: i16,
    pub end_station_id: i16,
    pub month: i16,
    pub day: i16,
    pub hour: i16,
    pub membership_id: i16,
    pub rideable_id: i16,
}

/// One row of the aggregated table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideSummary {
    pub key: RideKey,
    pub ride_count: u32,
    /// Absent when every duration in the group was null
    pub median_trip_dur: Option<f64>,
}

impl RideSummary {
    /// Read summaries back out of an aggregated frame
    pub fn from_frame(df: &DataFrame) -> Result<Vec<RideSummary>> {
        let int_column = |name: &str| -> Result<Int16Chunked> {
            Ok(df
                .column(name)?
                .as_materialized_series()
                .strict_cast(&DataType::Int16)?
                .i16()?
                .clone())
        };

        let start = int_column(START_STATION_ID)?;
        let end = int_column(END_STATION_ID)?;
        let month = int_column(MONTH)?;
        let day = int_column(DAY)?;
        let hour = int_column(HOUR)?;
        let membership = int_column(MEMBERSHIP_ID)?;
        let rideable = int_column(RIDEABLE_ID)?;

        let counts = df
            .column(RIDE_COUNT)?
            .as_materialized_series()
            .strict_cast(&DataType::UInt32)?;
        let counts = counts.u32()?;
        let medians = df
            .column(MEDIAN_TRIP_DUR)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let medians = medians.f64()?;

        let summaries = (0..df.height())
            .filter_map(|i| {
                let key = RideKey {
                    start_station_id: start.get(i)?,
                    end_station_id: end.get(i)?,
                    month: month.get(i)?,
                    day: day.get(i)?,
                    hour: hour.get(i)?,
                    membership_id: membership.get(i)?,
                    rideable_id: rideable.get(i)?,
                };
                Some(RideSummary {
                    key,
                    ride_count: counts.get(i).unwrap_or(0),
                    median_trip_dur: medians.get(i),
                })
            })
            .collect();

        Ok(summaries)
    }

    /// The `n` summaries with the highest ride counts, ties broken by key
    pub fn busiest(summaries: &[RideSummary], n: usize) -> Vec<RideSummary> {
        let mut ranked = summaries.to_vec();
        ranked.sort_by(|a, b| b.ride_count.cmp(&a.ride_count).then(a.key.cmp(&b.key)));
        ranked.truncate(n);
        ranked
    }
}

/// Shape and approximate memory footprint of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    pub rows: usize,
    pub columns: usize,
    pub estimated_mb: usize,
}

impl FrameSummary {
    pub fn of(df: &DataFrame) -> Self {
        let bytes = df.estimated_size() as f64;
        Self {
            rows: df.height(),
            columns: df.width(),
            estimated_mb: (bytes / (1u64 << 20) as f64).round() as usize,
        }
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_paths: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
