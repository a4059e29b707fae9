//! Ride aggregation module
//!
//! Groups individual rides by station pair, calendar hour, membership and
//! vehicle type, producing a ride count and a median trip duration per
//! group. Counts and medians are computed as two aggregations over the same
//! key and merged with an inner join, so only keys present on both sides
//! survive.

use super::discovery::{FileDiscovery, file_name};
use super::reader::{read_parquet, require_columns};
use super::writer::CsvFileWriter;
use super::{file_progress_bar, print_frame_report};

use crate::config::AggregateConfig;
use crate::constants::columns::{
    DAY, GROUP_COLUMNS, HOUR, INDEX, MEDIAN_TRIP_DUR, MONTH, REQUIRED_RIDE_COLUMNS, RIDE_COUNT,
    RIDE_ID, STARTED_AT, TRIP_DURATION,
};
use crate::error::{EtlError, Result};
use crate::models::{FrameSummary, ProcessingStats, RideSummary};

use colored::*;
use polars::prelude::*;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Grouping key as column expressions
fn key_exprs() -> Vec<Expr> {
    GROUP_COLUMNS.iter().map(|name| col(*name)).collect()
}

/// Expression yielding `started_at` as a datetime, parsing strings when needed
fn started_at_expr(dtype: &DataType) -> Result<Expr> {
    match dtype {
        DataType::Datetime(_, _) => Ok(col(STARTED_AT)),
        DataType::String => Ok(col(STARTED_AT).str().to_datetime(
            Some(TimeUnit::Microseconds),
            None,
            StrptimeOptions::default(),
            lit("raise"),
        )),
        other => Err(EtlError::InvalidColumnType {
            column: STARTED_AT.to_string(),
            expected: "datetime or string",
            found: other.to_string(),
        }),
    }
}

/// Normalize raw rides to the grouping key plus the aggregated columns.
///
/// Calendar parts are derived from `started_at`, key columns are coerced to
/// Int16 and rows with an incomplete key are dropped.
pub fn prepare_rides(df: DataFrame) -> Result<LazyFrame> {
    let started_at = started_at_expr(df.column(STARTED_AT)?.dtype())?;

    let key_casts: Vec<Expr> = GROUP_COLUMNS
        .iter()
        .map(|name| col(*name).strict_cast(DataType::Int16))
        .collect();

    let complete_key = GROUP_COLUMNS
        .iter()
        .map(|name| col(*name).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true));

    let mut selection = key_exprs();
    selection.push(col(RIDE_ID).cast(DataType::String));
    selection.push(col(TRIP_DURATION).cast(DataType::Float64));

    Ok(df
        .lazy()
        .with_columns([
            started_at.clone().dt().month().alias(MONTH),
            started_at.clone().dt().day().alias(DAY),
            started_at.dt().hour().alias(HOUR),
        ])
        .with_columns(key_casts)
        .filter(complete_key)
        .select(selection))
}

/// Aggregate prepared rides into one summary row per key
pub fn summarize(rides: LazyFrame) -> LazyFrame {
    let keys = key_exprs();

    let ride_counts = rides
        .clone()
        .group_by(keys.clone())
        .agg([col(RIDE_ID)
            .count()
            .cast(DataType::UInt32)
            .alias(RIDE_COUNT)]);

    let median_trip_dur = rides
        .group_by(keys.clone())
        .agg([col(TRIP_DURATION).median().alias(MEDIAN_TRIP_DUR)]);

    let mut output = keys.clone();
    output.push(col(RIDE_COUNT));
    output.push(col(MEDIAN_TRIP_DUR));

    ride_counts
        .join(
            median_trip_dur,
            keys.clone(),
            keys.clone(),
            JoinArgs::new(JoinType::Inner),
        )
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .select(output)
        .with_row_index(INDEX, None)
}

/// Aggregate several prepared frames as one table
pub fn summarize_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    if frames.is_empty() {
        return Err(EtlError::Configuration {
            message: "No ride frames to aggregate".to_string(),
        });
    }

    let lazy_frames: Vec<LazyFrame> = frames.into_iter().map(|df| df.lazy()).collect();
    let combined = concat(lazy_frames, UnionArgs::default())?;
    Ok(summarize(combined).collect()?)
}

/// Aggregate a single frame of raw rides
pub fn aggregate_rides(df: DataFrame) -> Result<DataFrame> {
    let prepared = prepare_rides(df)?.collect()?;
    summarize_frames(vec![prepared])
}

/// Aggregation job over every matching ride file in a data directory
#[derive(Debug)]
pub struct RideAggregator {
    config: AggregateConfig,
    discovery: FileDiscovery,
}

impl RideAggregator {
    pub fn new(config: AggregateConfig) -> Self {
        let discovery = FileDiscovery::new(config.data_dir.clone())
            .with_prefix(config.file_prefix.clone())
            .with_suffix(config.file_suffix.clone());
        Self { config, discovery }
    }

    /// Main processing entry point
    pub async fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        self.config.validate()?;

        let output_path = self.config.output_path();
        println!("{}", "Starting ride aggregation".bright_green().bold());
        println!(
            "  {} {}",
            "Data directory:".bright_cyan(),
            self.config.data_dir.display()
        );
        println!("  {} {}", "Output:".bright_cyan(), output_path.display());

        let files = self.discovery.discover().await?;
        if files.is_empty() {
            warn!(
                "No files matching {}*{} in {}",
                self.config.file_prefix,
                self.config.file_suffix,
                self.config.data_dir.display()
            );
            return Ok(ProcessingStats {
                processing_time_ms: start_time.elapsed().as_millis(),
                ..Default::default()
            });
        }
        info!("Aggregating {} ride files", files.len());

        let progress = file_progress_bar(files.len(), self.config.show_progress);
        let mut prepared = Vec::with_capacity(files.len());
        let mut input_rows = 0usize;

        for path in &files {
            let name = file_name(path).unwrap_or("unknown").to_string();
            progress.set_message(format!("Reading: {}", name));

            let df = read_parquet(path).await?;
            require_columns(&df, REQUIRED_RIDE_COLUMNS, path)?;

            progress.suspend(|| print_frame_report("Ride data", &name, &df));
            input_rows += df.height();

            let rides = task::spawn_blocking(move || -> Result<DataFrame> {
                Ok(prepare_rides(df)?.collect()?)
            })
            .await??;
            debug!("{}: {} rides with a complete key", name, rides.height());

            prepared.push(rides);
            progress.inc(1);
        }
        progress.finish_and_clear();

        let aggregated = task::spawn_blocking(move || summarize_frames(prepared)).await??;
        let summary = FrameSummary::of(&aggregated);
        println!("\n{}", "Agg data".bright_yellow());
        println!("  {} {} rows", "Data length:".bright_cyan(), summary.rows);
        println!("  {} {} mb", "Data size:".bright_cyan(), summary.estimated_mb);

        if self.config.top_groups > 0 {
            let summaries = RideSummary::from_frame(&aggregated)?;
            print_busiest(&RideSummary::busiest(&summaries, self.config.top_groups));
        }

        let output_rows = CsvFileWriter::new(output_path.clone())
            .write(aggregated)
            .await?;

        let total_time = start_time.elapsed().as_millis();
        println!("\n{}", "Aggregation Summary".bright_green().bold());
        println!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            total_time.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Files processed:".bright_cyan(),
            files.len().to_string().bright_white()
        );
        println!(
            "  {} {} -> {}",
            "Rows:".bright_cyan(),
            input_rows.to_string().bright_white(),
            output_rows.to_string().bright_white().bold()
        );

        Ok(ProcessingStats {
            files_processed: files.len(),
            input_rows,
            output_rows,
            output_paths: vec![output_path],
            processing_time_ms: total_time,
        })
    }
}

fn print_busiest(busiest: &[RideSummary]) {
    if busiest.is_empty() {
        return;
    }

    println!("  {}", "Busiest groups:".bright_cyan());
    for summary in busiest {
        let key = &summary.key;
        let median = summary
            .median_trip_dur
            .map(|m| format!("{:.1}", m))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    {:>5} -> {:<5} {:02}-{:02} {:02}h m{} r{}  {} rides, median {}",
            key.start_station_id,
            key.end_station_id,
            key.month,
            key.day,
            key.hour,
            key.membership_id,
            key.rideable_id,
            summary.ride_count.to_string().bright_white().bold(),
            median
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::columns::{
        END_STATION_ID, MEMBERSHIP_ID, RIDEABLE_ID, START_STATION_ID,
    };
    use chrono::NaiveDate;

    fn sample_rides() -> DataFrame {
        df!(
            RIDE_ID => ["r1", "r2", "r3", "r4", "r5", "r6"],
            STARTED_AT => [
                "2024-06-01 08:05:00",
                "2024-06-01 08:40:00",
                "2024-06-01 08:59:59",
                "2024-06-01 09:00:00",
                "2024-06-02 08:10:00",
                "2024-06-01 08:20:00",
            ],
            START_STATION_ID => [1i64, 1, 1, 1, 1, 2],
            END_STATION_ID => [2i64, 2, 2, 2, 2, 1],
            MEMBERSHIP_ID => [0i64, 0, 0, 0, 0, 1],
            RIDEABLE_ID => [1i64, 1, 1, 1, 1, 0],
            TRIP_DURATION => [100.0, 300.0, 200.0, 50.0, 75.0, 500.0]
        )
        .unwrap()
    }

    #[test]
    fn test_output_columns_in_order() {
        let aggregated = aggregate_rides(sample_rides()).unwrap();
        let names: Vec<String> = aggregated
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                INDEX,
                START_STATION_ID,
                END_STATION_ID,
                MONTH,
                DAY,
                HOUR,
                MEMBERSHIP_ID,
                RIDEABLE_ID,
                RIDE_COUNT,
                MEDIAN_TRIP_DUR
            ]
        );
        for name in GROUP_COLUMNS {
            assert_eq!(aggregated.column(name).unwrap().dtype(), &DataType::Int16);
        }
    }

    #[test]
    fn test_groups_by_hour_and_day() {
        let aggregated = aggregate_rides(sample_rides()).unwrap();
        let summaries = RideSummary::from_frame(&aggregated).unwrap();

        // (1->2, 06-01 08h), (1->2, 06-01 09h), (1->2, 06-02 08h), (2->1, 06-01 08h)
        assert_eq!(summaries.len(), 4);

        let first = &summaries[0];
        assert_eq!(first.key.start_station_id, 1);
        assert_eq!((first.key.month, first.key.day, first.key.hour), (6, 1, 8));
        assert_eq!(first.ride_count, 3);
        assert_eq!(first.median_trip_dur, Some(200.0));
    }

    #[test]
    fn test_even_group_median_averages_middle_values() {
        let df = df!(
            RIDE_ID => ["a", "b", "c", "d"],
            STARTED_AT => [
                "2024-06-03 17:01:00",
                "2024-06-03 17:15:00",
                "2024-06-03 17:30:00",
                "2024-06-03 17:45:00",
            ],
            START_STATION_ID => [4i32, 4, 4, 4],
            END_STATION_ID => [9i32, 9, 9, 9],
            MEMBERSHIP_ID => [1i32, 1, 1, 1],
            RIDEABLE_ID => [2i32, 2, 2, 2],
            TRIP_DURATION => [10i64, 40, 20, 1000]
        )
        .unwrap();

        let summaries = RideSummary::from_frame(&aggregate_rides(df).unwrap()).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].ride_count, 4);
        assert_eq!(summaries[0].median_trip_dur, Some(30.0));
    }

    #[test]
    fn test_count_skips_null_ride_ids_and_median_skips_null_durations() {
        let df = df!(
            RIDE_ID => [Some("a"), None, Some("c")],
            STARTED_AT => [
                "2024-06-03 10:00:00",
                "2024-06-03 10:10:00",
                "2024-06-03 10:20:00",
            ],
            START_STATION_ID => [1i32, 1, 1],
            END_STATION_ID => [1i32, 1, 1],
            MEMBERSHIP_ID => [0i32, 0, 0],
            RIDEABLE_ID => [0i32, 0, 0],
            TRIP_DURATION => [Some(10.0), Some(20.0), None]
        )
        .unwrap();

        let summaries = RideSummary::from_frame(&aggregate_rides(df).unwrap()).unwrap();
        assert_eq!(summaries[0].ride_count, 2);
        assert_eq!(summaries[0].median_trip_dur, Some(15.0));
    }

    #[test]
    fn test_rows_with_null_key_are_excluded() {
        let df = df!(
            RIDE_ID => ["a", "b"],
            STARTED_AT => ["2024-06-03 10:00:00", "2024-06-03 10:10:00"],
            START_STATION_ID => [Some(1i32), None],
            END_STATION_ID => [1i32, 1],
            MEMBERSHIP_ID => [0i32, 0],
            RIDEABLE_ID => [0i32, 0],
            TRIP_DURATION => [10.0, 20.0]
        )
        .unwrap();

        let aggregated = aggregate_rides(df).unwrap();
        assert_eq!(aggregated.height(), 1);
    }

    #[test]
    fn test_datetime_column_is_used_directly() {
        let started_at = vec![
            NaiveDate::from_ymd_opt(2024, 6, 7)
                .unwrap()
                .and_hms_opt(23, 30, 0)
                .unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 7)
                .unwrap()
                .and_hms_opt(23, 45, 0)
                .unwrap(),
        ];
        let df = df!(
            RIDE_ID => ["a", "b"],
            STARTED_AT => started_at,
            START_STATION_ID => [3i32, 3],
            END_STATION_ID => [5i32, 5],
            MEMBERSHIP_ID => [0i32, 0],
            RIDEABLE_ID => [1i32, 1],
            TRIP_DURATION => [60.0, 120.0]
        )
        .unwrap();

        let summaries = RideSummary::from_frame(&aggregate_rides(df).unwrap()).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!((summaries[0].key.day, summaries[0].key.hour), (7, 23));
        assert_eq!(summaries[0].ride_count, 2);
        assert_eq!(summaries[0].median_trip_dur, Some(90.0));
    }

    #[test]
    fn test_out_of_range_station_id_is_an_error() {
        let df = df!(
            RIDE_ID => ["a"],
            STARTED_AT => ["2024-06-03 10:00:00"],
            START_STATION_ID => [70_000i64],
            END_STATION_ID => [1i64],
            MEMBERSHIP_ID => [0i64],
            RIDEABLE_ID => [0i64],
            TRIP_DURATION => [10.0]
        )
        .unwrap();

        assert!(aggregate_rides(df).is_err());
    }

    #[test]
    fn test_unsupported_started_at_type_is_rejected() {
        let df = df!(
            RIDE_ID => ["a"],
            STARTED_AT => [1.5f64],
            START_STATION_ID => [1i64],
            END_STATION_ID => [1i64],
            MEMBERSHIP_ID => [0i64],
            RIDEABLE_ID => [0i64],
            TRIP_DURATION => [10.0]
        )
        .unwrap();

        match aggregate_rides(df) {
            Err(EtlError::InvalidColumnType { column, found, .. }) => {
                assert_eq!(column, STARTED_AT);
                assert_eq!(found, "f64");
            }
            other => panic!("expected InvalidColumnType, got {:?}", other.map(|df| df.shape())),
        }
    }

    #[test]
    fn test_index_column_counts_from_zero() {
        let aggregated = aggregate_rides(sample_rides()).unwrap();
        let index = aggregated
            .column(INDEX)
            .unwrap()
            .as_materialized_series()
            .cast(&DataType::UInt64)
            .unwrap();
        let values: Vec<Option<u64>> = index.u64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_summarize_frames_rejects_empty_input() {
        assert!(summarize_frames(Vec::new()).is_err());
    }
}
