//! Application constants for the ridership ETL
//!
//! This module contains the default values, column names and API
//! endpoints used throughout the crate.

use std::time::Duration;

// =============================================================================
// Data Directory and File Patterns
// =============================================================================

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "../data";

/// Columnar ride files carry this extension
pub const PARQUET_SUFFIX: &str = ".parquet";

/// Loose suffix used when converting files that are not sampled
pub const PARQUET_LOOSE_SUFFIX: &str = "parquet";

/// Extension appended to every text output
pub const CSV_EXTENSION: &str = "csv";

// =============================================================================
// Aggregation Defaults
// =============================================================================

/// Year-month prefix selecting ride files to aggregate
pub const DEFAULT_AGGREGATE_PREFIX: &str = "202406";

/// Output file name for the aggregated table
pub const DEFAULT_AGGREGATE_OUTPUT: &str = "agg_ride_data.csv";

/// Number of busiest groups shown in the aggregation report
pub const DEFAULT_TOP_GROUPS: usize = 5;

/// Rows shown when previewing a frame
pub const PREVIEW_ROWS: usize = 3;

// =============================================================================
// Downscale Defaults
// =============================================================================

/// Files starting with this prefix are sampled rather than converted
pub const DEFAULT_SAMPLE_PREFIX: &str = "2024";

/// Fraction of rows kept when sampling
pub const DEFAULT_SAMPLE_FRACTION: f64 = 0.1;

// =============================================================================
// Column Names
// =============================================================================

/// Column names of ride records and aggregated summaries
pub mod columns {
    pub const RIDE_ID: &str = "ride_id";
    pub const STARTED_AT: &str = "started_at";
    pub const START_STATION_ID: &str = "start_station_id";
    pub const END_STATION_ID: &str = "end_station_id";
    pub const MEMBERSHIP_ID: &str = "membership_id";
    pub const RIDEABLE_ID: &str = "rideable_id";
    pub const TRIP_DURATION: &str = "trip_duration";

    pub const MONTH: &str = "month";
    pub const DAY: &str = "day";
    pub const HOUR: &str = "hour";

    pub const RIDE_COUNT: &str = "ride_count";
    pub const MEDIAN_TRIP_DUR: &str = "median_trip_dur";

    /// Row position column prepended to written outputs
    pub const INDEX: &str = "index";

    /// Columns a ride file must provide for aggregation
    pub const REQUIRED_RIDE_COLUMNS: &[&str] = &[
        RIDE_ID,
        STARTED_AT,
        START_STATION_ID,
        END_STATION_ID,
        MEMBERSHIP_ID,
        RIDEABLE_ID,
        TRIP_DURATION,
    ];

    /// Grouping key of the aggregated table, in output order
    pub const GROUP_COLUMNS: [&str; 7] = [
        START_STATION_ID,
        END_STATION_ID,
        MONTH,
        DAY,
        HOUR,
        MEMBERSHIP_ID,
        RIDEABLE_ID,
    ];
}

// =============================================================================
// Weather API (NOAA NCDC Climate Data Online v2)
// =============================================================================

/// Base URL of the CDO v2 REST API
pub const NCDC_BASE_URL: &str = "https://www.ncei.noaa.gov/cdo-web/api/v2/";

/// Header carrying the access token
pub const NCDC_TOKEN_HEADER: &str = "token";

/// Environment variable read by the CLI for the access token
pub const NCDC_TOKEN_ENV: &str = "NCDC_TOKEN";

/// ZIP code polled when none is given
pub const DEFAULT_ZIP_CODE: &str = "53205";

/// Dataset requested when none is given
pub const DEFAULT_DATASET: &str = "PRECIP_15";

/// Length of the readings window ending at the end date
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Pause after every request to stay under the API rate limit
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(200);

/// Per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Units requested for readings
pub const NCDC_UNITS: &str = "metric";

/// Date format used in query strings
pub const NCDC_DATE_FORMAT: &str = "%Y-%m-%d";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_columns_are_unique() {
        let mut names = columns::GROUP_COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), columns::GROUP_COLUMNS.len());
    }

    #[test]
    fn test_sample_fraction_in_range() {
        assert!(DEFAULT_SAMPLE_FRACTION > 0.0 && DEFAULT_SAMPLE_FRACTION <= 1.0);
    }

    #[test]
    fn test_base_url_ends_with_slash() {
        assert!(NCDC_BASE_URL.ends_with('/'));
    }
}
